use chrono::NaiveDate;

use crate::{
    filters::{CategorySelection, FilterState, PlatformFilter},
    period::{Period, YearMonth, derive_period_range},
};

/// Single owner of the dashboard's [`FilterState`].
///
/// Every mutation goes through one of the methods below. Each effective
/// change bumps [`generation`](Self::generation), which is what the UI
/// watches to decide when consumers must refetch. Consumers only ever see
/// [`snapshot`](Self::snapshot)s.
#[derive(Debug, Clone)]
pub struct FilterController {
    state: FilterState,
    displayed_month: YearMonth,
    generation: u64,
}

impl FilterController {
    /// Defaults: period `all`, unbounded range, every platform, no category,
    /// and the month containing `today` as the displayed month.
    pub fn new(today: NaiveDate, active_user: Option<String>) -> Self {
        Self {
            state: FilterState {
                active_user,
                ..FilterState::default()
            },
            displayed_month: YearMonth::of(today),
            generation: 0,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.displayed_month
    }

    /// Switches preset and re-derives the range. Re-selecting the active
    /// preset changes nothing.
    pub fn select_period(&mut self, period: Period, today: NaiveDate) -> bool {
        if self.state.period == period {
            return false;
        }
        self.state.period = period;
        self.rederive(today);
        self.touch();
        true
    }

    /// Moves the custom picker to another month and re-derives the range.
    ///
    /// Under `custom` a typed `to` is kept as is, even when the new `from`
    /// lands after it; the server then returns no rows for that range.
    pub fn set_displayed_month(&mut self, month: YearMonth, today: NaiveDate) -> bool {
        if self.displayed_month == month {
            return false;
        }
        self.displayed_month = month;
        let before = self.state.date_range;
        self.rederive(today);
        if self.state.date_range != before {
            self.touch();
        }
        true
    }

    pub fn next_month(&mut self, today: NaiveDate) -> bool {
        self.set_displayed_month(self.displayed_month.next(), today)
    }

    pub fn prev_month(&mut self, today: NaiveDate) -> bool {
        self.set_displayed_month(self.displayed_month.prev(), today)
    }

    /// Direct edit of the lower bound. Holds until the period or the
    /// displayed month changes.
    pub fn set_date_from(&mut self, from: Option<NaiveDate>) -> bool {
        if self.state.date_range.from == from {
            return false;
        }
        self.state.date_range.from = from;
        self.touch();
        true
    }

    /// Direct edit of the upper bound; `None` means "through today".
    pub fn set_date_to(&mut self, to: Option<NaiveDate>) -> bool {
        if self.state.date_range.to == to {
            return false;
        }
        self.state.date_range.to = to;
        self.touch();
        true
    }

    pub fn set_platform(&mut self, platform: PlatformFilter) -> bool {
        if self.state.platform == platform {
            return false;
        }
        self.state.platform = platform;
        self.touch();
        true
    }

    pub fn toggle_category(&mut self, name: &str) {
        self.state.categories.toggle(name);
        self.touch();
    }

    pub fn clear_categories(&mut self) -> bool {
        if self.state.categories.is_empty() {
            return false;
        }
        self.state.categories = CategorySelection::new();
        self.touch();
        true
    }

    pub fn set_active_user(&mut self, user: Option<String>) -> bool {
        if self.state.active_user == user {
            return false;
        }
        self.state.active_user = user;
        self.touch();
        true
    }

    /// Back to defaults, keeping the active user.
    pub fn reset(&mut self, today: NaiveDate) {
        let user = self.state.active_user.take();
        self.state = FilterState {
            active_user: user,
            ..FilterState::default()
        };
        self.displayed_month = YearMonth::of(today);
        self.touch();
    }

    fn rederive(&mut self, today: NaiveDate) {
        let derived = derive_period_range(self.state.period, today, self.displayed_month);
        let to = match self.state.period {
            Period::Custom => self.state.date_range.to,
            _ => None,
        };
        self.state.date_range.from = derived.from;
        self.state.date_range.to = to;
        tracing::debug!(
            period = self.state.period.code(),
            range = %self.state.date_range.label(),
            "derived date range"
        );
    }

    fn touch(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::DateRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn starts_with_defaults() {
        let controller = FilterController::new(date(2024, 3, 15), None);
        let state = controller.state();
        assert_eq!(state.period, Period::All);
        assert!(state.date_range.is_unbounded());
        assert!(state.platform.is_all());
        assert!(state.categories.is_empty());
        assert_eq!(controller.generation(), 0);
        assert_eq!(controller.displayed_month(), YearMonth::new(2024, 3).unwrap());
    }

    #[test]
    fn reselecting_the_same_period_is_a_no_op() {
        let today = date(2024, 3, 15);
        let mut controller = FilterController::new(today, None);
        assert!(controller.select_period(Period::LastWeek, today));
        let generation = controller.generation();
        assert!(!controller.select_period(Period::LastWeek, today));
        assert_eq!(controller.generation(), generation);
    }

    #[test]
    fn leaving_custom_drops_typed_upper_bound() {
        let today = date(2024, 3, 15);
        let mut controller = FilterController::new(today, None);
        controller.select_period(Period::Custom, today);
        controller.set_date_to(Some(date(2024, 3, 10)));
        controller.select_period(Period::Today, today);
        assert_eq!(controller.state().date_range, DateRange::starting(today));
    }

    #[test]
    fn displayed_month_only_matters_for_custom() {
        let today = date(2024, 3, 15);
        let mut controller = FilterController::new(today, None);
        controller.select_period(Period::LastWeek, today);
        let generation = controller.generation();
        controller.prev_month(today);
        assert_eq!(controller.state().date_range.from, Some(date(2024, 3, 8)));
        assert_eq!(controller.generation(), generation);

        controller.select_period(Period::Custom, today);
        controller.prev_month(today);
        assert_eq!(controller.state().date_range.from, Some(date(2024, 1, 1)));
    }

    #[test]
    fn reset_keeps_user() {
        let today = date(2024, 3, 15);
        let mut controller = FilterController::new(today, Some("a@example.com".to_string()));
        controller.select_period(Period::LastMonth, today);
        controller.toggle_category("Food");
        controller.set_platform(PlatformFilter::from_label("Grab"));
        controller.reset(today);
        assert_eq!(
            controller.state().active_user.as_deref(),
            Some("a@example.com")
        );
        assert!(controller.state().query_params().values("category").next().is_none());
        assert_eq!(controller.state().period, Period::All);
    }
}
