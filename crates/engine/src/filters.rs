//! User-selected filters and the query descriptor derived from them.

use std::fmt;

use chrono::NaiveDate;

use crate::period::{DATE_FORMAT, DateRange, Period};

/// Platform selector: everything, or one exact platform label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(String),
}

impl PlatformFilter {
    /// `"all"` and blank input select every platform.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed == "all" {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All Platforms",
            Self::Only(name) => name.as_str(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Ordered multi-select of category names. Empty means "all categories".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CategorySelection(Vec<String>);

impl CategorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `name` if selected, otherwise appends it. The order of the
    /// other entries is kept.
    pub fn toggle(&mut self, name: &str) {
        if let Some(index) = self.0.iter().position(|c| c == name) {
            self.0.remove(index);
        } else {
            self.0.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CategorySelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for name in iter {
            let name = name.into();
            if !selection.contains(&name) {
                selection.0.push(name);
            }
        }
        selection
    }
}

/// Functional form of [`CategorySelection::toggle`].
pub fn toggle_category(selection: &CategorySelection, name: &str) -> CategorySelection {
    let mut next = selection.clone();
    next.toggle(name);
    next
}

/// Snapshot of every filter the dashboard applies.
///
/// Consumers receive it by value; only the controller mutates the live copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub period: Period,
    pub date_range: DateRange,
    pub platform: PlatformFilter,
    pub categories: CategorySelection,
    pub active_user: Option<String>,
}

impl FilterState {
    pub fn query_params(&self) -> QueryParams {
        to_query_params(self)
    }
}

/// Ordered `(key, value)` pairs sent as the query string of every read.
///
/// `category` may repeat; reqwest serialises the pairs in order, one
/// `key=value` each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Values of every pair named `key`, in order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    fn push(&mut self, key: &'static str, value: String) {
        self.0.push((key, value));
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Canonical query descriptor for a filter snapshot.
///
/// Emits, in this order: `date_from`, `date_to`, `email`, `platform` (each
/// only when set) and one `category` per selected category.
pub fn to_query_params(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::default();
    if let Some(from) = state.date_range.from {
        params.push("date_from", format_date(from));
    }
    if let Some(to) = state.date_range.to {
        params.push("date_to", format_date(to));
    }
    if let Some(user) = state.active_user.as_deref().map(str::trim)
        && !user.is_empty()
    {
        params.push("email", user.to_string());
    }
    if let PlatformFilter::Only(platform) = &state.platform {
        params.push("platform", platform.clone());
    }
    for category in state.categories.iter() {
        params.push("category", category.to_string());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_appends_and_removes_preserving_order() {
        let mut selection: CategorySelection = ["Food", "Transport", "Bills"].into_iter().collect();
        selection.toggle("Transport");
        assert_eq!(selection.iter().collect::<Vec<_>>(), ["Food", "Bills"]);
        selection.toggle("Transport");
        assert_eq!(
            selection.iter().collect::<Vec<_>>(),
            ["Food", "Bills", "Transport"]
        );
    }

    #[test]
    fn collecting_drops_duplicates() {
        let selection: CategorySelection = ["Food", "Food", "Bills"].into_iter().collect();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn platform_from_label() {
        assert_eq!(PlatformFilter::from_label("all"), PlatformFilter::All);
        assert_eq!(PlatformFilter::from_label(" "), PlatformFilter::All);
        assert_eq!(
            PlatformFilter::from_label("LINE Pay"),
            PlatformFilter::Only("LINE Pay".to_string())
        );
        assert_eq!(PlatformFilter::All.label(), "All Platforms");
    }

    #[test]
    fn default_state_has_no_params() {
        let state = FilterState::default();
        assert!(state.query_params().is_empty());
        assert_eq!(state.query_params().to_string(), "");
    }

    #[test]
    fn blank_user_is_not_sent() {
        let state = FilterState {
            active_user: Some("  ".to_string()),
            ..FilterState::default()
        };
        assert!(state.query_params().is_empty());
    }

    #[test]
    fn params_follow_fixed_key_order() {
        let state = FilterState {
            period: Period::Custom,
            date_range: DateRange {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: NaiveDate::from_ymd_opt(2024, 3, 15),
            },
            platform: PlatformFilter::Only("Shopee".to_string()),
            categories: ["Food"].into_iter().collect(),
            active_user: Some("me@example.com".to_string()),
        };
        assert_eq!(
            state.query_params().to_string(),
            "date_from=2024-03-01&date_to=2024-03-15&email=me@example.com&platform=Shopee&category=Food"
        );
    }
}
