use serde::{Deserialize, Serialize};

/// Currency used to display amounts coming from the finance API.
///
/// The API reports plain decimal numbers; the dashboard only ever shows them
/// in Thai baht, so this is a display concern and no conversion happens.
///
/// ## Minor units
///
/// Amounts are held as an `i64` number of **minor units** (see `Money`).
/// `minor_units()` returns how many decimal digits sit between major units
/// (`12.50 THB`) and minor units (`1250` satang).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Thb,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Thb => "THB",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Thb => "฿",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Thb => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}
