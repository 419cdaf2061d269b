use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like currency code carried by ledger entries and money values.
///
/// Today Bodega is effectively mono-currency (default `DOP`, Dominican
/// pesos), but the ledger models currency explicitly to keep the data model
/// future-proof.
///
/// ## Minor units
///
/// The ledger stores monetary values as an `i64` number of **minor units**
/// (see `Money`). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input/output, e.g. `RD$10.50`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Dop,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Dop => "DOP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Dop => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DOP" => Ok(Currency::Dop),
            other => Err(LedgerError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
