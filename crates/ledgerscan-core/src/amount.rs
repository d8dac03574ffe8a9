//! Amount type representing a signed decimal quantity with optional currency.
//!
//! Ledger journals write money in three shapes: `$4.50` (currency before the
//! number), `100 EUR` (currency after the number), and a bare `1,234.56`.
//! An [`Amount`] keeps the exact decimal value together with the currency
//! marker and the side of the number it was written on, so that exporters can
//! reproduce the original style.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Which side of the number a currency marker was written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    /// `$5`, `USD 5`
    Leading,
    /// `5 USD`, `5€`
    Trailing,
}

impl CurrencyPosition {
    /// Lowercase name used in serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leading => "leading",
            Self::Trailing => "trailing",
        }
    }
}

impl fmt::Display for CurrencyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A currency marker together with its position relative to the number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// The symbol or code as written (e.g. `$`, `EUR`, `usd`)
    pub symbol: String,
    /// Where the marker appeared
    pub position: CurrencyPosition,
}

impl Currency {
    /// Create a currency written before the number.
    #[must_use]
    pub fn leading(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: CurrencyPosition::Leading,
        }
    }

    /// Create a currency written after the number.
    #[must_use]
    pub fn trailing(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: CurrencyPosition::Trailing,
        }
    }
}

/// A signed decimal value with an optional currency.
///
/// The currency position is stored inside [`Currency`], so an amount without
/// a currency can never carry a position.
///
/// # Examples
///
/// ```
/// use ledgerscan_core::{Amount, CurrencyPosition};
/// use rust_decimal_macros::dec;
///
/// let amount = Amount::leading(dec!(4.50), "$");
/// assert_eq!(amount.value, dec!(4.50));
/// assert_eq!(amount.currency(), Some("$"));
/// assert_eq!(amount.currency_position(), Some(CurrencyPosition::Leading));
///
/// let bare = Amount::bare(dec!(1234.56));
/// assert_eq!(bare.currency(), None);
/// assert_eq!(bare.currency_position(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The signed decimal quantity
    pub value: Decimal,
    /// The currency marker, if one was written
    pub currency: Option<Currency>,
}

impl Amount {
    /// Create an amount without a currency.
    #[must_use]
    pub const fn bare(value: Decimal) -> Self {
        Self {
            value,
            currency: None,
        }
    }

    /// Create an amount whose currency precedes the number.
    #[must_use]
    pub fn leading(value: Decimal, symbol: impl Into<String>) -> Self {
        Self {
            value,
            currency: Some(Currency::leading(symbol)),
        }
    }

    /// Create an amount whose currency follows the number.
    #[must_use]
    pub fn trailing(value: Decimal, symbol: impl Into<String>) -> Self {
        Self {
            value,
            currency: Some(Currency::trailing(symbol)),
        }
    }

    /// The currency symbol or code, if any.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_ref().map(|c| c.symbol.as_str())
    }

    /// The currency position, `None` when no currency was written.
    #[must_use]
    pub fn currency_position(&self) -> Option<CurrencyPosition> {
        self.currency.as_ref().map(|c| c.position)
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Get the scale (number of decimal places) of this amount.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.value.scale()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency {
            None => write!(f, "{}", self.value),
            Some(Currency {
                symbol,
                position: CurrencyPosition::Leading,
            }) => {
                // `-$5` rather than `$-5`
                if self.value.is_sign_negative() && !self.value.is_zero() {
                    write!(f, "-{symbol}{}", self.value.abs())
                } else {
                    write!(f, "{symbol}{}", self.value)
                }
            }
            Some(Currency {
                symbol,
                position: CurrencyPosition::Trailing,
            }) => write!(f, "{} {symbol}", self.value),
        }
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            value: -self.value,
            currency: self.currency.clone(),
        }
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
