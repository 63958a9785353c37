//! Pricing attached to categories and service types.

use serde::{Deserialize, Serialize};

use crate::domain::types::{PriceAmount, TypeConstraintError};

/// Price definition of a category or service type.
///
/// `None` on a service type means the category price is used instead.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pricing {
    #[default]
    None,
    Fixed {
        amount: Option<PriceAmount>,
    },
    Range {
        min: Option<PriceAmount>,
        max: Option<PriceAmount>,
    },
}

impl Pricing {
    pub const KIND_NONE: &'static str = "none";
    pub const KIND_FIXED: &'static str = "fixed";
    pub const KIND_RANGE: &'static str = "range";

    /// Builds a pricing value from its flattened persistence/form shape.
    pub fn from_parts(
        kind: &str,
        amount: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, TypeConstraintError> {
        match kind.trim() {
            Self::KIND_NONE | "" => Ok(Self::None),
            Self::KIND_FIXED => Ok(Self::Fixed {
                amount: amount.map(PriceAmount::new).transpose()?,
            }),
            Self::KIND_RANGE => Ok(Self::Range {
                min: min.map(PriceAmount::new).transpose()?,
                max: max.map(PriceAmount::new).transpose()?,
            }),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "pricing kind: {other}"
            ))),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => Self::KIND_NONE,
            Self::Fixed { .. } => Self::KIND_FIXED,
            Self::Range { .. } => Self::KIND_RANGE,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Fixed { amount } => amount.map(PriceAmount::get),
            _ => None,
        }
    }

    pub fn min(&self) -> Option<f64> {
        match self {
            Self::Range { min, .. } => min.map(PriceAmount::get),
            _ => None,
        }
    }

    pub fn max(&self) -> Option<f64> {
        match self {
            Self::Range { max, .. } => max.map(PriceAmount::get),
            _ => None,
        }
    }

    /// Renders the price, or `None` when this pricing does not define one.
    ///
    /// A `fixed` price without an amount and a `range` without either bound
    /// define nothing and therefore defer to the next source.
    pub fn display(&self) -> Option<String> {
        match *self {
            Self::None => None,
            Self::Fixed { amount } => amount.map(|amount| format_usd(amount.get())),
            Self::Range { min, max } => match (min, max) {
                (Some(min), Some(max)) => Some(format!(
                    "{} - {}",
                    format_usd(min.get()),
                    format_usd(max.get())
                )),
                (Some(min), None) => Some(format!("{}+", format_usd(min.get()))),
                (None, Some(max)) => Some(format!("Up to {}", format_usd(max.get()))),
                (None, None) => None,
            },
        }
    }
}

/// Formats a dollar amount with two decimals and US thousands separators.
///
/// Exact for amounts up to [`PriceAmount::MAX`].
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}
