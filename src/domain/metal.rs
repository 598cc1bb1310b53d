use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Metals the catalog prices. Each maps to a bullion symbol on the external
/// rate feed and carries its own set of purity labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Metal {
    #[default]
    Gold,
    Silver,
    Platinum,
    Palladium,
}

/// Purity labels and fractional purities for gold.
pub const GOLD_PURITIES: &[(&str, f64)] = &[
    ("24k", 0.999),
    ("22k", 0.917),
    ("18k", 0.750),
    ("14k", 0.585),
    ("10k", 0.417),
];

/// Purity labels and fractional purities for silver.
pub const SILVER_PURITIES: &[(&str, f64)] = &[
    ("Fine", 0.999),
    ("Sterling", 0.925),
    ("Coin", 0.900),
    ("Britannia", 0.958),
];

/// Purity labels and fractional purities for platinum.
pub const PLATINUM_PURITIES: &[(&str, f64)] =
    &[("950", 0.950), ("900", 0.900), ("850", 0.850)];

/// Purity labels and fractional purities for palladium.
pub const PALLADIUM_PURITIES: &[(&str, f64)] =
    &[("950", 0.950), ("900", 0.900), ("850", 0.850)];

impl Metal {
    /// All supported metals, in refresh order.
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
            Metal::Platinum => "Platinum",
            Metal::Palladium => "Palladium",
        }
    }

    /// Bullion symbol used by the external rate feed (`INRXAU` etc.).
    pub fn rate_symbol(&self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
            Metal::Platinum => "XPT",
            Metal::Palladium => "XPD",
        }
    }

    /// Ordered purity labels with their fractional purities.
    pub fn purities(&self) -> &'static [(&'static str, f64)] {
        match self {
            Metal::Gold => GOLD_PURITIES,
            Metal::Silver => SILVER_PURITIES,
            Metal::Platinum => PLATINUM_PURITIES,
            Metal::Palladium => PALLADIUM_PURITIES,
        }
    }

    /// Fractional purity for `label`, or 0.0 when the label is unknown.
    /// Unknown labels are logged so a zeroed metal value is traceable.
    pub fn purity_fraction(&self, label: &str) -> f64 {
        match self
            .purities()
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(label))
        {
            Some((_, fraction)) => *fraction,
            None => {
                log::warn!("unknown purity label `{label}` for {self}; treating purity as 0");
                0.0
            }
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metal {
    type Err = UnknownMetal;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Metal::Gold),
            "silver" => Ok(Metal::Silver),
            "platinum" => Ok(Metal::Platinum),
            "palladium" => Ok(Metal::Palladium),
            _ => Err(UnknownMetal {
                value: value.to_string(),
            }),
        }
    }
}

/// Error returned when parsing a metal name fails.
#[derive(Debug, thiserror::Error)]
#[error("unknown metal `{value}`")]
pub struct UnknownMetal {
    pub value: String,
}
