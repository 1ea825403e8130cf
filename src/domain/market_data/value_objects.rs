use derive_more::{Constructor, Deref, DerefMut, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - observed value of a series at one point in time
#[derive(
    Debug, Clone, Copy, PartialEq, From, Into, Deref, DerefMut, Constructor, Serialize, Deserialize,
)]
pub struct Quote(f64);

impl Quote {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Quote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - point in time, epoch **seconds** at the core boundary.
/// Millisecond feeds convert at the service edge, not here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    From,
    Into,
    Deref,
    DerefMut,
    Constructor,
    Serialize,
    Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_secs(value: u64) -> Self {
        Self(value)
    }

    /// Conversion helper for millisecond upstreams.
    pub fn from_millis(value: u64) -> Self {
        Self(value / 1000)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

/// Value Object - series identifier, member of a fixed universe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, DerefMut, Display, Serialize, Deserialize)]
#[display(fmt = "Symbol({})", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: String) -> Result<Self, String> {
        if symbol.is_empty() {
            return Err("Symbol cannot be empty".to_string());
        }
        Ok(Self(symbol.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_uppercase())
    }
}

/// Value Object - requested sampling window
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Granularity {
    #[default]
    #[strum(serialize = "1D")]
    #[serde(rename = "1D")]
    Daily,

    #[strum(serialize = "1W")]
    #[serde(rename = "1W")]
    Weekly,

    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    Monthly,

    #[strum(serialize = "1Y")]
    #[serde(rename = "1Y")]
    Yearly,
}

impl Granularity {
    pub fn as_query_str(&self) -> &str {
        self.as_ref()
    }
}
