use crate::domain::market_data::{Granularity, Symbol};
use serde::{Deserialize, Serialize};

/// Grid configuration. Defaults mirror the production dashboard: a 2×2
/// grid seeded with the core macro set and a two-second bump highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Maximum number of simultaneously visible symbols (C).
    pub capacity: usize,
    /// Lifetime of the bump-eviction highlight, milliseconds.
    pub bump_ttl_ms: u32,
    /// Charts never resize below this; observers can report zero during
    /// layout thrash.
    pub min_chart_width: u32,
    pub min_chart_height: u32,
    pub default_granularity: Granularity,
    pub initial_selection: Vec<Symbol>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            bump_ttl_ms: 2_000,
            min_chart_width: 10,
            min_chart_height: 10,
            default_granularity: Granularity::Daily,
            initial_selection: vec![
                Symbol::from("SPY"),
                Symbol::from("QQQ"),
                Symbol::from("VIX"),
                Symbol::from("US10Y"),
            ],
        }
    }
}
