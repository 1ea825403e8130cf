use crate::domain::market_data::Symbol;

/// Grid-level error taxonomy. Nothing here crosses the grid's public
/// boundary as a panic; every variant is handled at its call site.
#[derive(Debug, Clone)]
pub enum GridError {
    /// Timeseries request failed; surfaces as a per-symbol error overlay.
    DataLoad(String),
    /// Chart/surface operation failed; swallowed so one broken viewport
    /// cannot take down the rest of the grid.
    RenderSurface(String),
    /// Response arrived for a symbol that already left the visible set.
    MembershipRace(Symbol),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::DataLoad(msg) => write!(f, "Data load error: {}", msg),
            GridError::RenderSurface(msg) => write!(f, "Render surface error: {}", msg),
            GridError::MembershipRace(symbol) => {
                write!(f, "Late response for absent symbol {}", symbol.value())
            }
        }
    }
}

impl std::error::Error for GridError {}

// Simple convenience type aliases
pub type DataResult<T> = Result<T, GridError>;
pub type RenderResult<T> = Result<T, GridError>;
