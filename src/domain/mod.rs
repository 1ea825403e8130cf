pub mod chart;
pub mod errors;
pub mod grid;
pub mod logging;
pub mod market_data;
pub mod platform;
