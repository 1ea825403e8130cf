pub mod grid_api;

pub use grid_api::*;
