pub mod dom_factory;
pub mod headless;

pub use dom_factory::*;
pub use headless::*;
