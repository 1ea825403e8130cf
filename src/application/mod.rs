pub mod coordinator;
pub mod fullscreen;
pub mod sync_group;
pub mod viewport_pool;

pub use coordinator::*;
pub use fullscreen::*;
pub use sync_group::*;
pub use viewport_pool::*;
