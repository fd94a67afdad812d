//! Book store application library
//!
//! Feature modules plus the bootstrap that wires them to storage and HTTP.

pub mod app;
pub mod modules;

pub use app::serve;
/// Re-export commonly used types
pub use modules::*;
