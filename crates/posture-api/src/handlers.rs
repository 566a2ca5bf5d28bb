//! Request handlers.

pub mod analysis;
pub mod health;
pub mod status;

pub use analysis::*;
pub use health::*;
pub use status::*;
