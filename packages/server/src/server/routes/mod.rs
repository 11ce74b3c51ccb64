// HTTP routes
pub mod health;
pub mod runs;
pub mod topics;

pub use health::*;
pub use runs::*;
pub use topics::*;
