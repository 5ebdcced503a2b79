pub mod idea;
pub mod session;
pub mod vote;

pub use idea::*;
pub use session::*;
pub use vote::*;
