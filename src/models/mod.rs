pub mod prediction;
pub mod scenario;

pub use prediction::*;
pub use scenario::*;
