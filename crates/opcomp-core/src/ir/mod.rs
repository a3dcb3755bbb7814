pub mod operations;
pub mod parameters;
pub mod security;
pub mod types;

pub use operations::*;
pub use parameters::*;
pub use security::*;
pub use types::*;
