pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod resolver;
pub mod transform;

pub use resolver::{ComponentsResolver, ModelsResolver, NoopResolver};
pub use transform::{CompileOptions, compile};
