//! SQL alias/parameter context and the text generator.

pub mod context;
pub mod generator;

pub use context::SqlContext;
pub use generator::{GenerateError, GenerateResult, SqlGenerator};
