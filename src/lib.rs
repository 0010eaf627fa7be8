mod common;
mod gpu;
mod image;
mod ops;
mod processing_context;
mod repro;

pub mod prelude;

pub use prelude::*;
