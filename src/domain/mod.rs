//! Core domain types for the Echo verification worker.

mod handout;
mod types;

pub use handout::*;
pub use types::*;
