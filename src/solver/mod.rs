//! Search driver (spec §4.7): builds and solves one `selen` model per
//! invocation. See [`engine`] for the only module that touches `selen`
//! types directly.

pub mod engine;

pub use engine::{solve, SearchConfig, SolutionSnapshot, SolveReport};
