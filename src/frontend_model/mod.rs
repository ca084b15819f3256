//! Bound Java program as handed over by the front end.

pub mod program;
pub mod syntax;
pub mod types;
pub mod variables;
