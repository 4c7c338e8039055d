//! Terminal output
//!
//! - [`theme`] - Colors, icons, and column widths
//! - [`output`] - The [`Output`] reporter: log events plus console lines
//! - [`summary`] - End-of-run keep/delete table

pub mod output;
pub mod summary;
pub mod theme;

pub use output::Output;
