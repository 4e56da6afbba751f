//! Core data models for scouting analytics.

mod dataset;
mod ids;
mod lists;
mod records;
mod stats;
mod value;

pub use dataset::*;
pub use ids::*;
pub use lists::*;
pub use records::*;
pub use stats::*;
pub use value::*;
