//! Implementations that are useful accross the whole project
//!
//! Date management, plan loading, and the two series that end up on the chart

pub mod budget;
pub mod date;
pub mod error;
pub mod parse;
pub mod plan;
pub mod summary;
pub mod usage;
