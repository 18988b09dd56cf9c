//! CLI command implementations

pub mod analyze;
pub mod convert;
pub mod doctor;
