//! Profile building, job knowledge and matching stages

pub mod profile;
pub mod knowledge;
pub mod matcher;
pub mod pipeline;
