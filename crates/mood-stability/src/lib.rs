//! Mood stability scoring: weight formulas, normalized stability scores, and
//! recovery of structured assessments from assistant replies.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
