//! FMEDA: Failure Modes, Effects and Diagnostic Analysis toolkit
//!
//! Records a hardware design as safety functions, components and failure
//! modes, and computes the ISO 26262 style hardware metrics (SPFM, LFM,
//! MPHF) over a project lifetime.

pub mod analysis;
pub mod cli;
pub mod codec;
pub mod core;
pub mod entities;
