//! CLI command implementations

pub mod calc;
pub mod clear;
pub mod cmp;
pub mod completions;
pub mod export;
pub mod fm;
pub mod import;
pub mod init;
pub mod project;
pub mod report;
pub mod results;
pub mod sf;
pub mod tree;
