// ABOUTME: Library root for hl - exposes the pipeline and its collaborators for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod git;
pub mod health;
pub mod output;
pub mod process;
pub mod runtime;
pub mod types;
