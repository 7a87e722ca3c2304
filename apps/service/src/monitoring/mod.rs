//! Check pipeline: execute a configured command, parse its plugin output,
//! translate it into an up/down result and publish it.
//!
//! This module is responsible for:
//! - Running check commands as child processes
//! - Parsing Nagios-style plugin output
//! - Translating parsed output into push results
//! - Publishing results to stdout or an Uptime Kuma push endpoint
//! - Scheduling periodic runs and applying configuration reloads
pub mod executor;
pub mod parser;
pub mod publisher;
pub mod runner;
pub mod scheduler;
pub mod translator;
pub mod types;

pub use runner::CheckRunner;
pub use scheduler::CheckScheduler;
