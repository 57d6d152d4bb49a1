//! Kernel modules
//!
//! Contains the task table, scheduler, kernel state and time management.

pub mod config;
pub mod critical;
pub mod cs_cell;
pub mod error;
pub mod kernel;
pub mod sched;
pub mod task;
pub mod time;
pub mod types;
