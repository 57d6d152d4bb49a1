//! Core type definitions

/// Tick counter type
pub type OsTick = u32;

/// Stack element type
pub type OsStkElement = u32;

/// Task state
///
/// `Running` means eligible to be picked by the selector, not necessarily
/// on the CPU. The task that is executing also reports `Running`; which
/// one that is lives in the current-task index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", target_arch = "arm"), derive(defmt::Format))]
#[repr(u8)]
pub enum OsTaskState {
    /// Task is sleeping until its wake tick
    Blocked = 0,
    /// Task is ready to run
    Running = 1,
}
