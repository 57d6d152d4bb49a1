//! Error types
//!
//! Only misuse of the boot and task API is reported. The scheduling core
//! itself has no error path; corruption ends in a fault handler.

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", target_arch = "arm"), derive(defmt::Format))]
#[repr(u16)]
pub enum OsError {
    // ============ OS state errors ============
    /// OS is not running
    OsNotRunning = 24201,
    /// OS is already running
    OsRunning = 24202,
    /// OS not initialized
    OsNotInit = 24203,

    // ============ Time errors ============
    /// Cannot delay from ISR
    TimeDlyIsr = 29301,
}

/// Result type alias for kernel operations
pub type OsResult<T> = Result<T, OsError>;

