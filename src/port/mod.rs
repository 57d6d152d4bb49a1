//! Port layer - CPU-specific implementations
//!
//! This module provides the hardware abstraction layer for context switching
//! and other CPU-specific operations.

pub mod frame;

pub use frame::{os_task_stk_init, CtxFrame};

/// SysTick current/reload registers are 24 bits wide
pub const SYST_RELOAD_MASK: u32 = 0x00FF_FFFF;

/// Reload value for a tick rate, masked to the counter width
///
/// # Example
/// For 16MHz clock with 1000Hz tick rate: 16_000_000 / 1000 - 1 = 15_999
pub const fn systick_reload(clk_hz: u32, tick_rate_hz: u32) -> u32 {
    (clk_hz / tick_rate_hz).wrapping_sub(1) & SYST_RELOAD_MASK
}

#[cfg(target_arch = "arm")]
pub mod cortex_m4;

#[cfg(target_arch = "arm")]
pub use cortex_m4::*;

// Stub implementations for non-ARM targets (for testing)
#[cfg(not(target_arch = "arm"))]
pub mod stub {
    use portable_atomic::{AtomicBool, AtomicU32, Ordering};

    static CTX_SW_REQUESTS: AtomicU32 = AtomicU32::new(0);

    /// Stands in for IPSR != 0
    static ISR_ACTIVE: AtomicBool = AtomicBool::new(false);

    pub unsafe fn os_start_high_rdy() -> ! {
        panic!("os_start_high_rdy not available on this platform");
    }

    /// Records the request instead of pending PendSV
    pub fn os_ctx_sw() {
        CTX_SW_REQUESTS.fetch_add(1, Ordering::Relaxed);
    }

    pub fn os_int_ctx_sw() {
        os_ctx_sw();
    }

    /// Number of switch requests raised so far
    pub fn ctx_sw_requests() -> u32 {
        CTX_SW_REQUESTS.load(Ordering::Relaxed)
    }

    /// Whether the caller runs in (simulated) handler mode
    pub fn isr_active() -> bool {
        ISR_ACTIVE.load(Ordering::Relaxed)
    }

    /// Enter or leave simulated handler mode
    pub fn set_isr_active(active: bool) {
        ISR_ACTIVE.store(active, Ordering::Relaxed);
    }

    pub fn os_cpu_systick_init(_tick_rate_hz: u32) {
        // No-op for testing
    }

    pub fn os_cpu_fault_enable() {
        // No-op for testing
    }

    pub fn os_cpu_prio_init() {
        // No-op for testing
    }
}

#[cfg(not(target_arch = "arm"))]
pub use stub::*;
