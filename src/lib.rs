//! Minimal round-robin preemptive kernel for ARM Cortex-M4
//!
//! A fixed set of statically defined tasks providing:
//! - Periodic SysTick preemption
//! - Tick-based blocking delays
//! - Round-robin selection with an always-ready idle task
//! - PendSV context switching

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod os;
pub mod port;

// ============ Re-exports ============

pub use os::config;
pub use os::config::*;
pub use os::critical;
pub use os::error;
pub use os::error::{OsError, OsResult};
pub use os::kernel;
pub use os::kernel::{os_init, os_start};
pub use os::types;
pub use os::types::*;
pub use os::task;
pub use os::task::{OsTaskFn, OsTcb};
pub use os::sched;
pub use os::sched::{os_sched_next, SchedState};
pub use os::time;
pub use os::time::{os_time_dly, os_time_get, spin_delay};

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
