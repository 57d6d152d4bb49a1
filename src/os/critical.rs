//! Critical section handling
//!
//! Wraps the `critical-section` crate in an RAII guard. On the target the
//! guard masks interrupts through PRIMASK and restores the previous state
//! on drop, so it nests correctly inside handlers.

use core::marker::PhantomData;

use critical_section::RestoreState;

/// RAII guard for critical sections
pub struct CriticalSection {
    restore: RestoreState,
    _not_send: PhantomData<*mut ()>,
}

impl CriticalSection {
    /// Enter a critical section by disabling interrupts.
    ///
    /// Returns a guard that will restore interrupt state when dropped.
    #[inline(always)]
    pub fn enter() -> Self {
        let restore = unsafe { critical_section::acquire() };
        CriticalSection {
            restore,
            _not_send: PhantomData,
        }
    }
}

impl Drop for CriticalSection {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe { critical_section::release(self.restore) };
    }
}

/// Execute a closure with interrupts disabled
///
/// The closure receives a reference to the critical section guard,
/// which can be used to access [`CsCell`](crate::os::cs_cell::CsCell) protected data.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
}

/// Check if currently executing in an ISR context
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        use cortex_m::peripheral::scb::VectActive;
        cortex_m::peripheral::SCB::vect_active() != VectActive::ThreadMode
    }

    #[cfg(not(target_arch = "arm"))]
    {
        crate::port::isr_active()
    }
}
