//! Task management module
//!
//! Task entry type, TCB and the statically reserved per-task stacks.

mod tcb;

pub use tcb::OsTcb;

use crate::config::CFG_TASK_STK_SIZE;
use crate::types::OsStkElement;

/// Task entry point function type
///
/// Tasks never return; the stacked link register of a fresh task holds the
/// exception-return sentinel, not a valid return address.
pub type OsTaskFn = fn() -> !;

/// Private stack region of one task
///
/// 8-byte aligned so the top satisfies the AAPCS alignment the exception
/// frame needs.
#[repr(C, align(8))]
pub struct TaskStack([OsStkElement; CFG_TASK_STK_SIZE]);

impl TaskStack {
    pub const fn new() -> Self {
        TaskStack([0; CFG_TASK_STK_SIZE])
    }

    /// One past the highest word of the region
    #[inline]
    pub fn top(&mut self) -> *mut OsStkElement {
        self.0.as_mut_ptr_range().end
    }

    /// Check whether `sp` lies inside this region (top included)
    #[inline]
    pub fn contains(&self, sp: *const OsStkElement) -> bool {
        let range = self.0.as_ptr_range();
        sp >= range.start && sp <= range.end
    }
}

impl Default for TaskStack {
    fn default() -> Self {
        Self::new()
    }
}
