//! Task Control Block (TCB) definition
//!
//! The TCB holds the saved stack pointer and scheduling status of one task.

use crate::types::{OsStkElement, OsTaskState, OsTick};

use super::OsTaskFn;

/// Task Control Block
#[repr(C)]
pub struct OsTcb {
    /// Saved stack pointer, lowest word of the stacked register file
    pub(crate) stk_ptr: *mut OsStkElement,
    /// Tick at which a blocked task becomes eligible again
    pub(crate) wake_tick: OsTick,
    /// Current task state
    pub(crate) state: OsTaskState,
    /// Task entry point, consumed once by the frame initializer
    pub(crate) entry: Option<OsTaskFn>,
}

impl OsTcb {
    /// Create a new, uninitialized TCB
    pub const fn new() -> Self {
        OsTcb {
            stk_ptr: core::ptr::null_mut(),
            wake_tick: 0,
            state: OsTaskState::Running,
            entry: None,
        }
    }

    /// Saved stack pointer
    #[inline]
    pub fn stk_ptr(&self) -> *mut OsStkElement {
        self.stk_ptr
    }

    /// Wake tick, only meaningful while blocked
    #[inline]
    pub fn wake_tick(&self) -> OsTick {
        self.wake_tick
    }

    #[inline]
    pub fn state(&self) -> OsTaskState {
        self.state
    }

    #[inline]
    pub fn entry(&self) -> Option<OsTaskFn> {
        self.entry
    }

    /// Check if task is eligible to run
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == OsTaskState::Running
    }

    /// Check if task is blocked
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.state == OsTaskState::Blocked
    }

    /// Put the task to sleep until `wake_tick`
    #[inline]
    pub(crate) fn block_until(&mut self, wake_tick: OsTick) {
        self.wake_tick = wake_tick;
        self.state = OsTaskState::Blocked;
    }

    /// Make the task eligible if it is blocked and due at `now`
    ///
    /// Returns `true` when the task was woken.
    #[inline]
    pub(crate) fn wake_if_due(&mut self, now: OsTick) -> bool {
        if self.is_blocked() && self.wake_tick == now {
            self.state = OsTaskState::Running;
            true
        } else {
            false
        }
    }
}

impl Default for OsTcb {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for OsTcb {}
unsafe impl Sync for OsTcb {}
