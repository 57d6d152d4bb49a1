//! Scheduler module
//!
//! Round-robin selection over a fixed task table, with the idle task as the
//! fallback when nothing else is eligible.

use crate::config::{CFG_IDLE_TASK, CFG_TOTAL_TASKS};
use crate::port;
use crate::task::{OsTaskFn, OsTcb};
use crate::types::{OsStkElement, OsTick};

/// Pick the next task to run
///
/// Scans cyclically from `cur + 1` and returns the first non-idle task that
/// is eligible. The scan wraps back to `cur` itself, so a lone eligible
/// task keeps the CPU. Falls back to the idle task, which never blocks.
pub fn os_sched_next(tcbs: &[OsTcb], cur: usize) -> usize {
    let n = tcbs.len();

    (1..=n)
        .map(|step| (cur + step) % n)
        .find(|&idx| idx != CFG_IDLE_TASK && tcbs[idx].is_running())
        .unwrap_or(CFG_IDLE_TASK)
}

/// Scheduler state
///
/// The task table and the index of the task on the CPU. The kernel keeps a
/// single instance behind a `CsCell`; only boot, the tick handler, the
/// blocking delay and the PendSV helper mutate it.
pub struct SchedState {
    pub(crate) tcbs: [OsTcb; CFG_TOTAL_TASKS],
    pub(crate) cur: usize,
}

impl SchedState {
    pub const fn new() -> Self {
        Self {
            tcbs: [const { OsTcb::new() }; CFG_TOTAL_TASKS],
            cur: CFG_IDLE_TASK,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Get reference to a TCB
    #[inline(always)]
    pub fn tcb(&self, idx: usize) -> &OsTcb {
        &self.tcbs[idx]
    }

    /// The whole task table
    #[inline(always)]
    pub fn tcbs(&self) -> &[OsTcb] {
        &self.tcbs
    }

    /// Index of the task on the CPU
    #[inline(always)]
    pub fn cur(&self) -> usize {
        self.cur
    }

    /// Set the task considered on the CPU
    ///
    /// Only meaningful before the first switch, e.g. to replay a schedule.
    #[inline(always)]
    pub fn set_cur(&mut self, idx: usize) {
        debug_assert!(idx < CFG_TOTAL_TASKS);
        self.cur = idx;
    }

    /// Build a task's initial frame and mark it eligible
    ///
    /// # Safety
    /// `stk_top` must be the top of a writable region owned by this task
    /// alone, large enough for the initial frame.
    pub unsafe fn init_task(&mut self, idx: usize, entry: OsTaskFn, stk_top: *mut OsStkElement) {
        let tcb = &mut self.tcbs[idx];
        *tcb = OsTcb::new();
        tcb.entry = Some(entry);
        tcb.stk_ptr = unsafe { port::os_task_stk_init(entry, stk_top) };
    }

    /// Block the current task until `now + ticks`
    ///
    /// Returns the wake tick, or `None` when the current task is the idle
    /// task, which never blocks.
    pub fn block_cur(&mut self, now: OsTick, ticks: OsTick) -> Option<OsTick> {
        if self.cur == CFG_IDLE_TASK {
            return None;
        }

        let wake_tick = now.wrapping_add(ticks);
        self.tcbs[self.cur].block_until(wake_tick);
        Some(wake_tick)
    }

    /// Make every blocked task due at `now` eligible again
    ///
    /// Returns the number of tasks woken.
    pub fn wake_expired(&mut self, now: OsTick) -> usize {
        let mut woken = 0;

        for (idx, tcb) in self.tcbs.iter_mut().enumerate() {
            if tcb.wake_if_due(now) {
                crate::trace!("task {=usize} woke at tick {=u32}", idx, now);
                woken += 1;
            }
        }

        woken
    }

    /// Record the outgoing stack pointer and return the incoming one
    ///
    /// A null `cur_sp` means no task has run yet; nothing is saved.
    pub fn switch_context(&mut self, cur_sp: *mut OsStkElement) -> *mut OsStkElement {
        if !cur_sp.is_null() {
            self.tcbs[self.cur].stk_ptr = cur_sp;
        }

        self.cur = os_sched_next(&self.tcbs, self.cur);
        self.tcbs[self.cur].stk_ptr
    }
}

impl Default for SchedState {
    fn default() -> Self {
        Self::new()
    }
}
