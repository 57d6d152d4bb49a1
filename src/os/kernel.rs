//! Global kernel state and initialization
//!
//! This module owns the task table, the tick counter and the task stacks,
//! and implements the boot sequence that hands the CPU to the first task.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{CFG_APP_TASKS, CFG_TICK_RATE_HZ, CFG_TOTAL_TASKS};
use crate::critical::critical_section;
use crate::os::cs_cell::CsCell;
use crate::error::{OsError, OsResult};
use crate::sched::SchedState;
use crate::task::{OsTaskFn, TaskStack};
use crate::types::OsTick;

// ============ Kernel State Structures ============

/// Atomic kernel flags
pub struct KernelFlags {
    initialized: AtomicBool,
    running: AtomicBool,
    tick_counter: AtomicU32,
}

impl KernelFlags {
    const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
            tick_counter: AtomicU32::new(0),
        }
    }

    pub(crate) fn reset(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.tick_counter.store(0, Ordering::SeqCst);
    }

    /// Check if the OS is running
    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Check if OS is initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Get current tick count
    #[inline(always)]
    pub fn tick_get(&self) -> OsTick {
        self.tick_counter.load(Ordering::Relaxed)
    }

    /// Increment and return tick count
    #[inline(always)]
    pub(crate) fn tick_increment(&self) -> OsTick {
        self.tick_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Set initialized flag
    #[inline(always)]
    pub(crate) fn set_initialized(&self, val: bool) {
        self.initialized.store(val, Ordering::SeqCst);
    }

    /// Set running flag
    #[inline(always)]
    pub(crate) fn set_running(&self, val: bool) {
        self.running.store(val, Ordering::SeqCst);
    }
}

// ============ Global Instances ============

/// Global kernel state instance
pub(crate) static KERNEL: KernelFlags = KernelFlags::new();

/// Global scheduler state instance
pub(crate) static SCHED: CsCell<SchedState> = CsCell::new(SchedState::new());

/// Private stack regions, one per TCB, indexed like the task table
static mut TASK_STKS: [TaskStack; CFG_TOTAL_TASKS] = [const { TaskStack::new() }; CFG_TOTAL_TASKS];

// ============ Initialization ============

/// Internal IDLE task function
fn os_idle_task() -> ! {
    loop {
        #[cfg(target_arch = "arm")]
        cortex_m::asm::wfi();

        #[cfg(not(target_arch = "arm"))]
        core::hint::spin_loop();
    }
}

/// Top of a task's private stack region
///
/// # Safety
/// Must only be called while no task is running on that stack.
unsafe fn task_stk_top(idx: usize) -> *mut crate::types::OsStkElement {
    unsafe { (*(&raw mut TASK_STKS[idx])).top() }
}

// ============ Public API ============

/// Initialize the kernel
///
/// Enables the dedicated fault handlers, resets the tick counter and builds
/// the initial frame of every task. The idle task is supplied by the kernel
/// at index 0; `app_tasks[i]` becomes task `i + 1`.
///
/// Board peripherals (GPIO and the like) are brought up after this call
/// and before [`os_start`]; nothing here touches them.
///
/// # Returns
/// * `Ok(())` - Initialization successful
/// * `Err(OsError::OsRunning)` - OS is already running
pub fn os_init(app_tasks: [OsTaskFn; CFG_APP_TASKS]) -> OsResult<()> {
    if KERNEL.is_running() {
        return Err(OsError::OsRunning);
    }

    crate::port::os_cpu_fault_enable();
    KERNEL.reset();

    critical_section(|cs| {
        let sched = SCHED.get(cs);
        sched.reset();

        let entries = core::iter::once(os_idle_task as OsTaskFn).chain(app_tasks);
        for (idx, entry) in entries.enumerate() {
            unsafe {
                sched.init_task(idx, entry, task_stk_top(idx));
            }
            debug_assert!(unsafe { (*(&raw const TASK_STKS[idx])).contains(sched.tcb(idx).stk_ptr()) });
        }

        KERNEL.set_initialized(true);
    });

    crate::info!("kernel initialized: {=usize} tasks", CFG_TOTAL_TASKS);
    Ok(())
}

/// Start multitasking
///
/// Programs SysTick, orders the exception priorities and resumes task 1
/// through the first PendSV. It never returns under normal operation.
///
/// Call it last, once [`os_init`] has run and the board peripherals the
/// tasks use are configured: the first tick can fire as soon as it unmasks.
///
/// # Returns
/// * `Err(OsError::OsNotInit)` - OS not initialized
/// * `Err(OsError::OsRunning)` - OS is already running
pub fn os_start() -> OsResult<()> {
    if !KERNEL.is_initialized() {
        return Err(OsError::OsNotInit);
    }

    if KERNEL.is_running() {
        return Err(OsError::OsRunning);
    }

    // Masked until the first task is resumed; os_start_high_rdy unmasks.
    #[cfg(target_arch = "arm")]
    cortex_m::interrupt::disable();

    crate::port::os_cpu_prio_init();
    crate::port::os_cpu_systick_init(CFG_TICK_RATE_HZ);

    KERNEL.set_running(true);

    crate::info!(
        "starting scheduler: {=u32} Hz, reload {=u32}",
        CFG_TICK_RATE_HZ,
        crate::port::systick_reload(crate::config::CFG_CPU_CLK_HZ, CFG_TICK_RATE_HZ)
    );

    unsafe { crate::port::os_start_high_rdy() }
}
