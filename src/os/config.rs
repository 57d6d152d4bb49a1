//! Compile-time configuration
//!
//! These constants fix the task set, stack sizes and timing of the kernel.

/// Number of TCBs, idle task included
pub const CFG_TOTAL_TASKS: usize = 5;

/// Index of the idle task
pub const CFG_IDLE_TASK: usize = 0;

/// Number of application tasks handed to `os_init`
pub const CFG_APP_TASKS: usize = CFG_TOTAL_TASKS - 1;

/// Task stack size in words (1 KiB)
pub const CFG_TASK_STK_SIZE: usize = 256;

/// Scheduler (MSP) stack size in words
pub const CFG_SCHED_STK_SIZE: usize = 256;

/// SysTick reference clock (HSI)
pub const CFG_CPU_CLK_HZ: u32 = 16_000_000;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1;

/// SysTick exception priority. Must stay numerically below `CFG_PRIO_PENDSV`.
pub const CFG_PRIO_SYSTICK: u8 = 0x00;

/// PendSV exception priority, the lowest in the system
pub const CFG_PRIO_PENDSV: u8 = 0xFF;
