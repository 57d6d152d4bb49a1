//! Time management module
//!
//! Provides the tick handler, tick-based task delays and a raw busy-wait.

use crate::critical::{critical_section, is_isr_context};
use crate::error::{OsError, OsResult};
use crate::kernel::{KERNEL, SCHED};
use crate::port;
use crate::types::OsTick;

/// Time delay in ticks
///
/// Blocks the calling task until the tick counter reaches `now + ticks` and
/// hands the CPU over immediately instead of waiting for the next tick.
/// Called from the idle task it does nothing: idle must stay eligible.
///
/// # Arguments
/// * `ticks` - Number of ticks to delay (0 = no delay)
///
/// # Returns
/// * `Ok(())` - Delay completed (or skipped)
/// * `Err(OsError::OsNotRunning)` - Scheduler not started
/// * `Err(OsError::TimeDlyIsr)` - Cannot delay from ISR
pub fn os_time_dly(ticks: OsTick) -> OsResult<()> {
    if !KERNEL.is_running() {
        return Err(OsError::OsNotRunning);
    }

    if is_isr_context() {
        return Err(OsError::TimeDlyIsr);
    }

    if ticks == 0 {
        return Ok(());
    }

    let blocked = critical_section(|cs| {
        let sched = SCHED.get(cs);
        let cur = sched.cur();
        sched
            .block_cur(KERNEL.tick_get(), ticks)
            .map(|wake_tick| (cur, wake_tick))
    });

    if let Some((cur, wake_tick)) = blocked {
        crate::debug!("task {=usize} blocked until tick {=u32}", cur, wake_tick);
        port::os_ctx_sw();
    }

    Ok(())
}

/// Get current tick count
#[inline]
pub fn os_time_get() -> OsTick {
    KERNEL.tick_get()
}

/// Tick handler
///
/// Advances the tick counter, wakes every task due at the new tick and pends
/// a switch. The switch itself runs later in PendSV, below this priority.
pub fn os_tick_handler() {
    if !KERNEL.is_running() {
        return;
    }

    let now = KERNEL.tick_increment();

    critical_section(|cs| {
        SCHED.get(cs).wake_expired(now);
    });

    port::os_int_ctx_sw();
}

/// SysTick interrupt handler
#[no_mangle]
pub extern "C" fn SysTick() {
    os_tick_handler();
}

/// Busy-wait for `count` loop iterations
///
/// Does not yield and does not touch the scheduler; the whole core stalls.
/// Meant for calibration before `os_start` or short non-preemptible
/// hardware timing, never as a task delay.
#[inline(never)]
pub fn spin_delay(count: u32) {
    #[cfg(target_arch = "arm")]
    cortex_m::asm::delay(count);

    #[cfg(not(target_arch = "arm"))]
    for _ in 0..count {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::os_init;

    fn spin() -> ! {
        loop {}
    }

    fn is_blocked(idx: usize) -> bool {
        critical_section(|cs| SCHED.get(cs).tcb(idx).is_blocked())
    }

    // Single test: it drives the global kernel state
    #[test]
    fn test_running_delay_and_tick() {
        assert_eq!(os_init([spin, spin, spin, spin]), Ok(()));
        KERNEL.set_running(true);

        // Idle is current after init and never blocks
        let requests = port::ctx_sw_requests();
        assert_eq!(os_time_dly(3), Ok(()));
        assert!(!is_blocked(0));
        assert_eq!(port::ctx_sw_requests(), requests);

        // Not from handler mode
        port::set_isr_active(true);
        assert_eq!(os_time_dly(3), Err(OsError::TimeDlyIsr));
        port::set_isr_active(false);

        // One tick: one increment, one switch request
        os_tick_handler();
        assert_eq!(os_time_get(), 1);
        assert_eq!(port::ctx_sw_requests(), requests + 1);

        // A task delaying d ticks blocks until now + d and yields at once
        let d = 3;
        let now = os_time_get();
        critical_section(|cs| SCHED.get(cs).set_cur(2));

        let requests = port::ctx_sw_requests();
        assert_eq!(os_time_dly(d), Ok(()));
        assert!(is_blocked(2));
        assert_eq!(critical_section(|cs| SCHED.get(cs).tcb(2).wake_tick()), now + d);
        assert_eq!(port::ctx_sw_requests(), requests + 1);

        // Zero ticks is not a delay
        critical_section(|cs| SCHED.get(cs).set_cur(1));
        assert_eq!(os_time_dly(0), Ok(()));
        assert!(!is_blocked(1));
        assert_eq!(port::ctx_sw_requests(), requests + 1);

        for _ in 1..d {
            os_tick_handler();
            assert!(is_blocked(2), "woke early at tick {}", os_time_get());
        }
        os_tick_handler();
        assert!(!is_blocked(2));
        assert_eq!(os_time_get(), now + d);
        assert_eq!(port::ctx_sw_requests(), requests + 1 + d);

        KERNEL.set_running(false);
    }
}
