//! Cortex-M4 port implementation
//!
//! Provides context switching via the PendSV exception handler.
//!
//! Two exception priorities carry the whole synchronization scheme: SysTick
//! sits above PendSV, and PendSV is the lowest priority in the system. A
//! switch therefore only runs once every pending tick has been handled.

use core::arch::{asm, naked_asm};

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SCB;

use super::frame::EXC_RETURN_THREAD_PSP;
use super::systick_reload;
use crate::config::{CFG_CPU_CLK_HZ, CFG_PRIO_PENDSV, CFG_PRIO_SYSTICK, CFG_SCHED_STK_SIZE};
use crate::critical::critical_section;
use crate::kernel::SCHED;
use crate::types::OsStkElement;

// PendSV saves the basic frame only. With the FPU on, a task's first FP
// instruction makes the hardware stack an extended frame it would strand.
#[cfg(target_abi = "eabihf")]
compile_error!("build for thumbv7em-none-eabi: the context switch does not save FPU state");

#[repr(C, align(8))]
struct SchedStack([OsStkElement; CFG_SCHED_STK_SIZE]);

/// Scheduler stack, loaded into MSP when multitasking starts
static mut SCHED_STK: SchedStack = SchedStack([0; CFG_SCHED_STK_SIZE]);

/// Initialize SysTick timer for system tick generation
///
/// Counter enable, processor clock source and tick exception enable make up
/// the three low bits of SYST_CSR.
pub fn os_cpu_systick_init(tick_rate_hz: u32) {
    let mut p = unsafe { cortex_m::Peripherals::steal() };

    p.SYST.set_reload(systick_reload(CFG_CPU_CLK_HZ, tick_rate_hz));
    p.SYST.clear_current();
    p.SYST.set_clock_source(SystClkSource::Core);
    p.SYST.enable_interrupt();
    p.SYST.enable_counter();
}

/// SHCSR: MEMFAULTENA, BUSFAULTENA, USGFAULTENA
const SHCSR_FAULTS_ENA: u32 = (1 << 16) | (1 << 17) | (1 << 18);

/// Route MemManage, BusFault and UsageFault to their own handlers
pub fn os_cpu_fault_enable() {
    let scb = unsafe { cortex_m::Peripherals::steal() }.SCB;

    unsafe { scb.shcsr.modify(|r| r | SHCSR_FAULTS_ENA) };
}

/// Put SysTick above PendSV
pub fn os_cpu_prio_init() {
    let mut scb = unsafe { cortex_m::Peripherals::steal() }.SCB;

    unsafe {
        scb.set_priority(SystemHandler::SysTick, CFG_PRIO_SYSTICK);
        scb.set_priority(SystemHandler::PendSV, CFG_PRIO_PENDSV);
    }
}

/// Start the first task
///
/// Moves MSP to the scheduler stack, clears PSP and pends PendSV. The first
/// PendSV sees PSP == 0, skips the save and resumes the selected task
/// through its synthesized frame.
///
/// # Safety
/// Interrupts must be masked and `os_init` must have built every frame.
#[allow(static_mut_refs)]
pub unsafe fn os_start_high_rdy() -> ! {
    let msp_top = unsafe { SCHED_STK.0.as_mut_ptr_range().end } as u32;

    SCB::set_pendsv();

    unsafe {
        asm!(
            "msr msp, {msp}",
            "msr psp, {zero}",
            "isb",
            "cpsie i",
            "isb",
            "1:",
            "wfi",
            "b 1b",
            msp = in(reg) msp_top,
            zero = in(reg) 0u32,
            options(noreturn),
        );
    }
}

/// Trigger context switch from task level
#[inline(always)]
pub fn os_ctx_sw() {
    SCB::set_pendsv();
}

/// Trigger context switch from interrupt level
#[inline(always)]
pub fn os_int_ctx_sw() {
    SCB::set_pendsv();
}

/// Helper function called from PendSV to perform TCB switching
///
/// Receives the outgoing stack pointer (null on the very first switch) and
/// returns the incoming one.
#[inline(never)]
#[no_mangle]
extern "C" fn pendsv_switch_context(cur_sp: *mut OsStkElement) -> *mut OsStkElement {
    critical_section(|cs| SCHED.get(cs).switch_context(cur_sp))
}

/// PendSV exception handler - performs full context switch
///
/// 1. Push R4-R11 onto the current task's PSP (skipped on first launch)
/// 2. Save PSP in the outgoing TCB and select the next task
/// 3. Pop R4-R11 from the incoming task's stack
/// 4. Exception return to Thread mode on PSP, basic (integer-only) frame
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        "mrs r0, psp",
        "cbz r0, 1f",
        "stmdb r0!, {{r4-r11}}",

        "1:",
        "bl {switch}",

        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",
        "isb",

        "ldr lr, ={exc_return}",
        "bx lr",

        switch = sym pendsv_switch_context,
        exc_return = const EXC_RETURN_THREAD_PSP,
    );
}
