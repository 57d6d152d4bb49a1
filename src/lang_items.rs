//! Language items and fatal exception handlers
//!
//! Every fault is terminal: the core parks in a loop and the system stops
//! advancing. Nothing is logged from fault context.

// When defmt feature is enabled on ARM targets, use defmt_rtt and panic_probe
#[cfg(all(feature = "defmt", target_arch = "arm"))]
use defmt_rtt as _;

#[cfg(all(feature = "defmt", target_arch = "arm"))]
use panic_probe as _;

// Defmt panic handler
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[defmt::panic_handler]
fn defmt_panic() -> ! {
    cortex_m::asm::udf()
}

// Panic handler when defmt is disabled
#[cfg(all(not(feature = "defmt"), target_arch = "arm"))]
use panic_halt as _;

#[cfg(target_arch = "arm")]
mod faults {
    use cortex_m_rt::{exception, ExceptionFrame};

    #[exception]
    unsafe fn HardFault(_ef: &ExceptionFrame) -> ! {
        halt()
    }

    #[exception]
    fn MemoryManagement() -> ! {
        halt()
    }

    #[exception]
    fn BusFault() -> ! {
        halt()
    }

    #[exception]
    fn UsageFault() -> ! {
        halt()
    }

    #[inline(always)]
    fn halt() -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }
}

// Defmt timestamp
#[cfg(all(feature = "defmt", target_arch = "arm"))]
defmt::timestamp!("{=u32}", crate::os::kernel::KERNEL.tick_get());
