//! Four LEDs - one task per user LED on the STM32F407 Discovery board
//!
//! Tasks 1-4 toggle PD12-PD15 and sleep 2, 4, 6 and 8 ticks. With all four
//! asleep the idle task owns the CPU until the next wake-up.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use rrkernel::{os_time_dly, spin_delay};

use stm32_metapac as pac;
use pac::gpio::vals::{Moder, Odr};

// ============ LED Control ============

const LED_GREEN: usize = 12;
const LED_ORANGE: usize = 13;
const LED_RED: usize = 14;
const LED_BLUE: usize = 15;

const LEDS: [usize; 4] = [LED_GREEN, LED_ORANGE, LED_RED, LED_BLUE];

fn led_init() {
    pac::RCC.ahb1enr().modify(|w| w.set_gpioden(true));
    for pin in LEDS {
        pac::GPIOD.moder().modify(|w| w.set_moder(pin, Moder::OUTPUT));
    }
}

fn led_toggle(pin: usize) {
    if pac::GPIOD.odr().read().odr(pin) == Odr::HIGH {
        pac::GPIOD.bsrr().write(|w| w.set_br(pin, true));
    } else {
        pac::GPIOD.bsrr().write(|w| w.set_bs(pin, true));
    }
}

/// Blink every LED once with the scheduler still stopped
fn led_self_test() {
    for pin in LEDS {
        led_toggle(pin);
        spin_delay(400_000);
        led_toggle(pin);
    }
}

// ============ Tasks ============

fn green_task() -> ! {
    loop {
        led_toggle(LED_GREEN);
        let _ = os_time_dly(2);
    }
}

fn orange_task() -> ! {
    loop {
        led_toggle(LED_ORANGE);
        let _ = os_time_dly(4);
    }
}

fn red_task() -> ! {
    loop {
        led_toggle(LED_RED);
        let _ = os_time_dly(6);
    }
}

fn blue_task() -> ! {
    loop {
        led_toggle(LED_BLUE);
        let _ = os_time_dly(8);
    }
}

// ============ Main ============

#[entry]
fn main() -> ! {
    rrkernel::os_init([green_task, orange_task, red_task, blue_task]).expect("OS init failed");

    // Peripherals between os_init and os_start
    led_init();
    led_self_test();

    rrkernel::info!("Starting scheduler");
    rrkernel::os_start().expect("OS start failed");

    loop { cortex_m::asm::nop(); }
}
