//! # pico-ntsc-tv firmware
//!
//! Core 0 brings up the clocks, loads the palette, starts the composite
//! video engine and then does nothing but blink the LED. Core 1 paints the
//! framebuffer forever. The DMA completion interrupt on core 0 does the
//! actual video work.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod hw;

#[cfg(target_os = "none")]
mod embedded {
    use defmt::info;
    use defmt_rtt as _;
    use embedded_hal::digital::OutputPin;
    use panic_probe as _;

    use rp2040_hal::{
        self as hal,
        clocks::Clock,
        gpio::{FunctionPwm, Pins},
        multicore::{Multicore, Stack},
        pac,
        sio::Sio,
    };

    use pico_ntsc_tv::demo::WavyChecker;
    use pico_ntsc_tv::ntsc::palette::{load_vga_palette, PALETTE};
    use pico_ntsc_tv::FRAMEBUFFER;

    use crate::hw;

    #[link_section = ".boot2"]
    #[no_mangle]
    #[used]
    pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

    static mut CORE1_STACK: Stack<2048> = Stack::new();

    #[hal::entry]
    fn main() -> ! {
        info!(
            "Firmware {} {} starting up",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );

        let mut periph = pac::Peripherals::take().unwrap();
        let cm = pac::CorePeripherals::take().unwrap();
        let mut sio = Sio::new(periph.SIO);

        let clocks = hw::init_clocks(
            periph.XOSC,
            periph.CLOCKS,
            periph.PLL_SYS,
            periph.PLL_USB,
            &mut periph.VREG_AND_CHIP_RESET,
            &mut periph.RESETS,
        );

        let pins = Pins::new(
            periph.IO_BANK0,
            periph.PADS_BANK0,
            sio.gpio_bank0,
            &mut periph.RESETS,
        );

        // Colours first, signal second: the engine reads the palette from
        // the first active line it produces.
        load_vga_palette(&PALETTE);

        let video_pin = pins.gpio27.into_function::<FunctionPwm>();
        hw::init(periph.PWM, periph.DMA, &mut periph.RESETS, video_pin);
        hw::start();

        info!("Composite video running on GPIO 27");

        let mut led = pins.gpio25.into_push_pull_output();
        let mut delay =
            cortex_m::delay::Delay::new(cm.SYST, clocks.system_clock.freq().to_Hz());

        // A quick flutter to say hello.
        for _ in 0..6 {
            delay.delay_ms(23);
            led.set_high().unwrap();
            delay.delay_ms(23);
            led.set_low().unwrap();
        }

        info!("Spawning renderer on core 1");

        let mut multicore = Multicore::new(&mut periph.PSM, &mut periph.PPB, &mut sio.fifo);
        let core1 = &mut multicore.cores()[1];
        #[allow(static_mut_refs)]
        let core1_stack = unsafe { CORE1_STACK.take().unwrap() };
        core1.spawn(core1_stack, core1_main).expect("Spawning core 1");

        // Core 0 heartbeat.
        loop {
            led.set_high().unwrap();
            delay.delay_ms(250);
            led.set_low().unwrap();
            delay.delay_ms(750);
        }
    }

    /// Core 1: fill the framebuffer as fast as it will go. No pacing and
    /// no handshake with the video side — a torn frame is a one-frame
    /// shimmer at worst. The writes stay on the raw framebuffer pointer,
    /// as the generator's reads do on core 0.
    fn core1_main() -> ! {
        let checker = WavyChecker::new(8.0, 0.09, 0.11, 0.12);
        let fb = FRAMEBUFFER.as_mut_ptr();
        let mut frame = 0u32;
        loop {
            checker.render(fb, frame);
            frame = frame.wrapping_add(1);
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    println!(
        "This firmware is for the RP2040. Build it with `cargo build --release --target thumbv6m-none-eabi`."
    );
}

// End of file
