//! # Hardware plumbing for the composite video engine
//!
//! Clock tree, PWM output stage and the ping-pong DMA transport.
//!
//! The output stage is PWM slice 5 channel B on GPIO 27, wrapping every 11
//! system clocks. With the system clock at exactly 315 MHz and the slice
//! divider at 2, the compare register consumes one sample every 22 clocks:
//! a 14.318181 MHz sample rate, four times the NTSC colour subcarrier with
//! zero frequency error.
//!
//! Two DMA channels are chained head to tail. While one streams its 908
//! samples into the compare register (paced by the PWM wrap DREQ), the
//! other's buffer belongs to the CPU: the shared completion interrupt
//! refills it with the next scanline before the running channel finishes —
//! a budget of 63.4 µs per line.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) The pico-ntsc-tv developers, 2025
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use core::cell::UnsafeCell;

use fugit::RateExtU32;
use rp2040_hal::{
    clocks::{Clock as _, ClocksManager},
    gpio::{bank0::Gpio27, FunctionPwm, Pin, PullDown},
    pac::{self, interrupt},
    pll, pwm, vreg, xosc,
};

use pico_ntsc_tv::ntsc::{LineSamples, ScanlineGenerator, SAMPLES_PER_LINE, TOTAL_LINES};
use pico_ntsc_tv::{FRAMEBUFFER, PALETTE};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One scanline buffer, shared between the CPU and the DMA engine.
///
/// Ownership alternates: the DMA engine reads a buffer only while its own
/// channel is the active one, and the CPU writes it only from the
/// completion interrupt of that same channel. The chain-to wiring makes the
/// hand-over implicit.
#[repr(C, align(4))]
struct LineBuffer {
    samples: UnsafeCell<LineSamples>,
}

unsafe impl Sync for LineBuffer {}

impl LineBuffer {
    const fn new() -> LineBuffer {
        LineBuffer {
            samples: UnsafeCell::new(LineSamples::new()),
        }
    }

    /// The buffer's address, in the form the DMA read-address register wants.
    fn dma_addr(&self) -> u32 {
        self.samples.get() as u32
    }
}

/// Everything the completion interrupt owns: the scanline generator and
/// the index of the next line to produce.
struct Engine {
    gen: ScanlineGenerator<'static>,
    line: u16,
}

/// Cell granting the interrupt handler mutable access to [`Engine`].
///
/// Sound because exactly one execution context touches it after
/// [`init`] returns: the `DMA_IRQ_0` handler on core 0.
struct EngineCell(UnsafeCell<Engine>);

unsafe impl Sync for EngineCell {}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// On-board crystal frequency, in Hz.
const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;

/// PWM slice for GPIO 27 (channel B of slice 5).
const PWM_SLICE: usize = 5;

/// PWM wrap value: 11 counts per period, compare values 0..=11 usable.
const PWM_TOP: u16 = 10;

/// PWM clock divider (integer part). 315 MHz ÷ 2 ÷ 11 = 14.318181 MHz.
const PWM_DIV_INT: u8 = 2;

/// DMA channel streaming even-indexed scanlines.
const CH_VIDEO_A: usize = 0;

/// DMA channel streaming odd-indexed scanlines.
const CH_VIDEO_B: usize = 1;

/// TREQ number of `DREQ_PWM_WRAP0`; slice n pacing is this plus n.
const TREQ_PWM_WRAP0: u8 = 24;

/// The ping-pong pair. Index matches the DMA channel number.
static LINE_BUFFERS: [LineBuffer; 2] = [LineBuffer::new(), LineBuffer::new()];

/// The engine state driven by `DMA_IRQ_0`.
static ENGINE: EngineCell = EngineCell(UnsafeCell::new(Engine {
    gen: ScanlineGenerator::new(FRAMEBUFFER.as_ptr(), &PALETTE),
    line: 0,
}));

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Bring the chip up to the 315 MHz the video timing is built on.
///
/// 315 MHz is the one frequency that makes NTSC exact: the colour burst is
/// 315/88 MHz by definition, so 315 MHz ÷ 22 is precisely four times the
/// subcarrier. Anything else drifts the chroma and is useless, hence the
/// unwraps — there is no degraded mode to fall back to.
pub fn init_clocks(
    xosc_dev: pac::XOSC,
    clocks_dev: pac::CLOCKS,
    pll_sys_dev: pac::PLL_SYS,
    pll_usb_dev: pac::PLL_USB,
    vreg_dev: &mut pac::VREG_AND_CHIP_RESET,
    resets: &mut pac::RESETS,
) -> ClocksManager {
    // 315 MHz is out of spec at the default 1.10 V; raise the core supply
    // first and give it a moment to settle while the crystal starts.
    vreg::set_voltage(vreg_dev, vreg::VregVoltage::Voltage1_30);

    // Step 1. Turn on the crystal.
    let xosc = xosc::setup_xosc_blocking(xosc_dev, XOSC_CRYSTAL_FREQ.Hz())
        .map_err(|_x| false)
        .unwrap();

    // Step 2. Create a clocks manager.
    let mut clocks = ClocksManager::new(clocks_dev);

    // Step 3. Set up the system PLL.
    //
    // We take the crystal oscillator (= 12 MHz) with no divider, and ×105
    // to give a FOUTVCO of 1260 MHz. This must be in the range
    // 750 MHz - 1600 MHz. The factor of 105 is calculated automatically
    // given the desired FOUTVCO.
    //
    // Next we ÷2 on the first post divider to give 630 MHz.
    //
    // Finally we ÷2 on the second post divider to give 315 MHz.
    let pll_sys = pll::setup_pll_blocking(
        pll_sys_dev,
        xosc.operating_frequency(),
        pll::PLLConfig {
            vco_freq: 1260.MHz(),
            refdiv: 1,
            post_div1: 2,
            post_div2: 2,
        },
        &mut clocks,
        resets,
    )
    .map_err(|_x| false)
    .unwrap();

    // Step 4. Set up a 48 MHz PLL for the USB system.
    let pll_usb = pll::setup_pll_blocking(
        pll_usb_dev,
        xosc.operating_frequency(),
        pll::common_configs::PLL_USB_48MHZ,
        &mut clocks,
        resets,
    )
    .map_err(|_x| false)
    .unwrap();

    // Step 5. Set the system to run from the PLLs we just configured.
    clocks
        .init_default(&xosc, &pll_sys, &pll_usb)
        .map_err(|_x| false)
        .unwrap();

    defmt::info!("System clock at {} Hz", clocks.system_clock.freq().to_Hz());

    clocks
}

/// Set up the PWM output stage and the ping-pong DMA pair.
///
/// On return both channels are programmed and both buffers hold the first
/// two scanlines, but nothing is running yet — call [`start`] for that.
pub fn init(
    pwm_dev: pac::PWM,
    dma: pac::DMA,
    resets: &mut pac::RESETS,
    pin: Pin<Gpio27, FunctionPwm, PullDown>,
) {
    // The PWM counter is the sample clock: wrap every 11 counts at ÷2.
    let slices = pwm::Slices::new(pwm_dev, resets);
    let mut slice = slices.pwm5;
    slice.set_div_int(PWM_DIV_INT);
    slice.set_div_frac(0);
    slice.set_top(PWM_TOP);
    slice.channel_b.output_to(pin);
    slice.enable();

    // Reset the DMA peripheral.
    resets.reset().modify(|_r, w| w.dma().set_bit());
    unsafe {
        core::arch::asm!("nop");
    }
    resets.reset().modify(|_r, w| w.dma().clear_bit());
    while resets.reset_done().read().dma().bit_is_clear() {}

    // Samples go to the top half of the slice's combined compare register —
    // that 16-bit half is channel B's duty cycle.
    let pwm_compare = unsafe { (*pac::PWM::ptr()).ch(PWM_SLICE).cc().as_ptr() as u32 + 2 };

    // Two identical channels, each chained to the other. Configuration goes
    // through the AL1 control alias, which does not trigger, so neither
    // channel can start while half-programmed.
    for (channel, peer) in [(CH_VIDEO_A, CH_VIDEO_B), (CH_VIDEO_B, CH_VIDEO_A)] {
        let ch = dma.ch(channel);
        ch.ch_read_addr()
            .write(|w| unsafe { w.bits(LINE_BUFFERS[channel].dma_addr()) });
        ch.ch_write_addr()
            .write(|w| unsafe { w.bits(pwm_compare) });
        ch.ch_trans_count()
            .write(|w| unsafe { w.bits(SAMPLES_PER_LINE as u32) });
        ch.ch_al1_ctrl().write(|w| {
            w.data_size().size_halfword();
            w.incr_read().set_bit();
            w.incr_write().clear_bit();
            unsafe { w.treq_sel().bits(TREQ_PWM_WRAP0 + PWM_SLICE as u8) };
            unsafe { w.chain_to().bits(peer as u8) };
            unsafe { w.ring_size().bits(0) };
            w.ring_sel().clear_bit();
            w.bswap().clear_bit();
            w.irq_quiet().clear_bit();
            w.en().set_bit();
            w.sniff_en().clear_bit();
            w
        });
    }

    // Pre-fill both buffers; the interrupt takes over from line 2.
    // Nothing is running yet, so the plain accesses here race with no-one.
    let engine = unsafe { &mut *ENGINE.0.get() };
    engine
        .gen
        .generate(unsafe { &mut *LINE_BUFFERS[CH_VIDEO_A].samples.get() }, 0);
    engine
        .gen
        .generate(unsafe { &mut *LINE_BUFFERS[CH_VIDEO_B].samples.get() }, 1);
    engine.line = 2;

    // Both channels report completion on IRQ 0.
    dma.inte0()
        .write(|w| unsafe { w.bits(1 << CH_VIDEO_A | 1 << CH_VIDEO_B) });

    defmt::info!("Video DMA configured, {} samples per line", SAMPLES_PER_LINE);
}

/// Let the signal out: unmask the completion interrupt and trigger the
/// first channel. From here the chain runs until power-off.
pub fn start() {
    unsafe {
        pac::NVIC::unpend(pac::Interrupt::DMA_IRQ_0);
        pac::NVIC::unmask(pac::Interrupt::DMA_IRQ_0);
    }

    let dma = unsafe { &*pac::DMA::ptr() };
    dma.multi_chan_trigger()
        .write(|w| unsafe { w.bits(1 << CH_VIDEO_A) });
}

// -----------------------------------------------------------------------------
// Interrupt handlers
// -----------------------------------------------------------------------------

/// DMA completion: one channel has finished its line and chained to the
/// peer. Its buffer is ours until the peer finishes — refill it with the
/// next scanline and rewind its read address for the next go-round.
///
/// Runs from RAM; a flash XIP stall here eats into the 63 µs budget.
#[link_section = ".data"]
#[interrupt]
unsafe fn DMA_IRQ_0() {
    let dma = unsafe { &*pac::DMA::ptr() };

    let status = dma.ints0().read().bits();
    let channel = if status & (1 << CH_VIDEO_B) != 0 {
        CH_VIDEO_B
    } else {
        CH_VIDEO_A
    };

    let engine = unsafe { &mut *ENGINE.0.get() };
    let samples = unsafe { &mut *LINE_BUFFERS[channel].samples.get() };
    engine.gen.generate(samples, engine.line);

    // Rewind the source so the next chain trigger replays from sample 0.
    // A plain write; only the *_TRIG aliases start a channel.
    dma.ch(channel)
        .ch_read_addr()
        .write(|w| unsafe { w.bits(LINE_BUFFERS[channel].dma_addr()) });

    // Acknowledge only now that the refill is done. Clearing first would
    // open a window where the peer's completion re-enters while this
    // buffer is half-written.
    dma.ints0().write(|w| unsafe { w.bits(status) });

    engine.line += 1;
    if engine.line == TOTAL_LINES {
        engine.line = 0;
    }
}

// End of file
