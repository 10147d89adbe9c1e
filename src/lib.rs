//! # pico-ntsc-tv
//!
//! NTSC composite colour video from a single RP2040 PWM pin.
//!
//! The PWM compare register, fed by two mutually-chained DMA channels, acts
//! as a crude 12-level DAC running at 14.318 MHz (4× the NTSC colour
//! subcarrier). An RC network on the pin turns the duty-cycle stream into a
//! ~0.7 Vpp composite signal a television will accept.
//!
//! This library holds everything that does not touch the hardware: the
//! scanline synthesis engine, the colour encoder and palette, and the demo
//! content producer. The firmware binary wires it to the PWM, DMA and the
//! second core.

#![no_std]

#[cfg(not(target_os = "none"))]
extern crate std;

pub mod demo;
pub mod ntsc;

#[cfg(test)]
pub mod palette_test;

pub use crate::ntsc::palette::{Palette, PALETTE};
pub use crate::ntsc::{Framebuffer, LineSamples, ScanlineGenerator};

/// The 320×240 indexed framebuffer.
///
/// Written by the content producer on core 1, read by the scanline
/// generator under interrupt on core 0. There is no handshake; both sides
/// work through raw pointers and tolerate torn pixels.
pub static FRAMEBUFFER: Framebuffer = Framebuffer::new();
