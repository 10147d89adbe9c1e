//! # Demo content: wavy 256-colour checkerboard
//!
//! A small animation kernel that keeps the framebuffer busy: a checkerboard
//! whose tile grid is warped by two travelling sine waves, with a full
//! 256-colour gradient running across the diagonal. Everything after
//! construction is integer maths — the second core just calls
//! [`WavyChecker::render`] in a tight loop.

use libm::{roundf, sinf};

use crate::ntsc::{FRAME_HEIGHT, FRAME_WIDTH};

const TWO_PI: f32 = 6.283_185_3;

/// Converts radians to steps around a 256-entry phase circle.
const PHASE_SCALE: f32 = 256.0 / TWO_PI;

/// Tile edge length in pixels.
const TILE: i32 = 16;

pub struct WavyChecker {
    /// Amplitude-scaled sine, one full cycle over 256 entries. Cosine is
    /// the same table read 64 entries (90°) ahead.
    pub(crate) wave: [i8; 256],
    /// Phase step per pixel along x.
    pub(crate) step_x: u8,
    /// Phase step per pixel along y.
    pub(crate) step_y: u8,
    /// Phase step per frame for the first wave.
    pub(crate) tstep_1: u8,
    /// Phase step per frame for the second wave (0.8× speed).
    pub(crate) tstep_2: u8,
}

impl WavyChecker {
    /// Build the sine LUT and fixed-point phase steps. Called once at
    /// startup; the float maths never runs again.
    pub fn new(amplitude: f32, fx: f32, fy: f32, t_speed: f32) -> WavyChecker {
        let mut wave = [0i8; 256];
        for (i, entry) in wave.iter_mut().enumerate() {
            let s = sinf(TWO_PI * i as f32 / 256.0);
            *entry = (roundf(amplitude * s) as i32).clamp(-128, 127) as i8;
        }
        WavyChecker {
            wave,
            step_x: roundf(fx * PHASE_SCALE) as u8,
            step_y: roundf(fy * PHASE_SCALE) as u8,
            tstep_1: roundf(t_speed * PHASE_SCALE) as u8,
            tstep_2: roundf(t_speed * 0.8 * PHASE_SCALE) as u8,
        }
    }

    /// The palette index at pixel (x, y) in frame `frame`.
    pub fn color_at(&self, x: i32, y: i32, frame: u32) -> u8 {
        // Phase accumulation, mod 256 by the u8 truncation.
        let phase_y = (y as u32)
            .wrapping_mul(self.step_y as u32)
            .wrapping_add(frame.wrapping_mul(self.tstep_1 as u32)) as u8;
        // Cosine is sine shifted +90°, which is 64 steps on this circle.
        let phase_x = (x as u32)
            .wrapping_mul(self.step_x as u32)
            .wrapping_add(frame.wrapping_mul(self.tstep_2 as u32))
            .wrapping_add(64) as u8;

        // Warp the sampling point with the two waves.
        let sx = x + self.wave[phase_y as usize] as i32;
        let sy = y + self.wave[phase_x as usize] as i32;

        // Checker parity from the warped tile coordinates.
        let parity = ((sx / TILE) ^ (sy / TILE)) & 1;

        // Gradient across the diagonal, drifting with time.
        let base = (sx as u8)
            .wrapping_add(sy as u8)
            .wrapping_add(frame.wrapping_mul(2) as u8);

        // Opposite squares take the gradient shifted half-way round, which
        // keeps contrast while still visiting all 256 indices.
        if parity != 0 {
            base ^ 0x80
        } else {
            base
        }
    }

    /// Paint one full frame into the framebuffer at `fb`.
    ///
    /// `fb` must point at [`FRAME_PIXELS`](crate::ntsc::FRAME_PIXELS)
    /// writable bytes. Note (unsafe):
    /// the writes go through the raw pointer, never a reference, because
    /// the scanline generator on the other core reads the same bytes
    /// concurrently and tolerates torn pixels.
    pub fn render(&self, fb: *mut u8, frame: u32) {
        for y in 0..FRAME_HEIGHT {
            let row = fb.wrapping_add(y * FRAME_WIDTH);
            for x in 0..FRAME_WIDTH {
                unsafe {
                    row.add(x).write(self.color_at(x as i32, y as i32, frame));
                }
            }
        }
    }
}

// End of file
