//! Checks for the NTSC colour encoder and palette storage.

use crate::ntsc::palette::{encode_rgb, load_vga_palette, Palette, VGA_PALETTE};
use crate::ntsc::{LEVEL_BLANK, LEVEL_MAX};

/// Pure black carries no luma and no chroma: all four phases sit exactly at
/// blanking level.
#[test]
fn test_encode_black_is_blanking() {
    assert_eq!(encode_rgb(0, 0, 0), [LEVEL_BLANK; 4]);
}

/// Pure white is all luma: the chroma terms vanish and all four phases land
/// on the same level, about seven steps above blanking.
#[test]
fn test_encode_white_is_flat() {
    let white = encode_rgb(255, 255, 255);
    assert_eq!(white, [9, 9, 9, 9]);
}

/// A pure primary splits the phases symmetrically: opposite phases must sum
/// to the same value, twice the luma-only level.
#[test]
fn test_encode_pure_red_phases() {
    // (B, R, G) = (0, 255, 0): Y = (77·255 + 128) / 256 = 77.
    let red = encode_rgb(0, 255, 0);
    assert_eq!(red, [7, 1, 1, 7]);
    assert_eq!(
        red[0] + red[2],
        red[1] + red[3],
        "opposite phase pairs should straddle the luma level equally"
    );
}

/// No colour on a 16-step RGB lattice escapes the PWM output range. The
/// encoder clamps, but for 8-bit inputs the clamp should never engage above
/// the top.
#[test]
fn test_encoder_stays_within_pwm_range() {
    for r in (0..=255u16).step_by(17) {
        for g in (0..=255u16).step_by(17) {
            for b in (0..=255u16).step_by(17) {
                let samples = encode_rgb(b as u8, r as u8, g as u8);
                for (phase, &s) in samples.iter().enumerate() {
                    assert!(
                        s <= LEVEL_MAX,
                        "rgb({},{},{}) phase {} encoded to {}",
                        r,
                        g,
                        b,
                        phase,
                        s
                    );
                }
            }
        }
    }
}

/// Every entry of the stock VGA palette encodes within the output range,
/// and the anchor colours land where the signal levels expect them.
#[test]
fn test_vga_palette_levels() {
    let palette = Palette::blank();
    load_vga_palette(&palette);

    for index in 0..=255u8 {
        let samples = palette.entry(index);
        for &s in &samples {
            assert!(
                s <= LEVEL_MAX,
                "VGA entry {} (0x{:06X}) out of range: {:?}",
                index,
                VGA_PALETTE[index as usize],
                samples
            );
        }
    }

    assert_eq!(palette.entry(0), [LEVEL_BLANK; 4], "entry 0 is black");
    assert_eq!(palette.entry(15), [9; 4], "entry 15 is white");
    // The grey ramp has no chroma anywhere.
    for index in 16..32u8 {
        let samples = palette.entry(index);
        assert!(
            samples.iter().all(|&s| s == samples[0]),
            "grey entry {} should be flat: {:?}",
            index,
            samples
        );
    }
}

/// `set_entry` routes through the encoder, and the packed pairs unpack in
/// phase order with the first phase in the low half-word.
#[test]
fn test_entry_packing() {
    let palette = Palette::blank();

    palette.store(42, [9, 7, 3, 5]);
    assert_eq!(palette.entry(42), [9, 7, 3, 5]);
    assert_eq!(palette.phase_pair(42, 0), 7 << 16 | 9);
    assert_eq!(palette.phase_pair(42, 1), 5 << 16 | 3);

    palette.set_entry(17, 0, 255, 0);
    assert_eq!(palette.entry(17), encode_rgb(0, 255, 0));
}

/// A fresh palette reads as black everywhere.
#[test]
fn test_blank_palette_is_black() {
    let palette = Palette::blank();
    for index in [0u8, 1, 100, 255] {
        assert_eq!(palette.entry(index), [LEVEL_BLANK; 4]);
    }
}

// End of file
