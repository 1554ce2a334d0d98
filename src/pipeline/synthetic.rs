//! Offline generator: seeded striped-noise images, no download.
//!
//! Every record draws one sub-seed from the master [`Lcg`], whether or not
//! the class budget accepts it, and renders from its own generator seeded
//! with that sub-seed. Output for a given `(seed, size, per_class)` is
//! therefore byte-identical across runs and independent of the cap.

use crate::png::RgbBuffer;
use crate::util::{Error, Result};

use super::{Assembler, Label, OutputArchive, Summary};

/// Class names and base colors.
pub const CLASSES: [(&str, [u8; 3]); 10] = [
    ("red", [220, 40, 40]),
    ("green", [40, 180, 60]),
    ("blue", [40, 70, 220]),
    ("yellow", [230, 210, 50]),
    ("cyan", [50, 200, 210]),
    ("magenta", [200, 50, 190]),
    ("orange", [240, 140, 30]),
    ("purple", [120, 60, 170]),
    ("white", [235, 235, 235]),
    ("gray", [128, 128, 128]),
];

/// Noise amplitude added to each channel, in `[-NOISE, NOISE]`.
const NOISE: i32 = 20;

/// Linear congruential generator, `s = s * 1664525 + 1013904223 mod 2^32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg(u32);

impl Lcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Advance and return the new state.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(Self::MULTIPLIER).wrapping_add(Self::INCREMENT);
        self.0
    }

    /// High byte of the next state; the low bits of an LCG are weak.
    #[inline]
    pub fn next_u8(&mut self) -> u8 {
        (self.next_u32() >> 24) as u8
    }
}

/// Synthetic run options.
#[derive(Debug, Clone)]
pub struct SyntheticOptions {
    /// Per-class cap, 0 = unlimited.
    pub max_per_class: usize,
    /// Image side length in pixels.
    pub size: u32,
    /// Records generated per class before the cap applies.
    pub per_class: usize,
    pub seed: u32,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            max_per_class: 40,
            size: 32,
            per_class: 50,
            seed: 42,
        }
    }
}

/// Render one image of class `label` from `seed`.
///
/// Odd classes get vertical stripes, even classes horizontal ones, with a
/// period of `2 + label % 4` pixels. Alternate stripes are dimmed to 45% of
/// the base color.
pub fn render(label: Label, size: u32, seed: u32) -> RgbBuffer {
    let base = CLASSES[label as usize % CLASSES.len()].1;
    let period = 2 + u32::from(label) % 4;
    let vertical = label % 2 == 1;

    let mut rng = Lcg::new(seed);
    let mut image = RgbBuffer::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let along = if vertical { x } else { y };
            let scale: i32 = if (along / period) % 2 == 0 { 100 } else { 45 };

            let mut rgb = [0u8; 3];
            for (out, &channel) in rgb.iter_mut().zip(&base) {
                let noise = i32::from(rng.next_u8()) % (2 * NOISE + 1) - NOISE;
                *out = (i32::from(channel) * scale / 100 + noise).clamp(0, 255) as u8;
            }
            image.put(x, y, rgb);
        }
    }
    image
}

/// Generate and assemble the synthetic dataset.
#[tracing::instrument(skip_all, fields(size = options.size, per_class = options.per_class, seed = options.seed))]
pub fn assemble(options: &SyntheticOptions) -> Result<(OutputArchive, Summary)> {
    if options.size == 0 {
        return Err(Error::InvalidDimensions {
            width: 0,
            height: 0,
        });
    }

    let mut master = Lcg::new(options.seed);
    let mut assembler = Assembler::new(options.max_per_class);

    for (label, (class_name, _)) in CLASSES.iter().enumerate() {
        let label = label as Label;
        for i in 0..options.per_class {
            let sub_seed = master.next_u32();
            if !assembler.admits(label) {
                continue;
            }
            let index = label as usize * options.per_class + i;
            let image = render(label, options.size, sub_seed);
            assembler.offer(label, class_name, "train", index, &image)?;
        }
    }

    let detail = format!(
        "synthetic size={} perClass={} seed={}",
        options.size, options.per_class, options.seed
    );
    let (archive, summary) = assembler.finish(detail);
    tracing::info!(added = summary.added_total, "synthetic assembled");
    Ok((archive, summary))
}
