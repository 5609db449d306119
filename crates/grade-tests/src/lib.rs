//! Integration tests for the LCh grading crates.
//!
//! End-to-end properties that span color conversion, the gamut table, the
//! tone curve, the render kernel and the histogram.

#[cfg(test)]
mod color;
#[cfg(test)]
mod gamut;
#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod render;

/// Seed shared by the randomized tests.
pub const SEED: u64 = 0x1c4_c0de;

/// Table resolution used where a full 256 build would only slow tests down.
pub const TEST_TABLE_RESOLUTION: usize = 64;
