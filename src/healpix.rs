//! HEALPix (Hierarchical Equal Area isoLatitude Pixelisation) resolution helpers.
//!
//! A grid of depth `d` splits each of the 12 base pixels into `4^d` nested
//! sub-pixels, so `nside = 2^d` and the whole sphere holds `12 * nside^2`
//! pixels. Depths above [`MAX_DEPTH`] are rejected: at depth 29 the largest
//! uniq value is `4^31 - 4`, the last depth that leaves headroom in a `u64`.

use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Deepest supported resolution.
pub const MAX_DEPTH: u8 = 29;

/// Number of base pixels at depth 0.
pub const N_BASE_PIXELS: u64 = 12;

/// Nside for a given depth: 2^depth.
///
/// `depth` must not exceed [`MAX_DEPTH`]; use [`check_depth`] on untrusted input.
pub fn nside(depth: u8) -> u64 {
    1u64 << depth
}

/// Total number of pixels at a given depth: 12 * nside^2.
pub fn npix(depth: u8) -> u64 {
    N_BASE_PIXELS << (2 * depth as u32)
}

/// Reject depths that do not fit the 64-bit layout.
pub fn check_depth(depth: u8) -> Result<u8> {
    if depth > MAX_DEPTH {
        return Err(Error::invalid(format!(
            "depth {depth} exceeds maximum depth {MAX_DEPTH}"
        )));
    }
    Ok(depth)
}

/// Reject pixel indices outside `[0, npix(depth))`.
pub fn check_hash(depth: u8, hash: u64) -> Result<u64> {
    let depth = check_depth(depth)?;
    let np = npix(depth);
    if hash >= np {
        return Err(Error::invalid(format!(
            "pixel index {hash} out of range [0, {np}) at depth {depth}"
        )));
    }
    Ok(hash)
}

/// Depth of a grid with the given nside.
///
/// Fails unless `nside` is a power of two no larger than `nside(MAX_DEPTH)`.
pub fn nside_to_depth(nside_value: u64) -> Result<u8> {
    if !nside_value.is_power_of_two() || nside_value > nside(MAX_DEPTH) {
        return Err(Error::invalid(format!(
            "nside {nside_value} is not a power of two in [1, {}]",
            nside(MAX_DEPTH)
        )));
    }
    Ok(nside_value.trailing_zeros() as u8)
}

/// Solid angle (steradians) of a single pixel at the given depth.
pub fn pixel_area(depth: u8) -> f64 {
    4.0 * PI / npix(depth) as f64
}

/// Approximate angular side (radians) of a pixel: sqrt of its area.
pub fn resolution(depth: u8) -> f64 {
    pixel_area(depth).sqrt()
}

/// Compute an appropriate HEALPix depth for a given angular scale (radians).
///
/// Returns the depth where each pixel is approximately the same angular size
/// as the given scale, clamped to [`MAX_DEPTH`]. Non-positive scales map to
/// the finest grid.
pub fn depth_for_scale(scale_rad: f64) -> u8 {
    if scale_rad.is_nan() || scale_rad <= 0.0 {
        return MAX_DEPTH;
    }
    // pixel_side ~ sqrt(pi / (3 * Nside^2)), so Nside ~ sqrt(pi/3) / scale
    let nside_f = (PI / 3.0).sqrt() / scale_rad;
    if nside_f <= 1.0 {
        return 0;
    }
    (nside_f.log2().ceil() as u8).min(MAX_DEPTH)
}
