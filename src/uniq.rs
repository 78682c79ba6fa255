//! HEALPix "uniq" index: one integer packing both a depth and a pixel index.
//!
//! Every depth `d` owns the contiguous range `[4 * (4^d - 1), 4 * (4^(d+1) - 1))`
//! of uniq values, so cells of mixed resolutions sort by depth first and by
//! nested index second when compared as plain integers:
//!
//! | depth | first uniq | last uniq |
//! |-------|------------|-----------|
//! | 0     | 0          | 11        |
//! | 1     | 12         | 59        |
//! | 2     | 60         | 251       |
//!
//! The ranges tile `[0, 2^62 - 4)` with no gaps; values past the end of
//! [`MAX_DEPTH`] are rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::healpix::{MAX_DEPTH, check_depth, check_hash};

/// Smallest uniq value at `depth`: 4 * ((1 << 2d) - 1).
fn depth_offset(depth: u8) -> u64 {
    ((1u64 << (2 * depth as u32)) - 1) << 2
}

/// Pack `(depth, hash)` into a uniq index.
pub fn encode(depth: u8, hash: u64) -> Result<u64> {
    let hash = check_hash(depth, hash)?;
    Ok(depth_offset(depth) + hash)
}

/// Unpack a uniq index into its cell. Inverse of [`encode`].
pub fn decode(uniq: u64) -> Result<Cell> {
    let mut depth = 0;
    while depth < MAX_DEPTH && uniq >= depth_offset(depth + 1) {
        depth += 1;
    }

    // Values past the last depth land here with an oversized hash.
    let hash = check_hash(depth, uniq - depth_offset(depth)).map_err(|_| {
        Error::invalid(format!(
            "uniq index {uniq} lies beyond maximum depth {MAX_DEPTH}"
        ))
    })?;
    Ok(Cell { depth, hash })
}

/// A single pixel of a nested HEALPix grid.
///
/// Field order makes the derived ordering match uniq ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    depth: u8,
    hash: u64,
}

impl Cell {
    pub fn new(depth: u8, hash: u64) -> Result<Self> {
        let hash = check_hash(depth, hash)?;
        Ok(Cell { depth, hash })
    }

    pub fn from_uniq(uniq: u64) -> Result<Self> {
        decode(uniq)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn uniq(&self) -> u64 {
        depth_offset(self.depth) + self.hash
    }

    /// The cell one depth up. Base cells are their own parent.
    pub fn parent(self) -> Cell {
        self.ancestor(1)
    }

    /// The cell `delta_depth` levels up, stopping at the base cell.
    pub fn ancestor(self, delta_depth: u8) -> Cell {
        let delta = delta_depth.min(self.depth);
        Cell {
            depth: self.depth - delta,
            hash: self.hash >> (2 * delta as u32),
        }
    }

    /// The four cells one depth down, in nested order.
    pub fn children(self) -> Result<[Cell; 4]> {
        let depth = check_depth(self.depth + 1)?;
        let first = self.hash << 2;
        Ok(std::array::from_fn(|i| Cell {
            depth,
            hash: first + i as u64,
        }))
    }

    /// Whether `other` is this cell or lies inside it.
    pub fn contains(&self, other: &Cell) -> bool {
        other.depth >= self.depth && other.ancestor(other.depth - self.depth) == *self
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.depth, self.hash)
    }
}

impl FromStr for Cell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (depth, hash) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid(format!("expected DEPTH/HASH, got {s:?}")))?;
        let depth: u8 = depth
            .trim()
            .parse()
            .map_err(|e| Error::invalid(format!("bad depth {depth:?}: {e}")))?;
        let hash: u64 = hash
            .trim()
            .parse()
            .map_err(|e| Error::invalid(format!("bad pixel index {hash:?}: {e}")))?;
        Cell::new(depth, hash)
    }
}
