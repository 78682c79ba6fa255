//! HEALPix hierarchical pixel indexing.
//!
//! Packs a `(depth, pixel index)` pair into a single "uniq" integer and back,
//! so pixels of mixed resolutions can be stored and sorted as plain integers.
//! Also provides the depth/nside/area helpers around it and a checker that
//! replays a recorded oracle fixture against this implementation.

pub mod error;
pub mod fixture;
pub mod healpix;
pub mod uniq;

pub use error::{Error, Result};
pub use uniq::{Cell, decode, encode};
