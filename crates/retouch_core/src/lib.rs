//! retouch Core Types
//!
//! This crate contains pure value types with no I/O.
//! Everything here is cheap to copy and serializable with stable encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod hash;
pub mod id;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use geometry::{Dims, Point, Rect, Rotation};
pub use hash::{Fingerprinter, Hash};
pub use id::{ActionId, AssetId};
pub use time::Timestamp;
