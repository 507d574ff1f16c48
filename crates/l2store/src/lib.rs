//! # l2store
//!
//! Leaf contract of the second-level cache chain.
//!
//! ## Contents
//! - [`Cache`]: the capability every store and decorator implements
//! - [`PerpetualCache`]: map-backed base store, never evicts on its own
//! - [`Error`] / [`Result`]: failures surfaced by stores, propagated unchanged
//!   by every decorator stacked on top

#![warn(missing_docs)]

mod cache;
mod error;
mod perpetual;

pub use cache::Cache;
pub use error::{Error, Result};
pub use perpetual::PerpetualCache;
