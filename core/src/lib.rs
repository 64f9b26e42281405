//! Merge engine for ODIM weather radar objects.
//!
//! Vendor software writes one file per quantity and sweep. This crate folds
//! those single-parameter scans and volumes into multi-parameter objects:
//! per archive, per file list, or across independently produced files that
//! share a source and nominal time. Decoding, archive access, persistence
//! and site lookup sit behind the traits in [`interface`].

pub mod interface;
pub mod merge;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod telemetry;
pub mod timing;

#[cfg(test)]
mod testing;

pub use prelude::{ErrorKind, MergeError, MergeResult};
