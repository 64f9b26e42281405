//! Combination of decoded radar objects.
//!
//! The building blocks go from attribute reconciliation up to whole
//! archives: [`attributes`] and [`parameter`] work on one scan,
//! [`scan`] folds sweeps of one elevation, [`volume`] stacks elevations,
//! and [`archive`] and [`general`] drive the two merge workflows.

pub mod archive;
pub mod attributes;
pub mod exclusion;
pub mod general;
pub mod parameter;
pub mod scan;
pub mod volume;

pub use archive::{merge_raw_archive, merge_raw_archive_with, ArchiveMerger};
pub use attributes::{
    classify_polarization, copy_missing_attributes, propagate_power_attributes, Polarization,
};
pub use exclusion::{ExclusionList, ExclusionRule};
pub use general::PolarMerger;
pub use parameter::{disambiguated_quantity, merge_parameter};
pub use scan::{merge_decoded_scans, merge_raw_members};
pub use volume::{
    adjust_to_nominal_time, assemble_from_scans, merge_scans_into_cycle_volume, merge_volumes,
};
