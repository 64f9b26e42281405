//! Radar data model: parameters, scans, volumes and their attributes.

pub mod attributes;
pub mod object;
pub mod scan;
pub mod volume;

pub use attributes::{AttributeValue, Attributes};
pub use object::RadarObject;
pub use scan::{Parameter, RadarScan};
pub use volume::{RadarVolume, ScanOrder};
