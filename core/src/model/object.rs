use crate::model::scan::RadarScan;
use crate::model::volume::RadarVolume;
use serde::{Deserialize, Serialize};

/// Either kind of decoded or merged radar object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "UPPERCASE")]
pub enum RadarObject {
    Scan(RadarScan),
    #[serde(rename = "PVOL")]
    Volume(RadarVolume),
}

impl RadarObject {
    /// ODIM `what/object` label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scan(_) => "SCAN",
            Self::Volume(_) => "PVOL",
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Scan(scan) => &scan.source,
            Self::Volume(volume) => &volume.source,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Self::Scan(scan) => &scan.date,
            Self::Volume(volume) => &volume.date,
        }
    }

    pub fn time(&self) -> &str {
        match self {
            Self::Scan(scan) => &scan.time,
            Self::Volume(volume) => &volume.time,
        }
    }

    pub fn as_scan(&self) -> Option<&RadarScan> {
        match self {
            Self::Scan(scan) => Some(scan),
            Self::Volume(_) => None,
        }
    }

    pub fn as_volume(&self) -> Option<&RadarVolume> {
        match self {
            Self::Volume(volume) => Some(volume),
            Self::Scan(_) => None,
        }
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, Self::Volume(_))
    }
}

impl From<RadarScan> for RadarObject {
    fn from(scan: RadarScan) -> Self {
        Self::Scan(scan)
    }
}

impl From<RadarVolume> for RadarObject {
    fn from(volume: RadarVolume) -> Self {
        Self::Volume(volume)
    }
}
