use crate::model::attributes::Attributes;
use crate::model::scan::RadarScan;
use serde::{Deserialize, Serialize};

/// Elevation ordering of the scans in a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    #[default]
    Ascending,
    Descending,
}

impl ScanOrder {
    /// Ordering implied by a sequence of elevations as they were collected.
    /// Anything that is not strictly falling counts as ascending.
    pub fn of_elevations(elevations: &[f64]) -> Self {
        let descending = elevations.len() > 1 && elevations.windows(2).all(|w| w[0] > w[1]);
        if descending {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    fn keeps_before(&self, existing: f64, incoming: f64) -> bool {
        match self {
            Self::Ascending => existing <= incoming,
            Self::Descending => existing >= incoming,
        }
    }
}

/// An ordered set of scans from one acquisition cycle.
///
/// Scans are always kept sorted by elevation according to `order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarVolume {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub beamwidth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beamw_v: Option<f64>,
    pub source: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    order: ScanOrder,
    #[serde(default)]
    scans: Vec<RadarScan>,
}

impl RadarVolume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: ScanOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn order(&self) -> ScanOrder {
        self.order
    }

    pub fn is_ascending(&self) -> bool {
        self.order == ScanOrder::Ascending
    }

    pub fn number_of_scans(&self) -> usize {
        self.scans.len()
    }

    pub fn scans(&self) -> &[RadarScan] {
        &self.scans
    }

    pub fn scan(&self, index: usize) -> Option<&RadarScan> {
        self.scans.get(index)
    }

    /// Mutable access for parameter-level edits. Changing `elangle` through
    /// this reference must be followed by [`RadarVolume::sort_by_elevations`].
    pub fn scan_mut(&mut self, index: usize) -> Option<&mut RadarScan> {
        self.scans.get_mut(index)
    }

    /// Inserts `scan` at its elevation slot. A volume without date, time or
    /// source inherits them from the scan.
    pub fn add_scan(&mut self, scan: RadarScan) {
        if self.date.is_empty() && self.time.is_empty() {
            self.date = scan.date.clone();
            self.time = scan.time.clone();
        }
        if self.source.is_empty() {
            self.source = scan.source.clone();
        }
        let slot = self
            .scans
            .iter()
            .position(|s| !self.order.keeps_before(s.elangle, scan.elangle))
            .unwrap_or(self.scans.len());
        self.scans.insert(slot, scan);
    }

    pub fn into_scans(self) -> Vec<RadarScan> {
        self.scans
    }

    pub fn remove_scan(&mut self, index: usize) -> Option<RadarScan> {
        if index < self.scans.len() {
            Some(self.scans.remove(index))
        } else {
            None
        }
    }

    pub fn sort_by_elevations(&mut self, order: ScanOrder) {
        self.order = order;
        match order {
            ScanOrder::Ascending => self.scans.sort_by(|a, b| a.elangle.total_cmp(&b.elangle)),
            ScanOrder::Descending => self.scans.sort_by(|a, b| b.elangle.total_cmp(&a.elangle)),
        }
    }

    pub fn scan_closest_to_elevation(&self, elangle: f64) -> Option<&RadarScan> {
        self.scans
            .iter()
            .min_by(|a, b| (a.elangle - elangle).abs().total_cmp(&(b.elangle - elangle).abs()))
    }

    pub fn scan_closest_to_elevation_mut(&mut self, elangle: f64) -> Option<&mut RadarScan> {
        self.scans
            .iter_mut()
            .min_by(|a, b| (a.elangle - elangle).abs().total_cmp(&(b.elangle - elangle).abs()))
    }

    /// Copies geolocation and beamwidths from `scan`.
    pub fn copy_geometry_from(&mut self, scan: &RadarScan) {
        self.longitude = scan.longitude;
        self.latitude = scan.latitude;
        self.height = scan.height;
        self.beamwidth = scan.beamwidth;
        if let Some(beamw_v) = scan.beamw_v {
            self.beamw_v = Some(beamw_v);
        }
    }
}
