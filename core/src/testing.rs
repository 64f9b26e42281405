//! Synthetic single-parameter sweeps for unit tests.

use crate::model::{Parameter, RadarScan, RadarVolume, ScanOrder};
use ndarray::Array2;

pub(crate) const NRAYS: usize = 4;
pub(crate) const NBINS: usize = 8;

pub(crate) fn ramp(offset: f64) -> Array2<f64> {
    Array2::from_shape_fn((NRAYS, NBINS), |(ray, bin)| offset + (ray * NBINS + bin) as f64)
}

pub(crate) fn empty_scan(elangle: f64) -> RadarScan {
    let mut scan = RadarScan::default();
    scan.longitude = -75.2;
    scan.latitude = 45.9;
    scan.height = 180.0;
    scan.beamwidth = 0.95;
    scan.elangle = elangle;
    scan.nrays = NRAYS;
    scan.nbins = NBINS;
    scan.rscale = 250.0;
    scan.source = "NOD:caxah".to_string();
    scan.date = "20151209".to_string();
    scan.time = "165005".to_string();
    scan.start_date = "20151209".to_string();
    scan.start_time = "165005".to_string();
    scan.end_date = "20151209".to_string();
    scan.end_time = "165032".to_string();
    scan
}

pub(crate) fn single_parameter_scan(quantity: &str, elangle: f64) -> RadarScan {
    let mut scan = empty_scan(elangle);
    scan.add_parameter(Parameter::new(quantity, ramp(elangle)))
        .expect("fresh scan has no quantities");
    scan
}

pub(crate) fn single_parameter_volume(quantity: &str, elevations: &[f64]) -> RadarVolume {
    let mut volume = RadarVolume::with_order(ScanOrder::of_elevations(elevations));
    for &elangle in elevations {
        volume.add_scan(single_parameter_scan(quantity, elangle));
    }
    volume.copy_geometry_from(&empty_scan(0.0));
    volume
}
