use crate::merge::volume::adjust_to_nominal_time;
use crate::model::{RadarObject, RadarScan};
use crate::prelude::{MergeError, MergeResult};
use crate::timing::TimeNormalizer;
use log::{debug, info};

/// Merges scans and volumes that were produced independently but share a
/// source and a nominal time.
///
/// With interval 15, objects stamped 00:00 through 00:14:59 share the
/// nominal time 00:00. A volume among the inputs becomes the host; other
/// sweeps join it at the matching elevation or as new elevations. Quantities
/// already present are never replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarMerger {
    normalizer: TimeNormalizer,
}

impl PolarMerger {
    pub fn new(interval_minutes: u32) -> MergeResult<Self> {
        Ok(Self {
            normalizer: TimeNormalizer::new(interval_minutes)?,
        })
    }

    pub fn merge(&self, mut objects: Vec<RadarObject>) -> MergeResult<RadarObject> {
        if objects.is_empty() {
            return Err(MergeError::NoInput);
        }
        self.verify_provenance(&objects)?;
        verify_elevations(&objects)?;

        let host = objects.iter().position(RadarObject::is_volume).unwrap_or(0);
        let mut result = objects.remove(host);
        for object in objects {
            add_object_to(object, &mut result)?;
        }

        match &mut result {
            RadarObject::Volume(volume) => adjust_to_nominal_time(volume, &self.normalizer)?,
            RadarObject::Scan(scan) => {
                let (date, time) = self.normalizer.round(&scan.date, &scan.time)?;
                scan.date = date;
                scan.time = time;
            }
        }
        info!(
            "merged {} {} at {} {}",
            result.kind(),
            result.source(),
            result.date(),
            result.time()
        );
        Ok(result)
    }

    fn verify_provenance(&self, objects: &[RadarObject]) -> MergeResult<()> {
        let mut expected: Option<(String, String)> = None;
        for object in objects {
            let label = self.normalizer.nominal_label(object.date(), object.time())?;
            match &expected {
                None => expected = Some((object.source().to_string(), label)),
                Some((source, nominal)) => {
                    if source != object.source() || *nominal != label {
                        return Err(MergeError::SourceTimeMismatch {
                            expected: format!("{} {}", source, nominal),
                            found: format!("{} {}", object.source(), label),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Scans alone can only be merged at one shared elevation; a volume among
/// the inputs lifts that restriction.
fn verify_elevations(objects: &[RadarObject]) -> MergeResult<()> {
    if objects.iter().any(RadarObject::is_volume) {
        return Ok(());
    }
    let mut elevations = objects.iter().filter_map(RadarObject::as_scan).map(|s| s.elangle);
    if let Some(first) = elevations.next() {
        if let Some(other) = elevations.find(|&e| e != first) {
            return Err(MergeError::ElevationMismatch(format!(
                "scans at {} and {} deg can not be merged",
                first, other
            )));
        }
    }
    Ok(())
}

fn add_object_to(source: RadarObject, target: &mut RadarObject) -> MergeResult<()> {
    match source {
        RadarObject::Volume(_) if !target.is_volume() => Err(MergeError::VolumeIntoScan),
        RadarObject::Volume(volume) => {
            for scan in volume.into_scans() {
                add_scan_to(scan, target)?;
            }
            Ok(())
        }
        RadarObject::Scan(scan) => add_scan_to(scan, target),
    }
}

fn add_scan_to(scan: RadarScan, target: &mut RadarObject) -> MergeResult<()> {
    match target {
        RadarObject::Volume(volume) => {
            let same_elevation = volume
                .scan_closest_to_elevation(scan.elangle)
                .is_some_and(|closest| closest.elangle == scan.elangle);
            if !same_elevation {
                debug!("adding elevation {:.2}", scan.elangle);
                volume.add_scan(scan);
                Ok(())
            } else if let Some(closest) = volume.scan_closest_to_elevation_mut(scan.elangle) {
                merge_missing_parameters(&scan, closest)
            } else {
                Ok(())
            }
        }
        RadarObject::Scan(target) => merge_missing_parameters(&scan, target),
    }
}

/// Adds the quantities of `source` that `target` lacks; existing ones are kept.
fn merge_missing_parameters(source: &RadarScan, target: &mut RadarScan) -> MergeResult<()> {
    for parameter in source.parameters() {
        if !target.has_parameter(&parameter.quantity) {
            target.add_parameter(parameter.clone())?;
        }
    }
    Ok(())
}
