use crate::interface::Decoder;
use crate::merge::exclusion::ExclusionList;
use crate::merge::scan::merge_raw_members;
use crate::model::{RadarObject, RadarVolume};
use crate::naming::MemberDescriptor;
use crate::prelude::{MergeError, MergeResult};
use crate::telemetry::{MergeLogger, MergeMetrics};

/// Accumulates the single-quantity members of one raw archive.
///
/// Scan members fold into one scan. Volume members fold elevation by
/// elevation into a clone of the first volume seen; after each member the
/// scans are re-sorted with that member's own orientation. The first member
/// to arrive supplies geometry and top-level attributes, so member order
/// decides attribute provenance but not the quantity set.
#[derive(Debug, Default)]
pub struct ArchiveMerger {
    accumulator: Option<RadarObject>,
    members: usize,
}

impl ArchiveMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members folded in so far.
    pub fn members(&self) -> usize {
        self.members
    }

    /// Folds `donor` in. The donor is consumed: post-processed quantities
    /// are renamed on it in place.
    pub fn add_member(
        &mut self,
        donor: RadarObject,
        descriptor: &MemberDescriptor,
    ) -> MergeResult<()> {
        let merged = match (self.accumulator.take(), donor) {
            (None, RadarObject::Scan(mut scan)) => {
                RadarObject::Scan(merge_raw_members(None, &mut scan, descriptor)?)
            }
            (Some(RadarObject::Scan(host)), RadarObject::Scan(mut scan)) => {
                RadarObject::Scan(merge_raw_members(Some(host), &mut scan, descriptor)?)
            }
            (None, RadarObject::Volume(volume)) => {
                RadarObject::Volume(fold_volume(None, volume, descriptor)?)
            }
            (Some(RadarObject::Volume(host)), RadarObject::Volume(volume)) => {
                RadarObject::Volume(fold_volume(Some(host), volume, descriptor)?)
            }
            (Some(RadarObject::Scan(_)), RadarObject::Volume(_)) => {
                return Err(MergeError::VolumeIntoScan)
            }
            (Some(RadarObject::Volume(_)), RadarObject::Scan(_)) => {
                return Err(MergeError::MixedMembers(descriptor.path.clone()))
            }
        };
        self.accumulator = Some(merged);
        self.members += 1;
        Ok(())
    }

    pub fn finish(self) -> MergeResult<RadarObject> {
        self.accumulator.ok_or(MergeError::NoInput)
    }
}

fn fold_volume(
    host: Option<RadarVolume>,
    mut donor: RadarVolume,
    descriptor: &MemberDescriptor,
) -> MergeResult<RadarVolume> {
    let fresh = host.is_none();
    let mut host = host.unwrap_or_else(|| donor.clone());
    let order = donor.order();

    for index in 0..donor.number_of_scans() {
        let previous = host.remove_scan(index).ok_or_else(|| {
            MergeError::ElevationMismatch(format!(
                "{} has no elevation index {}",
                descriptor.path, index
            ))
        })?;
        // a fresh accumulator starts every elevation without quantities
        let accumulator = if fresh { None } else { Some(previous) };
        let scan = donor.scan_mut(index).ok_or_else(|| {
            MergeError::ElevationMismatch(format!("{} lost scan {}", descriptor.path, index))
        })?;
        host.add_scan(merge_raw_members(accumulator, scan, descriptor)?);
        host.sort_by_elevations(order);
    }
    Ok(host)
}

/// Merges the members of one archive, in enumeration order.
///
/// Members outside `rawdata` or matched by `exclusions` are skipped, as are
/// members the decoder recognises but cannot decode. A member in a format
/// the decoder does not recognise fails the whole merge.
pub fn merge_raw_archive(
    members: Vec<(Vec<u8>, MemberDescriptor)>,
    decoder: &dyn Decoder,
    exclusions: &ExclusionList,
) -> MergeResult<RadarObject> {
    merge_raw_archive_with(
        members,
        decoder,
        exclusions,
        &MergeLogger::default(),
        &MergeMetrics::new(),
    )
}

pub fn merge_raw_archive_with(
    members: Vec<(Vec<u8>, MemberDescriptor)>,
    decoder: &dyn Decoder,
    exclusions: &ExclusionList,
    logger: &MergeLogger,
    metrics: &MergeMetrics,
) -> MergeResult<RadarObject> {
    let mut merger = ArchiveMerger::new();
    for (buffer, descriptor) in members {
        if !exclusions.admits(&descriptor) {
            logger.detail(&format!("skipping {} ({})", descriptor.path, descriptor.file_type));
            metrics.record_skipped();
            continue;
        }
        if !decoder.is_recognized(&buffer) {
            metrics.record_failed();
            return Err(MergeError::NotRecognized(descriptor.path));
        }
        match decoder.decode(&descriptor.path, &buffer) {
            Some(object) => {
                logger.detail(&format!(
                    "{} {} from {}",
                    object.kind(),
                    descriptor.quantity,
                    descriptor.path
                ));
                merger.add_member(object, &descriptor)?;
                metrics.record_merged();
            }
            None => {
                logger.skipped(&format!("{} could not be decoded", descriptor.path));
                metrics.record_skipped();
            }
        }
    }
    logger.record(&format!("merged {} members", merger.members()));
    merger.finish()
}
