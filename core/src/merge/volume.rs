use crate::interface::SourceTable;
use crate::merge::attributes::copy_missing_attributes;
use crate::merge::scan::merge_decoded_scans;
use crate::model::{RadarObject, RadarScan, RadarVolume, ScanOrder};
use crate::prelude::{MergeError, MergeResult};
use crate::timing::TimeNormalizer;
use log::{debug, info};

/// Reference elevation whose closest sweep stands for a descending volume.
const LOWEST_ELEVATION: f64 = -90.0;

/// Attributes a cycle volume inherits from its first sweep.
pub const CYCLE_ATTRIBUTES: [&str; 9] = [
    "how/TXtype",
    "how/beamwH",
    "how/beamwV",
    "how/polmode",
    "how/poltype",
    "how/software",
    "how/sw_version",
    "how/system",
    "how/wavelength",
];

/// Rounds the volume's nominal date/time.
///
/// Ascending volumes use their own date/time. Descending volumes are
/// collected top-down, so the end of the lowest sweep is used instead.
pub fn adjust_to_nominal_time(
    volume: &mut RadarVolume,
    normalizer: &TimeNormalizer,
) -> MergeResult<()> {
    let (date, time) = match volume.order() {
        ScanOrder::Ascending => (volume.date.clone(), volume.time.clone()),
        ScanOrder::Descending => match volume.scan_closest_to_elevation(LOWEST_ELEVATION) {
            Some(lowest) => (lowest.end_date.clone(), lowest.end_time.clone()),
            None => (volume.date.clone(), volume.time.clone()),
        },
    };
    let (date, time) = normalizer.round(&date, &time)?;
    debug!("nominal time {} {} -> {} {}", volume.date, volume.time, date, time);
    volume.date = date;
    volume.time = time;
    Ok(())
}

/// Merges single-parameter volumes of one acquisition into one volume.
///
/// Scans are paired by index; every volume must hold as many scans as the
/// first one. The first volume provides the top-level fields.
pub fn merge_volumes(
    volumes: &[RadarVolume],
    adjust_time: Option<&TimeNormalizer>,
) -> MergeResult<RadarVolume> {
    let first = volumes.first().ok_or(MergeError::NoInput)?;
    let nscans = first.number_of_scans();
    let mut merged = first.clone();
    while merged.remove_scan(0).is_some() {}

    for index in 0..nscans {
        let scans = volumes
            .iter()
            .map(|volume| {
                volume.scan(index).ok_or_else(|| {
                    MergeError::ElevationMismatch(format!(
                        "volume {} has {} scans, expected {}",
                        volume.source,
                        volume.number_of_scans(),
                        nscans
                    ))
                })
            })
            .collect::<MergeResult<Vec<&RadarScan>>>()?;
        merged.add_scan(merge_decoded_scans(scans)?);
    }

    for volume in volumes {
        copy_missing_attributes(&mut merged.attributes, &volume.attributes);
    }
    if let Some(normalizer) = adjust_time {
        adjust_to_nominal_time(&mut merged, normalizer)?;
    }
    info!("merged {} volumes into {} scans", volumes.len(), nscans);
    Ok(merged)
}

/// Stacks independent sweeps into a volume, one elevation per scan.
///
/// The volume takes its source from the last scan and then has it checked
/// against `sources`; the sweeps are not checked for a common source.
pub fn assemble_from_scans(
    scans: Vec<RadarScan>,
    sources: &dyn SourceTable,
    adjust_time: Option<&TimeNormalizer>,
) -> MergeResult<RadarVolume> {
    let first = scans.first().ok_or(MergeError::NoInput)?;
    let elevations: Vec<f64> = scans.iter().map(|scan| scan.elangle).collect();
    let mut volume = RadarVolume::with_order(ScanOrder::of_elevations(&elevations));
    volume.copy_geometry_from(first);

    let mut last_source = String::new();
    for scan in scans {
        last_source.clone_from(&scan.source);
        volume.add_scan(scan);
    }
    volume.source = last_source;
    sources.check_source(&mut volume)?;

    if let Some(normalizer) = adjust_time {
        adjust_to_nominal_time(&mut volume, normalizer)?;
    }
    Ok(volume)
}

/// Builds a polar volume from sweeps of several tasks sharing one cycle.
///
/// The volume time is the first sweep's time floored to the cycle
/// interval and `how/task` is set to `task_name`. Every input must be a scan.
pub fn merge_scans_into_cycle_volume(
    objects: Vec<RadarObject>,
    cycle: &TimeNormalizer,
    task_name: &str,
) -> MergeResult<RadarVolume> {
    let mut volume: Option<RadarVolume> = None;
    for object in objects {
        let scan = match object {
            RadarObject::Scan(scan) => scan,
            RadarObject::Volume(_) => return Err(MergeError::ExpectedScan),
        };
        if volume.is_none() {
            volume = Some(cycle_volume_for(&scan, cycle, task_name)?);
        }
        if let Some(volume) = volume.as_mut() {
            volume.add_scan(scan);
        }
    }
    volume.ok_or(MergeError::NoInput)
}

fn cycle_volume_for(
    scan: &RadarScan,
    cycle: &TimeNormalizer,
    task_name: &str,
) -> MergeResult<RadarVolume> {
    let mut volume = RadarVolume::new();
    volume.source.clone_from(&scan.source);
    let (date, time) = cycle.cycle_floor(&scan.date, &scan.time)?;
    volume.date = date;
    volume.time = time;
    volume.copy_geometry_from(scan);

    volume.attributes.add("how/task", task_name);
    for name in CYCLE_ATTRIBUTES {
        if let Some(value) = scan.attributes.get(name) {
            volume.attributes.add(name, value.clone());
        }
    }
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::PassThroughSources;
    use crate::model::AttributeValue;
    use crate::testing::{single_parameter_scan, single_parameter_volume};

    #[test]
    fn volumes_merge_per_elevation_index() {
        let elevations = [0.5, 1.5, 2.4];
        let volumes = vec![
            single_parameter_volume("DBZH", &elevations),
            single_parameter_volume("VRADH", &elevations),
            single_parameter_volume("RHOHV", &elevations),
        ];
        let merged = merge_volumes(&volumes, None).unwrap();
        assert_eq!(merged.number_of_scans(), 3);
        for (scan, elangle) in merged.scans().iter().zip(elevations) {
            assert_eq!(scan.elangle, elangle);
            assert_eq!(scan.parameter_names(), vec!["DBZH", "RHOHV", "VRADH"]);
        }
    }

    #[test]
    fn volume_top_level_attributes_are_first_wins() {
        let mut a = single_parameter_volume("DBZH", &[0.5]);
        a.attributes.add("how/system", "XAH");
        let mut b = single_parameter_volume("TH", &[0.5]);
        b.attributes.add("how/system", "other");
        b.attributes.add("how/software", "RAINBOW");

        let merged = merge_volumes(&[a, b], None).unwrap();
        assert_eq!(
            merged.attributes.get("how/system"),
            Some(&AttributeValue::String("XAH".into()))
        );
        assert!(merged.attributes.contains("how/software"));
    }

    #[test]
    fn short_volume_is_an_elevation_mismatch() {
        let volumes = vec![
            single_parameter_volume("DBZH", &[0.5, 1.5]),
            single_parameter_volume("VRADH", &[0.5]),
        ];
        assert!(matches!(
            merge_volumes(&volumes, None),
            Err(MergeError::ElevationMismatch(_))
        ));
    }

    #[test]
    fn ascending_volume_rounds_its_own_time() {
        let mut volume = single_parameter_volume("DBZH", &[0.5, 1.5]);
        volume.date = "20171222".into();
        volume.time = "235914".into();
        let merged = merge_volumes(&[volume], Some(&TimeNormalizer::default())).unwrap();
        assert_eq!((merged.date.as_str(), merged.time.as_str()), ("20171223", "000000"));
    }

    #[test]
    fn descending_volume_rounds_end_of_lowest_sweep() {
        let mut volume = single_parameter_volume("DBZH", &[3.5, 1.5, 0.5]);
        assert!(!volume.is_ascending());
        volume.date = "20200101".into();
        volume.time = "000000".into();
        let lowest = volume.scan_closest_to_elevation_mut(0.5).unwrap();
        lowest.end_date = "20200101".into();
        lowest.end_time = "001230".into();

        adjust_to_nominal_time(&mut volume, &TimeNormalizer::default()).unwrap();
        assert_eq!((volume.date.as_str(), volume.time.as_str()), ("20200101", "001200"));
    }

    #[test]
    fn assembled_volume_takes_last_source() {
        let mut low = single_parameter_scan("DBZH", 0.5);
        low.source = "NOD:caxah".into();
        let mut high = single_parameter_scan("DBZH", 1.5);
        high.source = "NOD:caxah,PLC:Egbert".into();

        let volume = assemble_from_scans(vec![low, high], &PassThroughSources, None).unwrap();
        assert_eq!(volume.number_of_scans(), 2);
        assert_eq!(volume.source, "NOD:caxah,PLC:Egbert");
        assert_eq!(volume.beamwidth, 0.95);
    }

    #[test]
    fn assembling_nothing_fails() {
        assert!(matches!(
            assemble_from_scans(Vec::new(), &PassThroughSources, None),
            Err(MergeError::NoInput)
        ));
    }

    #[test]
    fn cycle_volume_floors_time_and_tags_task() {
        let mut first = single_parameter_scan("DBZH", 0.5);
        first.time = "165459".into();
        first.attributes.add("how/wavelength", 5.3);
        first.attributes.add("how/TXpower", 250.0);
        let second = single_parameter_scan("DBZH", 1.5);

        let cycle = TimeNormalizer::new(5).unwrap();
        let objects = vec![RadarObject::from(first), RadarObject::from(second)];
        let volume = merge_scans_into_cycle_volume(objects, &cycle, "DOPVOL1").unwrap();

        assert_eq!((volume.date.as_str(), volume.time.as_str()), ("20151209", "165000"));
        assert_eq!(volume.number_of_scans(), 2);
        assert_eq!(
            volume.attributes.get("how/task"),
            Some(&AttributeValue::String("DOPVOL1".into()))
        );
        assert!(volume.attributes.contains("how/wavelength"));
        assert!(!volume.attributes.contains("how/TXpower"));
    }

    #[test]
    fn cycle_volume_rejects_volumes() {
        let objects = vec![
            RadarObject::from(single_parameter_scan("DBZH", 0.5)),
            RadarObject::from(single_parameter_volume("DBZH", &[0.5])),
        ];
        let cycle = TimeNormalizer::new(5).unwrap();
        assert!(matches!(
            merge_scans_into_cycle_volume(objects, &cycle, "dummy"),
            Err(MergeError::ExpectedScan)
        ));
    }
}
