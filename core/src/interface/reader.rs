//! File-level entry points: reading single objects from disk and merging
//! lists of files or whole containers.

use crate::interface::container::ContainerReader;
use crate::interface::decoder::Decoder;
use crate::merge::{
    merge_decoded_scans, merge_raw_archive_with, merge_volumes, ExclusionList,
};
use crate::model::{RadarObject, RadarScan, RadarVolume};
use crate::naming::MemberDescriptor;
use crate::prelude::{MergeError, MergeResult};
use crate::telemetry::{MergeLogger, MergeMetrics};
use crate::timing::TimeNormalizer;
use flate2::read::GzDecoder;
use log::{info, warn};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

const GZIP_SUFFIX: &str = ".gz";

/// Rudimentary checks before anything is decoded: a regular, non-empty file.
pub fn validate_file(path: &Path) -> MergeResult<()> {
    let metadata = fs::metadata(path).map_err(|_| MergeError::MissingFile(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(MergeError::MissingFile(path.to_path_buf()));
    }
    if metadata.len() == 0 {
        return Err(MergeError::EmptyFile(path.to_path_buf()));
    }
    Ok(())
}

/// Inflates `bytes` when `name` carries a `.gz` suffix.
pub fn inflate_if_gzipped(name: &str, bytes: Vec<u8>) -> MergeResult<Vec<u8>> {
    if !name.ends_with(GZIP_SUFFIX) {
        return Ok(bytes);
    }
    let mut inflated = Vec::new();
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut inflated)?;
    Ok(inflated)
}

fn load_payload(path: &Path) -> MergeResult<Vec<u8>> {
    validate_file(path)?;
    inflate_if_gzipped(&path.to_string_lossy(), fs::read(path)?)
}

/// Reads one radar object from disk.
///
/// Fails when the file is missing, empty or not in a recognised format.
/// A recognised but undecodable file gives `Ok(None)` so callers walking
/// many files can skip it.
pub fn read_object(path: &Path, decoder: &dyn Decoder) -> MergeResult<Option<RadarObject>> {
    let payload = load_payload(path)?;
    if !decoder.is_recognized(&payload) {
        return Err(MergeError::NotRecognized(path.display().to_string()));
    }
    Ok(decoder.decode(&path.to_string_lossy(), &payload))
}

/// Sorts paths case-insensitively, the order every file-list merge uses.
pub fn sort_case_insensitive(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|path| path.to_string_lossy().to_lowercase());
}

/// Reads every path in case-insensitive order; unreadable files are logged
/// and left out.
pub fn read_parameter_files(paths: &[PathBuf], decoder: &dyn Decoder) -> Vec<RadarObject> {
    let mut sorted = paths.to_vec();
    sort_case_insensitive(&mut sorted);
    sorted
        .iter()
        .filter_map(|path| match read_object(path, decoder) {
            Ok(Some(object)) => Some(object),
            Ok(None) => {
                warn!("skipping {}: could not be decoded", path.display());
                None
            }
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                None
            }
        })
        .collect()
}

/// Merges single-parameter files of one acquisition.
///
/// Scans fold into one scan. Volumes fold per elevation index and the
/// result is moved to its nominal time when `adjust_time` is given.
pub fn merge_parameter_files(
    paths: &[PathBuf],
    decoder: &dyn Decoder,
    adjust_time: Option<&TimeNormalizer>,
) -> MergeResult<RadarObject> {
    let objects = read_parameter_files(paths, decoder);
    let first_is_volume = objects.first().ok_or(MergeError::NoInput)?.is_volume();
    if first_is_volume {
        let volumes = objects
            .into_iter()
            .map(|object| match object {
                RadarObject::Volume(volume) => Ok(volume),
                RadarObject::Scan(scan) => Err(MergeError::MixedMembers(scan.source)),
            })
            .collect::<MergeResult<Vec<RadarVolume>>>()?;
        Ok(merge_volumes(&volumes, adjust_time)?.into())
    } else {
        let scans = objects
            .into_iter()
            .map(|object| match object {
                RadarObject::Scan(scan) => Ok(scan),
                RadarObject::Volume(_) => Err(MergeError::VolumeIntoScan),
            })
            .collect::<MergeResult<Vec<RadarScan>>>()?;
        Ok(merge_decoded_scans(&scans)?.into())
    }
}

/// Raw-member merge over standalone files, taken in the order given.
///
/// Every path is validated before the first one is decoded.
pub fn merge_raw_files(
    paths: &[PathBuf],
    decoder: &dyn Decoder,
    exclusions: &ExclusionList,
) -> MergeResult<RadarObject> {
    for path in paths {
        validate_file(path)?;
    }
    let members = paths
        .iter()
        .map(|path| {
            let descriptor = MemberDescriptor::from_flat_path(&path.to_string_lossy())?;
            Ok((load_payload(path)?, descriptor))
        })
        .collect::<MergeResult<Vec<_>>>()?;
    merge_raw_archive_with(
        members,
        decoder,
        exclusions,
        &MergeLogger::new("files"),
        &MergeMetrics::new(),
    )
}

/// Raw-member merge over every member of a container.
pub fn merge_container(
    container: &dyn ContainerReader,
    decoder: &dyn Decoder,
    exclusions: &ExclusionList,
) -> MergeResult<RadarObject> {
    merge_container_with(container, decoder, exclusions, &MergeMetrics::new())
}

pub fn merge_container_with(
    container: &dyn ContainerReader,
    decoder: &dyn Decoder,
    exclusions: &ExclusionList,
    metrics: &MergeMetrics,
) -> MergeResult<RadarObject> {
    let logger = MergeLogger::new(container.name());
    let mut members = Vec::new();
    for name in container.members()? {
        let descriptor = match MemberDescriptor::from_member_path(&name) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                logger.skipped(&format!("ignoring member: {}", err));
                metrics.record_skipped();
                continue;
            }
        };
        if !exclusions.admits(&descriptor) {
            logger.detail(&format!("not extracting {}", name));
            metrics.record_skipped();
            continue;
        }
        let payload = inflate_if_gzipped(&name, container.extract(&name)?)?;
        members.push((payload, descriptor));
    }
    info!("{}: {} members to merge", container.name(), members.len());
    merge_raw_archive_with(members, decoder, exclusions, &logger, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{JsonDecoder, MemoryContainer};
    use crate::prelude::ErrorKind;
    use crate::testing::{single_parameter_scan, single_parameter_volume};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_object(dir: &Path, name: &str, object: impl Into<RadarObject>) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_vec(&object.into()).unwrap()).unwrap();
        path
    }

    #[test]
    fn validation_rejects_missing_and_empty_files() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.azi");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            validate_file(&dir.path().join("absent.azi")),
            Err(MergeError::MissingFile(_))
        ));
        assert!(matches!(validate_file(&empty), Err(MergeError::EmptyFile(_))));
        assert!(matches!(validate_file(dir.path()), Err(MergeError::MissingFile(_))));
    }

    #[test]
    fn reads_gzipped_object() {
        let dir = tempdir().unwrap();
        let scan = single_parameter_scan("DBZH", 0.5);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&serde_json::to_vec(&RadarObject::from(scan.clone())).unwrap())
            .unwrap();
        let path = dir.path().join("2015120916500500dBZ.azi.gz");
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let object = read_object(&path, &JsonDecoder).unwrap();
        assert_eq!(object, Some(RadarObject::Scan(scan)));
    }

    #[test]
    fn unrecognized_is_an_error_corrupt_is_none() {
        let dir = tempdir().unwrap();
        let foreign = dir.path().join("foreign.vol");
        fs::write(&foreign, b"<volume/>").unwrap();
        let err = read_object(&foreign, &JsonDecoder).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);

        let corrupt = dir.path().join("corrupt.vol");
        fs::write(&corrupt, b"{\"object\":").unwrap();
        assert_eq!(read_object(&corrupt, &JsonDecoder).unwrap(), None);
    }

    #[test]
    fn parameter_scans_merge_in_case_insensitive_order() {
        let dir = tempdir().unwrap();
        let mut late = single_parameter_scan("DBZH", 0.5);
        late.attributes.add("how/system", "upper");
        let mut early = single_parameter_scan("VRADH", 0.5);
        early.attributes.add("how/system", "lower");
        let paths = vec![
            write_object(dir.path(), "B_dbzh.json", late),
            write_object(dir.path(), "a_vradh.json", early),
            write_object(dir.path(), "c_broken.json", single_parameter_scan("TH", 0.5)),
        ];
        fs::write(&paths[2], b"").unwrap();

        let merged = merge_parameter_files(&paths, &JsonDecoder, None).unwrap();
        let scan = merged.as_scan().unwrap();
        assert_eq!(scan.parameter_names(), vec!["DBZH", "VRADH"]);
        assert_eq!(
            scan.attributes.get("how/system"),
            Some(&crate::model::AttributeValue::String("lower".into()))
        );
    }

    #[test]
    fn parameter_volumes_are_time_adjusted() {
        let dir = tempdir().unwrap();
        let paths = vec![
            write_object(dir.path(), "dbzh.json", single_parameter_volume("DBZH", &[0.5, 1.5])),
            write_object(dir.path(), "vradh.json", single_parameter_volume("VRADH", &[0.5, 1.5])),
        ];
        let normalizer = TimeNormalizer::default();
        let merged = merge_parameter_files(&paths, &JsonDecoder, Some(&normalizer)).unwrap();
        let volume = merged.as_volume().unwrap();
        assert_eq!(volume.number_of_scans(), 2);
        assert_eq!(volume.time, "164800");
    }

    #[test]
    fn nothing_readable_is_no_input() {
        assert!(matches!(
            merge_parameter_files(&[], &JsonDecoder, None),
            Err(MergeError::NoInput)
        ));
    }

    #[test]
    fn raw_files_keep_given_order() {
        let dir = tempdir().unwrap();
        let mut vrad = single_parameter_scan("VRADH", 0.5);
        vrad.attributes.add("how/system", "V");
        let mut dbz = single_parameter_scan("DBZH", 0.5);
        dbz.attributes.add("how/system", "Z");
        let paths = vec![
            write_object(dir.path(), "2015120916500500V.azi", vrad),
            write_object(dir.path(), "2015120916500500dBZ.azi", dbz),
        ];
        let merged = merge_raw_files(&paths, &JsonDecoder, &ExclusionList::default()).unwrap();
        assert_eq!(
            merged.as_scan().unwrap().attributes.get("how/system"),
            Some(&crate::model::AttributeValue::String("V".into()))
        );
    }

    #[test]
    fn raw_files_are_all_validated_first() {
        let dir = tempdir().unwrap();
        let good = write_object(
            dir.path(),
            "2015120916500500dBZ.azi",
            single_parameter_scan("DBZH", 0.5),
        );
        let paths = vec![good, dir.path().join("2015120916500500V.azi")];
        assert!(matches!(
            merge_raw_files(&paths, &JsonDecoder, &ExclusionList::none()),
            Err(MergeError::MissingFile(_))
        ));
    }

    #[test]
    fn gzipped_container_member_is_not_renamed() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&serde_json::to_vec(&RadarObject::from(single_parameter_scan("DBZH", 0.5))).unwrap())
            .unwrap();
        let mut container = MemoryContainer::new("XAH_201512091650_DOPVOL1_A.azi");
        container.insert(
            "rawdata/XAH/DOPVOL1_A.azi/2015-12-09/2015120916500500dBZ.azi.gz",
            encoder.finish().unwrap(),
        );

        let merged = merge_container(&container, &JsonDecoder, &ExclusionList::default()).unwrap();
        assert_eq!(merged.as_scan().unwrap().parameter_names(), vec!["DBZH"]);
    }

    #[test]
    fn container_members_are_filtered_before_extraction() {
        let mut container = MemoryContainer::new("XAH_201512091650_DOPVOL1_A.azi");
        let scan = |q: &str| serde_json::to_vec(&RadarObject::from(single_parameter_scan(q, 0.5))).unwrap();
        container.insert(
            "rawdata/XAH/DOPVOL1_A.azi/2015-12-09/2015120916500500dBZ.azi",
            scan("DBZH"),
        );
        container.insert("README", b"not a member".to_vec());
        container.insert(
            "rawdata/XAH/ZPHI_ITER_DEFAULT.dpatc/2015-12-09/2015120916500500ZDR.azi",
            b"never extracted".to_vec(),
        );
        container.insert(
            "rawdata/XAH/DOPVOL1_A.azi/2015-12-09/2015120916500500V.azi",
            scan("VRADH"),
        );

        let metrics = MergeMetrics::new();
        let merged =
            merge_container_with(&container, &JsonDecoder, &ExclusionList::default(), &metrics)
                .unwrap();
        assert_eq!(merged.as_scan().unwrap().parameter_names(), vec!["DBZH", "VRADH"]);
        assert_eq!(metrics.snapshot().merged, 2);
        assert_eq!(metrics.snapshot().skipped, 2);
    }
}
