use crate::prelude::{MergeError, MergeResult};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Fields decoded from an archive file name `SITE_yyyymmddhhmm_SDF[.tar.gz]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveName {
    pub site: String,
    pub yyyymmddhhmm: String,
    /// `YYYY-MM-DD HH:MM:00`
    pub iso8601: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HHMMZ`
    pub hhmm_z: String,
    /// `YYYY-MM-DD_HHMMZ`
    pub timestamp: String,
    /// Scan definition file; everything after the timestamp, `_`-joined.
    pub sdf: String,
}

impl ArchiveName {
    pub fn parse(path: &str) -> MergeResult<Self> {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| MergeError::malformed(path, "no file name"))?;
        let stem = file_name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(file_name);

        let segments: Vec<&str> = stem.split('_').collect();
        if segments.len() < 3 {
            return Err(MergeError::malformed(path, "expected SITE_yyyymmddhhmm_SDF"));
        }
        let stamp = segments[1];
        if stamp.len() != 12 {
            return Err(MergeError::malformed(path, "timestamp is not yyyymmddhhmm"));
        }
        let time = NaiveDateTime::parse_from_str(&format!("{}00", stamp), "%Y%m%d%H%M%S")
            .map_err(|e| MergeError::malformed(path, e.to_string()))?;

        let date = time.format("%Y-%m-%d").to_string();
        let hhmm_z = time.format("%H%MZ").to_string();
        Ok(Self {
            site: segments[0].to_string(),
            yyyymmddhhmm: stamp.to_string(),
            iso8601: time.format("%Y-%m-%d %H:%M:00").to_string(),
            timestamp: format!("{}_{}", date, hhmm_z),
            date,
            hhmm_z,
            sdf: segments[2..].join("_"),
        })
    }

    /// `{site}/{date}/{sdf}` below `base`.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.site).join(&self.date).join(&self.sdf)
    }

    /// `{site}.{timestamp}.{sdf}.h5`
    pub fn output_file_name(&self) -> String {
        format!("{}.{}.{}.h5", self.site, self.timestamp, self.sdf)
    }

    pub fn output_path(&self, base: &Path) -> PathBuf {
        self.output_dir(base).join(self.output_file_name())
    }
}
