use crate::prelude::{MergeError, MergeResult};
use chrono::NaiveDateTime;
use std::fmt;

const TIMESTAMP_LEN: usize = 14;
const VERSION_END: usize = 16;
const GZIP_SUFFIX: &str = ".gz";

/// Classification carried by the top directory of an archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    RawData,
    Other(String),
}

impl FileType {
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::RawData)
    }
}

impl From<&str> for FileType {
    fn from(s: &str) -> Self {
        match s {
            "rawdata" => Self::RawData,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RawData => write!(f, "rawdata"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Metadata decoded from the path of one archive member or raw file.
///
/// Member basenames look like `2015120916500500dBZ.azi`, optionally behind a
/// `sSITE_` prefix: acquisition timestamp, two-character file version,
/// quantity code, then the scan type after the first dot. In archive-member
/// mode the four enclosing directories are, from the top,
/// `filetype/site/sdf-or-ppdf/date`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub path: String,
    pub basename: String,
    pub timestamp: NaiveDateTime,
    pub file_version: String,
    pub quantity: String,
    pub scan_type: String,
    pub date: String,
    pub sdf: String,
    pub ppdf: String,
    pub site: String,
    pub file_type: FileType,
}

impl MemberDescriptor {
    /// Decodes an archive member path, directory context included.
    pub fn from_member_path(path: &str) -> MergeResult<Self> {
        let mut descriptor = Self::decode_basename(path)?;

        let dirs: Vec<&str> = parent_segments(path);
        if dirs.len() < 4 {
            return Err(MergeError::malformed(
                path,
                "expected filetype/site/sdf/date directories",
            ));
        }
        let n = dirs.len();
        descriptor.date = dirs[n - 1].to_string();
        let sdf = dirs[n - 2];
        if sdf.ends_with(descriptor.scan_type.as_str()) {
            descriptor.sdf = sdf.to_string();
        } else {
            // post-processing output; the sdf is only known after decoding
            descriptor.ppdf = sdf.to_string();
        }
        descriptor.site = dirs[n - 3].to_string();
        descriptor.file_type = FileType::from(dirs[n - 4]);
        Ok(descriptor)
    }

    /// Decodes a standalone raw file path; directories are ignored.
    pub fn from_flat_path(path: &str) -> MergeResult<Self> {
        Self::decode_basename(path)
    }

    pub fn is_raw(&self) -> bool {
        self.file_type.is_raw()
    }

    /// `YYYY-MM-DD HH:MM:SS` form of the acquisition timestamp.
    pub fn iso8601(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn decode_basename(path: &str) -> MergeResult<Self> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let basename = file_name.rsplit('_').next().unwrap_or(file_name);

        let stamp = basename
            .get(..TIMESTAMP_LEN)
            .ok_or_else(|| MergeError::malformed(path, "basename too short for a timestamp"))?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
            .map_err(|e| MergeError::malformed(path, e.to_string()))?;
        let file_version = basename
            .get(TIMESTAMP_LEN..VERSION_END)
            .ok_or_else(|| MergeError::malformed(path, "missing file version"))?;
        let dot = basename
            .find('.')
            .filter(|&dot| dot >= VERSION_END)
            .ok_or_else(|| MergeError::malformed(path, "missing scan type suffix"))?;
        let scan_type = &basename[dot + 1..];
        // compression is not part of the scan type
        let scan_type = scan_type.strip_suffix(GZIP_SUFFIX).unwrap_or(scan_type);

        Ok(Self {
            path: path.to_string(),
            basename: basename.to_string(),
            timestamp,
            file_version: file_version.to_string(),
            quantity: basename[VERSION_END..dot].to_string(),
            scan_type: scan_type.to_string(),
            date: String::new(),
            sdf: String::new(),
            ppdf: String::new(),
            site: String::new(),
            file_type: FileType::RawData,
        })
    }
}

fn parent_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    segments.pop();
    segments
}
