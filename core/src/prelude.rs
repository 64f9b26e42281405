use std::path::PathBuf;

pub use crate::model::{
    AttributeValue, Attributes, Parameter, RadarObject, RadarScan, RadarVolume, ScanOrder,
};
pub use crate::naming::{ArchiveName, FileType, MemberDescriptor};

/// Broad failure categories surfaced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input handed to the engine; never retried.
    InputValidation,
    /// The inputs cannot be combined; fatal to the merge call.
    StructuralMerge,
    /// A quantity name would appear twice in one scan.
    DuplicateQuantity,
    Io,
    Format,
}

/// Common error type for every merge operation.
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("input file {} is not a regular file", .0.display())]
    MissingFile(PathBuf),
    #[error("input file {} is zero-length", .0.display())]
    EmptyFile(PathBuf),
    #[error("{0} is not a recognized radar format")]
    NotRecognized(String),
    #[error("malformed name \"{name}\": {reason}")]
    MalformedName { name: String, reason: String },
    #[error("invalid date/time \"{0}\"")]
    InvalidDateTime(String),
    #[error("nominal time interval must be at least one minute")]
    InvalidInterval,
    #[error("expected exactly one quantity, found {0}")]
    QuantityCount(usize),
    #[error("can not merge a volume into a scan")]
    VolumeIntoScan,
    #[error("elevation mismatch: {0}")]
    ElevationMismatch(String),
    #[error("source and nominal time must be identical when merging ({expected} vs {found})")]
    SourceTimeMismatch { expected: String, found: String },
    #[error("archive mixes scan and volume members ({0})")]
    MixedMembers(String),
    #[error("expected a scan, found a volume")]
    ExpectedScan,
    #[error("nothing to merge")]
    NoInput,
    #[error("quantity {0} already exists in scan")]
    DuplicateQuantity(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl MergeError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFile(_)
            | Self::EmptyFile(_)
            | Self::NotRecognized(_)
            | Self::MalformedName { .. }
            | Self::InvalidDateTime(_)
            | Self::InvalidInterval => ErrorKind::InputValidation,
            Self::QuantityCount(_)
            | Self::VolumeIntoScan
            | Self::ElevationMismatch(_)
            | Self::SourceTimeMismatch { .. }
            | Self::MixedMembers(_)
            | Self::ExpectedScan
            | Self::NoInput => ErrorKind::StructuralMerge,
            Self::DuplicateQuantity(_) => ErrorKind::DuplicateQuantity,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) | Self::Yaml(_) => ErrorKind::Format,
        }
    }
}

pub type MergeResult<T> = Result<T, MergeError>;
