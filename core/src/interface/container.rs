use crate::prelude::{MergeError, MergeResult};
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;

const GZIP_SUFFIXES: [&str; 2] = [".gz", ".tgz"];

/// Lists and extracts the members of an archive.
pub trait ContainerReader {
    /// Member names in enumeration order, `/`-separated.
    fn members(&self) -> MergeResult<Vec<String>>;

    fn extract(&self, member: &str) -> MergeResult<Vec<u8>>;

    /// Name the container is known by, used for logging and output naming.
    fn name(&self) -> String;
}

/// Opens `path` as a tarball, or as an unpacked archive when it is a
/// directory.
pub fn open_container(path: &Path) -> MergeResult<Box<dyn ContainerReader + Send>> {
    if path.is_dir() {
        Ok(Box::new(DirectoryContainer::open(path)?))
    } else {
        Ok(Box::new(TarContainer::open(path)?))
    }
}

/// A tar archive, gzipped when the name says so. Regular-file entries are
/// read once, in header order; directories and links are left out.
#[derive(Debug, Clone)]
pub struct TarContainer {
    name: String,
    entries: Vec<(String, Vec<u8>)>,
}

impl TarContainer {
    pub fn open<P: AsRef<Path>>(path: P) -> MergeResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MergeError::MissingFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        if GZIP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Self::from_reader(name, GzDecoder::new(file))
        } else {
            Self::from_reader(name, file)
        }
    }

    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> MergeResult<Self> {
        let mut archive = Archive::new(reader);
        let mut entries = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let member = member_name(&entry.path()?);
            let mut payload = Vec::new();
            entry.read_to_end(&mut payload)?;
            entries.push((member, payload));
        }
        Ok(Self {
            name: name.into(),
            entries,
        })
    }
}

impl ContainerReader for TarContainer {
    fn members(&self) -> MergeResult<Vec<String>> {
        Ok(self.entries.iter().map(|(member, _)| member.clone()).collect())
    }

    fn extract(&self, member: &str) -> MergeResult<Vec<u8>> {
        self.entries
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| MergeError::MissingFile(PathBuf::from(member)))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// `/`-joined normal components of a relative path.
fn member_name(path: &Path) -> String {
    let segments: Vec<String> = path
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.join("/")
}

/// An unpacked archive on disk. A directory has no enumeration order of its
/// own, so members are the regular files below the root in sorted path order.
#[derive(Debug, Clone)]
pub struct DirectoryContainer {
    root: PathBuf,
}

impl DirectoryContainer {
    pub fn open<P: AsRef<Path>>(root: P) -> MergeResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(MergeError::MissingFile(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContainerReader for DirectoryContainer {
    fn members(&self) -> MergeResult<Vec<String>> {
        let mut members = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            members.push(member_name(relative));
        }
        Ok(members)
    }

    fn extract(&self, member: &str) -> MergeResult<Vec<u8>> {
        let path = member
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment));
        if !path.is_file() {
            return Err(MergeError::MissingFile(path));
        }
        Ok(fs::read(path)?)
    }

    fn name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

/// Members held in memory, enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    name: String,
    order: Vec<String>,
    payloads: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn insert(&mut self, member: impl Into<String>, payload: Vec<u8>) {
        let member = member.into();
        if self.payloads.insert(member.clone(), payload).is_none() {
            self.order.push(member);
        }
    }
}

impl ContainerReader for MemoryContainer {
    fn members(&self) -> MergeResult<Vec<String>> {
        Ok(self.order.clone())
    }

    fn extract(&self, member: &str) -> MergeResult<Vec<u8>> {
        self.payloads
            .get(member)
            .cloned()
            .ok_or_else(|| MergeError::MissingFile(PathBuf::from(member)))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
