use crate::model::RadarVolume;
use crate::prelude::MergeResult;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Validates and normalizes the source identifier of an assembled volume.
pub trait SourceTable: Send + Sync {
    fn check_source(&self, volume: &mut RadarVolume) -> MergeResult<()>;
}

/// Leaves every source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughSources;

impl SourceTable for PassThroughSources {
    fn check_source(&self, _volume: &mut RadarVolume) -> MergeResult<()> {
        Ok(())
    }
}

/// Site registry keyed by ODIM node (`NOD:` field of the source string).
///
/// The YAML form maps each node to its canonical source string:
///
/// ```yaml
/// caxah: "WMO:71363,NOD:caxah,PLC:Chipman"
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteTable {
    sites: BTreeMap<String, String>,
}

impl SiteTable {
    pub fn new(sites: BTreeMap<String, String>) -> Self {
        Self { sites }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> MergeResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> MergeResult<Self> {
        Ok(Self::new(serde_yaml::from_str(contents)?))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn lookup(&self, node: &str) -> Option<&str> {
        self.sites.get(node).map(String::as_str)
    }
}

impl SourceTable for SiteTable {
    fn check_source(&self, volume: &mut RadarVolume) -> MergeResult<()> {
        let Some(node) = node_of(&volume.source) else {
            warn!("source \"{}\" has no NOD field", volume.source);
            return Ok(());
        };
        match self.lookup(node) {
            Some(canonical) => {
                debug!("source {} -> {}", volume.source, canonical);
                volume.source = canonical.to_string();
            }
            None => warn!("node {} is not in the site table", node),
        }
        Ok(())
    }
}

/// `NOD:` value of an ODIM source string.
pub fn node_of(source: &str) -> Option<&str> {
    source
        .split(',')
        .find_map(|field| field.trim().strip_prefix("NOD:"))
}
