use crate::model::RadarObject;
use crate::prelude::MergeResult;
use std::fs;
use std::path::Path;

/// Writes and reads merged objects in the interchange format.
pub trait Persistence: Send + Sync {
    fn save(&self, object: &RadarObject, path: &Path) -> MergeResult<()>;

    fn open(&self, path: &Path) -> MergeResult<RadarObject>;
}

/// Pretty-printed JSON files. Parent directories are created on save.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl Persistence for JsonStore {
    fn save(&self, object: &RadarObject, path: &Path) -> MergeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(object)?)?;
        Ok(())
    }

    fn open(&self, path: &Path) -> MergeResult<RadarObject> {
        let mut object: RadarObject = serde_json::from_slice(&fs::read(path)?)?;
        if let RadarObject::Volume(volume) = &mut object {
            let order = volume.order();
            volume.sort_by_elevations(order);
        }
        Ok(object)
    }
}
