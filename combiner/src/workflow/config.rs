use anyhow::Context;
use odimcore::interface::{PassThroughSources, SiteTable, SourceTable};
use odimcore::merge::ExclusionList;
use odimcore::timing::{TimeNormalizer, ACQUISITION_UPDATE_MINUTES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub nominal_interval_minutes: u32,
    pub cycle_interval_minutes: u32,
    pub task_name: String,
    pub adjust_time: bool,
    pub output_base_dir: PathBuf,
    pub source_table: Option<PathBuf>,
    pub exclusions: ExclusionList,
    pub jobs: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            nominal_interval_minutes: ACQUISITION_UPDATE_MINUTES,
            cycle_interval_minutes: 5,
            task_name: "dummy".to_string(),
            adjust_time: true,
            output_base_dir: PathBuf::from("."),
            source_table: None,
            exclusions: ExclusionList::default(),
            jobs: 4,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        nominal_interval_minutes: u32,
        output_base_dir: PathBuf,
        source_table: Option<PathBuf>,
    ) -> Self {
        Self {
            nominal_interval_minutes,
            output_base_dir,
            source_table,
            ..Default::default()
        }
    }

    pub fn normalizer(&self) -> anyhow::Result<TimeNormalizer> {
        TimeNormalizer::new(self.nominal_interval_minutes).context("nominal time interval")
    }

    /// Normalizer applied after volume assembly, if enabled.
    pub fn time_adjustment(&self) -> anyhow::Result<Option<TimeNormalizer>> {
        if self.adjust_time {
            self.normalizer().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn cycle(&self) -> anyhow::Result<TimeNormalizer> {
        TimeNormalizer::new(self.cycle_interval_minutes).context("cycle interval")
    }

    pub fn sources(&self) -> anyhow::Result<Arc<dyn SourceTable>> {
        match &self.source_table {
            Some(path) => {
                let table = SiteTable::load(path)
                    .with_context(|| format!("loading site table {}", path.display()))?;
                Ok(Arc::new(table))
            }
            None => Ok(Arc::new(PassThroughSources)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_defaults() {
        let cfg = WorkflowConfig::from_args(10, PathBuf::from("/data/out"), None);
        assert_eq!(cfg.normalizer().unwrap().interval_minutes(), 10);
        assert_eq!(cfg.cycle().unwrap().interval_minutes(), 5);
        assert_eq!(cfg.task_name, "dummy");
        assert_eq!(cfg.exclusions, ExclusionList::default());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"nominal_interval_minutes: 15\n\
              task_name: HYBRID\n\
              adjust_time: false\n\
              exclusions:\n  - ppdf: CUSTOM.dpatc\n    quantity: KDP\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.nominal_interval_minutes, 15);
        assert_eq!(cfg.task_name, "HYBRID");
        assert!(cfg.time_adjustment().unwrap().is_none());
        assert_eq!(cfg.exclusions.rules()[0].quantity, "KDP");
        assert_eq!(cfg.jobs, 4);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = WorkflowConfig::from_args(0, PathBuf::from("."), None);
        assert!(cfg.normalizer().is_err());
    }

    #[test]
    fn missing_site_table_is_reported() {
        let cfg = WorkflowConfig::from_args(6, PathBuf::from("."), Some("/nonexistent.yaml".into()));
        let err = cfg.sources().err().unwrap();
        assert!(err.to_string().contains("loading site table"));
    }
}
