use crate::workflow::config::WorkflowConfig;
use anyhow::{bail, Context};
use log::{error, info};
use odimcore::interface::{
    merge_container_with, merge_parameter_files, merge_raw_files, open_container, read_object,
    read_parameter_files, Decoder, JsonDecoder, JsonStore, Persistence, SourceTable,
};
use odimcore::merge::{assemble_from_scans, merge_scans_into_cycle_volume, PolarMerger};
use odimcore::model::{RadarObject, RadarScan};
use odimcore::naming::ArchiveName;
use odimcore::telemetry::{MergeMetrics, MetricsSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of one archive in a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub created: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    decoder: Arc<dyn Decoder>,
    store: Arc<dyn Persistence>,
    sources: Arc<dyn SourceTable>,
    metrics: Arc<MergeMetrics>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let sources = config.sources()?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(JsonDecoder),
            Arc::new(JsonStore),
            sources,
        ))
    }

    pub fn with_collaborators(
        config: WorkflowConfig,
        decoder: Arc<dyn Decoder>,
        store: Arc<dyn Persistence>,
        sources: Arc<dyn SourceTable>,
    ) -> Self {
        Self {
            config,
            decoder,
            store,
            sources,
            metrics: Arc::new(MergeMetrics::new()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn save(&self, object: &RadarObject, output: &Path) -> anyhow::Result<PathBuf> {
        self.store
            .save(object, output)
            .with_context(|| format!("saving {}", output.display()))?;
        info!("{} {} written to {}", object.kind(), object.source(), output.display());
        Ok(output.to_path_buf())
    }

    /// Re-encodes one file.
    pub fn convert_single(&self, input: &Path, output: &Path) -> anyhow::Result<PathBuf> {
        let object = read_object(input, self.decoder.as_ref())
            .with_context(|| format!("reading {}", input.display()))?;
        match object {
            Some(object) => self.save(&object, output),
            None => bail!("{} could not be decoded", input.display()),
        }
    }

    /// Single-parameter scans or volumes of one acquisition.
    pub fn merge_parameters(&self, inputs: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let adjust = self.config.time_adjustment()?;
        let merged = merge_parameter_files(inputs, self.decoder.as_ref(), adjust.as_ref())
            .context("merging parameter files")?;
        self.save(&merged, output)
    }

    /// Raw members given as a flat list of files.
    pub fn merge_files(&self, inputs: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let merged = merge_raw_files(inputs, self.decoder.as_ref(), &self.config.exclusions)
            .context("merging raw files")?;
        self.save(&merged, output)
    }

    fn merge_archive_object(&self, archive: &Path) -> anyhow::Result<RadarObject> {
        let container = open_container(archive)
            .with_context(|| format!("opening archive {}", archive.display()))?;
        info!("Opening : {}", archive.display());
        merge_container_with(
            container.as_ref(),
            self.decoder.as_ref(),
            &self.config.exclusions,
            &self.metrics,
        )
        .with_context(|| format!("merging archive {}", archive.display()))
    }

    /// One archive, a tarball or an unpacked directory. Without `output`, the
    /// path is derived from the archive name below the configured base
    /// directory.
    pub fn merge_archive(&self, archive: &Path, output: Option<&Path>) -> anyhow::Result<PathBuf> {
        let output = match output {
            Some(output) => output.to_path_buf(),
            None => {
                let name = ArchiveName::parse(&archive.to_string_lossy())
                    .with_context(|| format!("naming output for {}", archive.display()))?;
                name.output_path(&self.config.output_base_dir)
            }
        };
        let merged = self.merge_archive_object(archive)?;
        self.save(&merged, &output)
    }

    /// Sweeps of several tasks stacked into one cycle volume.
    pub fn merge_sweeps(&self, inputs: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let objects = read_parameter_files(inputs, self.decoder.as_ref());
        self.save_cycle_volume(objects, output)
    }

    /// Several archives, each merged into one sweep, then stacked into one
    /// cycle volume.
    pub fn merge_archives(&self, archives: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let objects = archives
            .iter()
            .map(|archive| self.merge_archive_object(archive))
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.save_cycle_volume(objects, output)
    }

    fn save_cycle_volume(&self, objects: Vec<RadarObject>, output: &Path) -> anyhow::Result<PathBuf> {
        let cycle = self.config.cycle()?;
        let volume = merge_scans_into_cycle_volume(objects, &cycle, &self.config.task_name)
            .context("building cycle volume")?;
        self.save(&volume.into(), output)
    }

    /// Independent sweeps, one elevation each, stacked into a volume whose
    /// source is checked against the site table.
    pub fn stack_scans(&self, inputs: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let scans = read_parameter_files(inputs, self.decoder.as_ref())
            .into_iter()
            .map(|object| match object {
                RadarObject::Scan(scan) => Ok(scan),
                RadarObject::Volume(volume) => {
                    bail!("{} is a volume, expected scans only", volume.source)
                }
            })
            .collect::<anyhow::Result<Vec<RadarScan>>>()?;
        let adjust = self.config.time_adjustment()?;
        let volume = assemble_from_scans(scans, self.sources.as_ref(), adjust.as_ref())
            .context("assembling volume")?;
        self.save(&volume.into(), output)
    }

    /// Previously written objects sharing a source and nominal time.
    pub fn merge_general(&self, inputs: &[PathBuf], output: &Path) -> anyhow::Result<PathBuf> {
        let objects = inputs
            .iter()
            .map(|input| {
                self.store
                    .open(input)
                    .with_context(|| format!("opening {}", input.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let merger = PolarMerger::new(self.config.nominal_interval_minutes)
            .context("nominal time interval")?;
        let merged = merger.merge(objects).context("merging objects")?;
        self.save(&merged, output)
    }

    /// Merges every archive on the blocking pool; each writes to its own
    /// default output path. A failed archive does not stop the others.
    pub async fn batch(&self, archives: Vec<PathBuf>) -> anyhow::Result<BatchReport> {
        let handles: Vec<_> = archives
            .into_iter()
            .map(|archive| {
                let runner = self.clone();
                let path = archive.clone();
                let handle = tokio::task::spawn_blocking(move || runner.merge_archive(&path, None));
                (archive, handle)
            })
            .collect();

        let mut report = BatchReport {
            created: Vec::new(),
            failed: Vec::new(),
        };
        for (archive, handle) in handles {
            match handle.await.context("joining archive worker")? {
                Ok(path) => report.created.push(path),
                Err(err) => {
                    error!("{}: {:#}", archive.display(), err);
                    self.metrics.record_failed();
                    report.failed.push((archive, format!("{:#}", err)));
                }
            }
        }
        Ok(report)
    }
}
