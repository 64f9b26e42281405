use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Merges single-parameter radar files into ODIM objects")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,
    /// Nominal time interval in minutes
    #[arg(long, global = true, default_value_t = 6)]
    interval: u32,
    /// Base directory for default output naming
    #[arg(short = 'b', long, global = true, default_value = ".")]
    output_base_dir: PathBuf,
    /// Site table YAML used to check volume sources
    #[arg(long, global = true)]
    sources: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one file
    Single {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge single-parameter scans or volumes of one acquisition
    Params {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge raw member files given as a list
    Files {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge one archive (.tar.gz or unpacked directory)
    Archive {
        #[arg(short, long)]
        input: PathBuf,
        /// Defaults to SITE/yyyy-mm-dd/SDF/SITE.yyyy-mm-dd_hhmmZ.SDF.h5
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stack sweeps of several tasks into a cycle volume
    Sweeps {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        task: Option<String>,
    },
    /// Merge several archives (.tar.gz or unpacked) into a cycle volume
    Archives {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        task: Option<String>,
    },
    /// Stack independent sweeps into a volume with a checked source
    Stack {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge objects sharing a source and nominal time
    Merge {
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge many archives (.tar.gz or unpacked) in parallel with default output naming
    Batch {
        #[arg(required = true)]
        archives: Vec<PathBuf>,
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.interval, args.output_base_dir.clone(), args.sources.clone())
    };

    let created = match args.command {
        Command::Single { input, output } => {
            vec![Runner::new(workflow_config)?.convert_single(&input, &output)?]
        }
        Command::Params { input, output } => {
            vec![Runner::new(workflow_config)?.merge_parameters(&input, &output)?]
        }
        Command::Files { input, output } => {
            vec![Runner::new(workflow_config)?.merge_files(&input, &output)?]
        }
        Command::Archive { input, output } => {
            vec![Runner::new(workflow_config)?.merge_archive(&input, output.as_deref())?]
        }
        Command::Sweeps {
            input,
            output,
            task,
        } => {
            if let Some(task) = task {
                workflow_config.task_name = task;
            }
            vec![Runner::new(workflow_config)?.merge_sweeps(&input, &output)?]
        }
        Command::Archives {
            input,
            output,
            task,
        } => {
            if let Some(task) = task {
                workflow_config.task_name = task;
            }
            vec![Runner::new(workflow_config)?.merge_archives(&input, &output)?]
        }
        Command::Stack { input, output } => {
            vec![Runner::new(workflow_config)?.stack_scans(&input, &output)?]
        }
        Command::Merge { input, output } => {
            vec![Runner::new(workflow_config)?.merge_general(&input, &output)?]
        }
        Command::Batch { archives, jobs } => {
            if let Some(jobs) = jobs {
                workflow_config.jobs = jobs;
            }
            let runtime = TokioBuilder::new_multi_thread()
                .max_blocking_threads(workflow_config.jobs.max(1))
                .enable_all()
                .build()
                .context("creating runtime for batch merge")?;
            let runner = Runner::new(workflow_config)?;
            let report = runtime.block_on(runner.batch(archives))?;
            let metrics = runner.metrics();
            println!(
                "Batch -> created {}, failed {}, members merged {}, skipped {}",
                report.created.len(),
                report.failed.len(),
                metrics.merged,
                metrics.skipped
            );
            for (archive, reason) in &report.failed {
                eprintln!("Failed : {} ({})", archive.display(), reason);
            }
            report.created
        }
    };

    for path in created {
        println!("Created : {}", path.display());
    }
    Ok(())
}
