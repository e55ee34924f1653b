//! Convert command implementation
//!
//! Converts either a single job definition file or a whole directory tree of
//! Jenkins jobs. In directory mode every `config.xml` found below the given
//! path is converted, with the job named after its containing directory, and
//! one `.yml` file is written per job. In single-file mode the YAML goes to
//! stdout unless an output directory is given.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use log::info;
use walkdir::WalkDir;

use job_wrecker::registry::translate_job;
use job_wrecker::tree::parse_document;
use job_wrecker::writer::job_document;

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Job definition file, or a directory of jobs to scan for config.xml
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Job name (defaults to the file or directory name)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Directory to write .yml files into (single files print to stdout
    /// when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the convert command
pub fn execute(args: ConvertArgs) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("No such file or directory: {}", args.file.display());
    }

    if args.file.is_dir() {
        convert_directory(&args)
    } else {
        convert_single(&args)
    }
}

fn convert_single(args: &ConvertArgs) -> Result<()> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => job_name_for(&args.file)?,
    };
    let yaml = convert_file(&args.file, &name)?;

    match &args.output {
        Some(directory) => {
            let path = write_job(directory, &name, &yaml)?;
            println!("{} {}", style("wrote").green(), path.display());
        }
        None => print!("{yaml}"),
    }
    Ok(())
}

fn convert_directory(args: &ConvertArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut converted = 0usize;
    let mut failed = 0usize;
    for entry in WalkDir::new(&args.file).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to scan directory: {}", args.file.display())
        })?;
        if !entry.file_type().is_file() || entry.file_name() != "config.xml" {
            continue;
        }

        let name = job_name_for(entry.path())?;
        match convert_file(entry.path(), &name) {
            Ok(yaml) => {
                let path = write_job(&output, &name, &yaml)?;
                info!("wrote {}", path.display());
                converted += 1;
            }
            Err(err) => {
                eprintln!(
                    "{} {}: {err:#}",
                    style("failed").red(),
                    entry.path().display()
                );
                failed += 1;
            }
        }
    }

    if converted == 0 && failed == 0 {
        anyhow::bail!("No config.xml files found under {}", args.file.display());
    }
    println!(
        "{} {converted} job(s), {failed} failure(s)",
        style("converted").green()
    );
    if failed > 0 {
        anyhow::bail!("{failed} job(s) could not be converted");
    }
    Ok(())
}

fn convert_file(path: &Path, name: &str) -> Result<String> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let root = parse_document(&xml)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let scope = translate_job(&root)
        .with_context(|| format!("Failed to convert {}", path.display()))?;
    Ok(job_document(name, &scope))
}

/// A job's name comes from its file stem, except the conventional
/// `config.xml` which takes the name of its directory.
fn job_name_for(path: &Path) -> Result<String> {
    let source = if path.file_name().is_some_and(|name| name == "config.xml") {
        path.parent().and_then(Path::file_name)
    } else {
        path.file_stem()
    };
    source
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .with_context(|| format!("Cannot derive a job name from {}", path.display()))
}

fn write_job(directory: &Path, name: &str, yaml: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;
    let path = directory.join(format!("{name}.yml"));
    fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
