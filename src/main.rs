//! splitmark: split documents into content-addressed sections and join them back.
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use splitmark::config::Config;
use splitmark::processor::{ProcessingMethod, Processor};
use splitmark::reconstruct::{AnchorAnalysis, DocumentReconstructor, ReferenceValidation};
use splitmark::store::SectionStore;
use splitmark::writer::{SectionWriter, WriteOptions, WriteResult, WriteStatus, WriteSummary};
use splitmark::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "splitmark")]
#[command(about = "Content-addressed section splitting for text documents", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./splitmark.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a document into an anchor file and hash-named section files
    Split {
        /// Document to split
        input: PathBuf,
        /// Output directory (defaults to a directory named after the input, beside it)
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,
        /// Hash length in hex characters (8 to 16)
        #[arg(long, value_name = "N")]
        hash_length: Option<usize>,
        /// Replace existing files
        #[arg(long)]
        overwrite: bool,
        /// Remove this input's earlier anchor and the sections it references before writing
        #[arg(long)]
        clean: bool,
        /// Stamp every section with the same timestamp
        #[arg(long)]
        shared_timestamp: bool,
        /// Do not append a reference block to the anchor
        #[arg(long)]
        no_references: bool,
    },
    /// Rebuild a document from its anchor file
    Join {
        /// Anchor file
        anchor: PathBuf,
        /// Write the document here instead of printing it
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
        /// Directory holding the section files (defaults to the anchor's directory)
        #[arg(long, value_name = "DIR")]
        search_dir: Option<PathBuf>,
    },
    /// Report which references of an anchor resolve
    Inspect {
        /// Anchor file
        anchor: PathBuf,
        /// Directory holding the section files (defaults to the anchor's directory)
        #[arg(long, value_name = "DIR")]
        search_dir: Option<PathBuf>,
    },
    /// Section statistics for a document
    Stats {
        /// Document to analyse
        file: PathBuf,
        /// Include the full section index
        #[arg(long)]
        index: bool,
    },
    /// Locate the section with a given hash
    Find {
        /// Document to search
        file: PathBuf,
        /// Content hash
        hash: String,
    },
    /// Print an inclusive, 1-based line range
    Extract {
        /// Document to read
        file: PathBuf,
        /// First line
        start: usize,
        /// Last line
        end: usize,
    },
    /// List the anchor and section files in a directory
    List {
        /// Output directory of an earlier split
        dir: PathBuf,
        /// Stem of the anchor file, so a hex-looking name is not taken for a section
        #[arg(long, value_name = "STEM")]
        anchor: Option<String>,
    },
}

#[derive(Serialize)]
struct SplitReport<'a> {
    source: &'a Path,
    output_dir: &'a Path,
    processing_method: ProcessingMethod,
    cleaned: usize,
    summary: WriteSummary,
    files: &'a [WriteResult],
}

#[derive(Serialize)]
struct InspectReport {
    #[serde(flatten)]
    analysis: AnchorAnalysis,
    validation: ReferenceValidation,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut cfg = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Split {
            input,
            output,
            hash_length,
            overwrite,
            clean,
            shared_timestamp,
            no_references,
        } => {
            // Override config with command line args
            if let Some(length) = hash_length {
                cfg.hash_length = length;
            }
            cfg.overwrite |= overwrite;
            cfg.shared_timestamp |= shared_timestamp;
            cfg.references &= !no_references;
            split(&cfg, &input, output, clean)
        }
        Command::Join {
            anchor,
            output,
            search_dir,
        } => {
            let reconstructor = reconstructor(&cfg, search_dir);
            match output {
                Some(output) => {
                    let result = reconstructor.write_reconstruction(&anchor, &output)?;
                    print_json(&result)
                }
                None => {
                    let result = reconstructor.reconstruct_document(&anchor)?;
                    println!("{}", result.content);
                    Ok(())
                }
            }
        }
        Command::Inspect { anchor, search_dir } => {
            let reconstructor = reconstructor(&cfg, search_dir);
            print_json(&InspectReport {
                analysis: reconstructor.analyze_file(&anchor)?,
                validation: reconstructor.validate_references(&anchor)?,
            })
        }
        Command::Stats { file, index } => {
            let processor = Processor::new(&cfg)?;
            if index {
                print_json(&processor.analyze_file(&file)?)
            } else {
                print_json(&processor.get_file_stats(&file)?)
            }
        }
        Command::Find { file, hash } => {
            let processor = Processor::new(&cfg)?;
            match processor.find_section_by_hash(&file, &hash)? {
                Some(meta) => print_json(&meta),
                None => Err(Error::InvalidInput(format!(
                    "no section with hash {hash} in {}",
                    file.display()
                ))),
            }
        }
        Command::Extract { file, start, end } => {
            let text = Processor::new(&cfg)?.extract_section(&file, start, end)?;
            println!("{text}");
            Ok(())
        }
        Command::List { dir, anchor } => {
            let store = SectionStore::new(dir, cfg.extension());
            let store = match anchor {
                Some(stem) => store.with_anchor(stem),
                None => store,
            };
            print_json(&store.list()?)
        }
    }
}

fn split(cfg: &Config, input: &Path, output: Option<PathBuf>, clean: bool) -> Result<()> {
    let processor = Processor::new(cfg)?;
    let output_dir = match output {
        Some(dir) => dir,
        None => default_output_dir(input)?,
    };
    let options = WriteOptions::from_config(cfg, input, &output_dir)?;

    let processing_method = processor.method_for(input)?;
    let sections = processor.read_and_split(input)?;
    let cleaned = if clean {
        options.store().clean(&options.source_stem)?
    } else {
        0
    };
    let files = SectionWriter::new(*processor.hasher()).write_sections(&sections, &options)?;

    for file in &files {
        if let WriteStatus::Skipped { .. } = file.status {
            let conflict = Error::WriteConflict {
                path: file.path.clone(),
            };
            debug!("{conflict}");
        }
    }

    print_json(&SplitReport {
        source: input,
        output_dir: &output_dir,
        processing_method,
        cleaned,
        summary: WriteSummary::from_results(&files),
        files: &files,
    })
}

/// `<dir>/<stem>/` for an input `<dir>/<stem>.<ext>`, so the anchor never lands on the input.
fn default_output_dir(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("{} has no usable file name", input.display())))?;
    let parent = input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(parent.join(stem))
}

fn reconstructor(cfg: &Config, search_dir: Option<PathBuf>) -> DocumentReconstructor {
    let reconstructor = DocumentReconstructor::new(cfg.extension());
    match search_dir {
        Some(dir) => reconstructor.with_search_dir(dir),
        None => reconstructor,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::InvalidInput(format!("cannot serialise output: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
#[path = "tests/cli.rs"]
mod tests;
