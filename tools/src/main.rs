use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitstream::CompressionModel;
use clap::{Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, GhostCollection};
use ghostline_tools::{format_model, format_pretty, inspect_packet, load_collection, model_rows};
use glob::Pattern;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ghostline-tools",
    version,
    about = "ghostline packet inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode packet headers and ghost records.
    Inspect {
        /// Path to the packet bytes, or a directory of packets.
        packet_path: PathBuf,
        /// Ghost collection JSON describing the packet contents.
        #[arg(long)]
        collection: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Print the hash of a ghost collection.
    Hash {
        /// Ghost collection JSON.
        collection: PathBuf,
    },
    /// Print the compression model bucket table.
    Model {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let model = CompressionModel::default();
    match cli.command {
        Command::Inspect {
            packet_path,
            collection,
            glob,
            sort,
            limit,
            format,
        } => {
            let def = read_collection(&collection)?;
            let limits = CodecLimits::unlimited();
            let collection =
                GhostCollection::with_limits(&def, &limits).context("build ghost collection")?;
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    if let Err(err) =
                        inspect_file(&entry.path, &collection, &model, &limits, format)
                    {
                        warn!(path = %entry.path.display(), "{err:#}");
                    }
                }
            } else {
                inspect_file(&packet_path, &collection, &model, &limits, format)?;
            }
        }
        Command::Hash { collection } => {
            let def = read_collection(&collection)?;
            println!("0x{:016x}", schema::collection_hash(&def));
        }
        Command::Model { format } => {
            let rows = model_rows(&model);
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&rows).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => print!("{}", format_model(&rows)),
            }
        }
    }
    Ok(())
}

fn read_collection(path: &Path) -> Result<schema::GhostCollectionDef> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read collection {}", path.display()))?;
    let def = load_collection(&contents)?;
    debug!(ghost_types = def.len(), "loaded ghost collection");
    Ok(def)
}

fn inspect_file(
    path: &Path,
    collection: &GhostCollection,
    model: &CompressionModel,
    limits: &CodecLimits,
    format: OutputFormat,
) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read packet {}", path.display()))?;
    let report = inspect_packet(&bytes, collection, model, limits)
        .with_context(|| format!("decode packet {}", path.display()))?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_pretty(&report)),
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}
