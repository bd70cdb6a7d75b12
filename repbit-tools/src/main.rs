use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use demo_types::demo_registry;
use repbit_tools::{decode_record_json, format_id_table, id_table, parse_hex};

#[derive(Parser)]
#[command(
    name = "repbit-tools",
    version,
    about = "repbit record inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the type-id assignment table.
    Ids {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Decode a full-form record payload.
    Decode {
        /// Record type name, as listed by `ids`.
        record: String,
        /// Payload as hex digits; omit to read raw bytes from a file.
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,
        /// Path to a file holding the raw payload bytes.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = demo_registry().context("build demo registry")?;

    match cli.command {
        Command::Ids { format } => {
            let rows = id_table(&registry);
            match format {
                OutputFormat::Table => print!("{}", format_id_table(&rows)),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&rows).context("serialize json")?;
                    println!("{json}");
                }
            }
        }
        Command::Decode { record, hex, file } => {
            let bytes = match (hex, file) {
                (Some(hex), None) => parse_hex(&hex).context("parse hex payload")?,
                (None, Some(path)) => fs::read(&path)
                    .with_context(|| format!("read payload {}", path.display()))?,
                _ => anyhow::bail!("provide exactly one of --hex or --file"),
            };
            let json = decode_record_json(&registry, &record, &bytes)?;
            let pretty = serde_json::to_string_pretty(&json).context("serialize json")?;
            println!("{pretty}");
        }
    }
    Ok(())
}
