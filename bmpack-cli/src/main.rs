//! bmpack CLI Tool
//!
//! Command-line interface for packing a directory of bitmaps into a firmware
//! asset blob and its offset header.

use anyhow::{Context, Result};
use bmpack_core::asset::symbol_name;
use bmpack_core::{scan, FailurePolicy, FileOrder, MemoryBudget, PackerConfig};
use bmpack_encoder::{AssetPacker, PackReport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmpack")]
#[command(about = "Pack bitmaps into an RGB565 asset blob with a C offset header")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack every bitmap in a directory
    Pack {
        /// Directory holding the bitmap files
        input: PathBuf,

        /// Directory for the data blob and header (defaults to the input directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Skip files that fail to decode instead of aborting
        #[arg(long)]
        skip_invalid: bool,

        /// Storage capacity in bytes
        #[arg(long)]
        capacity: Option<u64>,

        /// Transfer rate used for the load time estimate
        #[arg(long)]
        baud: Option<u32>,

        /// File name of the data blob
        #[arg(long)]
        data_name: Option<String>,

        /// File name of the generated header
        #[arg(long)]
        header_name: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the bitmaps that would be packed, in order
    Scan {
        /// Directory holding the bitmap files
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Process files in reverse name order
    #[arg(long)]
    reverse: bool,
}

impl CommonArgs {
    fn load_config(&self) -> Result<PackerConfig> {
        let mut config = match &self.config {
            Some(path) => PackerConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PackerConfig::default(),
        };
        if self.reverse {
            config.file_order = FileOrder::ReverseListing;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pack {
            input,
            out_dir,
            skip_invalid,
            capacity,
            baud,
            data_name,
            header_name,
            common,
        } => {
            let mut config = common.load_config()?;
            if skip_invalid {
                config.failure_policy = FailurePolicy::Skip;
            }
            if let Some(capacity) = capacity {
                config.budget = MemoryBudget::new(capacity);
            }
            if let Some(baud) = baud {
                config.transfer_rate_baud = baud;
            }
            if let Some(name) = data_name {
                config.data_file_name = name;
            }
            if let Some(name) = header_name {
                config.header_file_name = name;
            }
            let out_dir = out_dir.unwrap_or_else(|| input.clone());
            pack_directory(input, out_dir, config)?
        }

        Commands::Scan { input, common } => scan_directory(input, common.load_config()?)?,
    }

    Ok(())
}

fn pack_directory(input: PathBuf, out_dir: PathBuf, config: PackerConfig) -> Result<()> {
    println!("Packing bitmaps in: {}", input.display());

    let packer = AssetPacker::new(config).context("Invalid packer configuration")?;
    let (report, paths) = packer
        .pack_directory(&input, &out_dir)
        .context("Failed to pack bitmaps")?;

    print_report(&report);

    println!("Wrote {}", paths.data.display());
    println!("Wrote {}", paths.header.display());
    Ok(())
}

fn scan_directory(input: PathBuf, config: PackerConfig) -> Result<()> {
    config.validate().context("Invalid packer configuration")?;
    let files = scan::collect_bitmaps(&input, &config)
        .with_context(|| format!("Failed to list {}", input.display()))?;

    if files.is_empty() {
        println!("No .{} files in {}", config.extension, input.display());
        return Ok(());
    }

    for (i, file) in files.iter().enumerate() {
        let name = symbol_name(file)
            .with_context(|| format!("No symbol name for {}", file.display()))?;
        println!("  [{}] {} -> {}_OFFSET", i, file.display(), name);
    }
    Ok(())
}

fn print_report(report: &PackReport) {
    println!("\n=== Assets ===");
    for asset in &report.assets {
        println!(
            "  {:<24} {:>3}x{:<3} offset {:>8}, {} bytes",
            asset.name, asset.width, asset.height, asset.offset, asset.payload_len
        );
    }

    if !report.skipped.is_empty() {
        println!("\n=== Skipped ===");
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    let summary = &report.summary;
    println!("\n=== Memory ===");
    println!("Used: {} bytes ({}%)", summary.total_used, summary.percent_used);
    println!("Available: {} bytes", summary.total_available);
    println!(
        "Load time at {} baud: {} seconds",
        summary.transfer_rate_baud, summary.transfer_seconds
    );
}
