//! Batch packing of bitmaps into a data blob and symbol header

use crate::progress_tracker::ProgressTracker;
use crate::{normalizer, Error, Result};
use bmpack_core::asset::{symbol_name, PackedAsset};
use bmpack_core::header::read_header_fields;
use bmpack_core::output::CommittedPaths;
use bmpack_core::{scan, swap, FailurePolicy, OutputPair, PackerConfig, Summary, SymbolTable};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const PROGRESS_INTERVAL: u64 = 10;

/// One asset as it was placed in the data blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    pub source: PathBuf,
    pub width: u8,
    pub height: u8,
    pub offset: u64,
    pub payload_len: usize,
}

/// A file left out under [`FailurePolicy::Skip`]
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// What a packing run produced
#[derive(Debug, Clone)]
pub struct PackReport {
    pub assets: Vec<AssetRecord>,
    pub skipped: Vec<SkippedFile>,
    pub summary: Summary,
}

/// Rendered outputs plus the report, not yet written to disk
#[derive(Debug)]
pub struct PackOutcome {
    pub outputs: OutputPair,
    pub report: PackReport,
}

/// Drives the per-file transcode and writes both artifacts
pub struct AssetPacker {
    config: PackerConfig,
}

impl AssetPacker {
    /// Creates a new packer with the given configuration
    pub fn new(config: PackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Scans `input_dir`, packs every bitmap in it and commits both outputs
    /// into `output_dir`. Nothing is written unless the whole run succeeds.
    pub fn pack_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<(PackReport, CommittedPaths)> {
        let files = scan::collect_bitmaps(input_dir, &self.config)?;
        let outcome = self.pack_files(&files)?;
        let paths = outcome.outputs.commit(output_dir, &self.config)?;
        Ok((outcome.report, paths))
    }

    /// Packs `paths` in the order given into in-memory outputs
    pub fn pack_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<PackOutcome> {
        let mut outputs = OutputPair::new();
        let report = self.pack_into(paths, &mut outputs.data, &mut outputs.header)?;
        Ok(PackOutcome { outputs, report })
    }

    /// Packs `paths` in the order given, streaming assets to `data` and the
    /// symbol header to `header`.
    ///
    /// Paths without the recognized extension are ignored. On error the
    /// writers may hold a partial run.
    pub fn pack_into<P, D, H>(&self, paths: &[P], data: &mut D, header: &mut H) -> Result<PackReport>
    where
        P: AsRef<Path>,
        D: Write,
        H: Write,
    {
        let files = scan::filter_bitmaps(paths, &self.config);
        log::info!("Packing {} bitmap(s)", files.len());

        let mut table = SymbolTable::new();
        let mut assets = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();
        let mut progress = ProgressTracker::new(files.len() as u64, "Packed");

        for path in &files {
            let asset = match self.transcode_file(path) {
                Ok(asset) => asset,
                Err(e) if self.config.failure_policy == FailurePolicy::Skip && e.is_skippable() => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    progress.increment_and_report(PROGRESS_INTERVAL);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let offset = table.push(&asset.name, asset.packed_len() as u64)?;
            asset.write(data)?;

            log::debug!(
                "{} -> {} ({}x{}, {} bytes at offset {})",
                path.display(),
                asset.name,
                asset.width,
                asset.height,
                asset.payload_len(),
                offset
            );

            assets.push(AssetRecord {
                name: asset.name.clone(),
                source: path.clone(),
                width: asset.width,
                height: asset.height,
                offset,
                payload_len: asset.payload_len(),
            });
            progress.increment_and_report(PROGRESS_INTERVAL);
        }

        let summary = Summary::compute(
            table.total_used(),
            self.config.budget,
            self.config.transfer_rate_baud,
        );
        if summary.over_budget() {
            log::warn!(
                "Packed data ({} bytes) exceeds capacity ({} bytes)",
                summary.total_used,
                self.config.budget.capacity_bytes
            );
        }
        table.write_header(header, &summary)?;

        log::info!(
            "Packed {} asset(s), {} bytes used, {}% of capacity",
            assets.len(),
            summary.total_used,
            summary.percent_used
        );

        Ok(PackReport {
            assets,
            skipped,
            summary,
        })
    }

    /// Reads, decodes and transcodes a single bitmap file
    pub fn transcode_file(&self, path: &Path) -> Result<PackedAsset> {
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = normalizer::decode_bitmap(&bytes).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let name = symbol_name(path)?;
        let normalized = normalizer::normalize(&image)?;

        transcode_normalized(name, normalized).map_err(|e| match e {
            Error::Core(source @ bmpack_core::Error::MalformedInput { .. }) => Error::Malformed {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }
}

/// Turns a normalized bitmap container into a packed asset: reads the
/// header fields, byte-swaps the pixel region and keeps it as the payload.
pub fn transcode_normalized(name: String, normalized: Vec<u8>) -> Result<PackedAsset> {
    let fields = read_header_fields(&normalized)?;
    if fields.dimensions_truncated() {
        log::warn!(
            "{} is {}x{}; dimensions are truncated to one byte each",
            name,
            fields.width,
            fields.height
        );
    }

    let start = fields.data_start();
    let mut payload = swap::swap_payload(normalized, start)?;
    payload.drain(..start);

    Ok(PackedAsset::new(
        name,
        fields.width_byte(),
        fields.height_byte(),
        payload,
    ))
}
