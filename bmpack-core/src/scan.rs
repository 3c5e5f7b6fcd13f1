//! Input enumeration

use crate::{FileOrder, PackerConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps the paths carrying the recognized extension, in the order given
pub fn filter_bitmaps<I, P>(paths: I, config: &PackerConfig) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .filter(|p| config.accepts(p))
        .collect()
}

/// Lists the bitmap files directly inside `dir` in the configured order.
///
/// Subdirectories are not descended into. Non-bitmap files are left out
/// silently.
pub fn collect_bitmaps(dir: &Path, config: &PackerConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        // Follows symlinks; dangling links are left out.
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if config.file_order == FileOrder::ReverseListing {
        files.reverse();
    }

    let bitmaps = filter_bitmaps(files, config);
    log::debug!("Found {} bitmap(s) in {}", bitmaps.len(), dir.display());
    Ok(bitmaps)
}
