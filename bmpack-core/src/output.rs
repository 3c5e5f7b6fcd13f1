//! In-memory output buffers with all-or-nothing commit

use crate::{PackerConfig, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The data blob and header text of one packing run
#[derive(Debug, Default)]
pub struct OutputPair {
    pub data: Vec<u8>,
    pub header: Vec<u8>,
}

/// Where a committed run ended up
#[derive(Debug, Clone)]
pub struct CommittedPaths {
    pub data: PathBuf,
    pub header: PathBuf,
}

impl OutputPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes both artifacts into `dir`.
    ///
    /// Each one goes to a `.tmp` sibling first. Existing outputs are moved to
    /// `.bak` siblings before the temporaries are renamed into place, and are
    /// put back if any rename fails, so either both files are replaced or
    /// neither is.
    pub fn commit(&self, dir: &Path, config: &PackerConfig) -> Result<CommittedPaths> {
        let data_path = dir.join(&config.data_file_name);
        let header_path = dir.join(&config.header_file_name);
        let targets = [data_path.as_path(), header_path.as_path()];

        for target in targets {
            if target.exists() && !target.is_file() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} exists and is not a regular file", target.display()),
                )
                .into());
            }
        }

        let data_tmp = sibling(&data_path, "tmp");
        let header_tmp = sibling(&header_path, "tmp");
        let temporaries = [data_tmp.as_path(), header_tmp.as_path()];

        let staged = write_synced(&data_tmp, &self.data)
            .and_then(|_| write_synced(&header_tmp, &self.header));
        if let Err(e) = staged {
            remove_all(&temporaries);
            return Err(e.into());
        }

        if let Err(e) = swap_into_place(&temporaries, &targets) {
            remove_all(&temporaries);
            return Err(e.into());
        }

        log::debug!(
            "Committed {} ({} bytes) and {} ({} bytes)",
            data_path.display(),
            self.data.len(),
            header_path.display(),
            self.header.len()
        );

        Ok(CommittedPaths {
            data: data_path,
            header: header_path,
        })
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn remove_all(paths: &[&Path]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

/// Renames each staged file over its target. Targets that already exist are
/// backed up first; on failure every placed file is removed and the backups
/// are restored.
fn swap_into_place(staged: &[&Path], targets: &[&Path]) -> io::Result<()> {
    let mut backups = Vec::new();
    let mut placed = Vec::new();

    match rename_all(staged, targets, &mut backups, &mut placed) {
        Ok(()) => {
            for (backup, _) in &backups {
                let _ = fs::remove_file(backup);
            }
            Ok(())
        }
        Err(e) => {
            remove_all(&placed);
            for (backup, target) in &backups {
                if let Err(restore) = fs::rename(backup, target) {
                    log::error!(
                        "Failed to restore {} from {}: {}",
                        target.display(),
                        backup.display(),
                        restore
                    );
                }
            }
            Err(e)
        }
    }
}

fn rename_all<'a>(
    staged: &[&Path],
    targets: &[&'a Path],
    backups: &mut Vec<(PathBuf, &'a Path)>,
    placed: &mut Vec<&'a Path>,
) -> io::Result<()> {
    for &target in targets {
        if target.exists() {
            let backup = sibling(target, "bak");
            fs::rename(target, &backup)?;
            backups.push((backup, target));
        }
    }
    for (from, &to) in staged.iter().zip(targets) {
        fs::rename(from, to)?;
        placed.push(to);
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bmpack-output-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_commit_writes_both_files() {
        let dir = scratch_dir("commit");
        let config = PackerConfig::default();
        let outputs = OutputPair {
            data: vec![1, 2, 3],
            header: b"#define a_OFFSET 0\n".to_vec(),
        };

        let paths = outputs.commit(&dir, &config).unwrap();

        assert_eq!(fs::read(&paths.data).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(&paths.header).unwrap(), b"#define a_OFFSET 0\n");
        assert!(!dir.join("pictureFiles.txt.tmp").exists());
        assert!(!dir.join("pictureFilesHeader.h.tmp").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_commit_replaces_previous_run() {
        let dir = scratch_dir("replace");
        let config = PackerConfig::default();
        fs::write(dir.join(&config.data_file_name), vec![0u8; 64]).unwrap();

        let outputs = OutputPair {
            data: vec![7],
            header: Vec::new(),
        };
        outputs.commit(&dir, &config).unwrap();

        assert_eq!(fs::read(dir.join(&config.data_file_name)).unwrap(), vec![7]);
        assert!(!dir.join("pictureFiles.txt.bak").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_commit_into_missing_dir_fails_cleanly() {
        let dir = std::env::temp_dir().join("bmpack-output-missing").join("deeper");
        let outputs = OutputPair::new();
        assert!(outputs.commit(&dir, &PackerConfig::default()).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn test_blocked_header_keeps_previous_outputs() {
        let dir = scratch_dir("blocked");
        let config = PackerConfig::default();
        fs::write(dir.join(&config.data_file_name), b"OLD").unwrap();
        fs::create_dir_all(dir.join(&config.header_file_name).join("x")).unwrap();

        let outputs = OutputPair {
            data: b"NEW".to_vec(),
            header: b"#define a_OFFSET 0\n".to_vec(),
        };
        assert!(outputs.commit(&dir, &config).is_err());

        assert_eq!(fs::read(dir.join(&config.data_file_name)).unwrap(), b"OLD");
        assert!(dir.join(&config.header_file_name).join("x").is_dir());
        for leftover in [
            "pictureFiles.txt.tmp",
            "pictureFilesHeader.h.tmp",
            "pictureFiles.txt.bak",
            "pictureFilesHeader.h.bak",
        ] {
            assert!(!dir.join(leftover).exists(), "{} left behind", leftover);
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_swap_restores_backups() {
        let dir = scratch_dir("restore");
        let data = dir.join("data.bin");
        let header = dir.join("header.h");
        fs::write(&data, b"OLD DATA").unwrap();
        fs::write(&header, b"OLD HEADER").unwrap();

        let data_tmp = sibling(&data, "tmp");
        fs::write(&data_tmp, b"NEW DATA").unwrap();
        // The header temporary was never staged, so its rename fails.
        let header_tmp = sibling(&header, "tmp");

        let err = swap_into_place(
            &[data_tmp.as_path(), header_tmp.as_path()],
            &[data.as_path(), header.as_path()],
        );
        assert!(err.is_err());

        assert_eq!(fs::read(&data).unwrap(), b"OLD DATA");
        assert_eq!(fs::read(&header).unwrap(), b"OLD HEADER");
        assert!(!sibling(&data, "bak").exists());
        assert!(!sibling(&header, "bak").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
