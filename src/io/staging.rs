//! All-or-nothing file output.
//!
//! A training run produces several files (`model.json`, `VERSION`, optionally
//! the dataset CSV). Each is first written to a `.tmp` sibling of its
//! destination. [`StagedFiles::commit`] then moves every staged file into
//! place, restoring the previous contents of all destinations if any move
//! fails. Staged files that are never committed are removed on drop.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ArtifactError;

const TMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug)]
struct Entry {
    dest: PathBuf,
    tmp: PathBuf,
}

/// A batch of written-but-uncommitted files.
#[derive(Debug, Default)]
pub struct StagedFiles {
    entries: Vec<Entry>,
}

impl StagedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the contents for `dest` into its `.tmp` sibling.
    pub fn stage<F>(&mut self, dest: &Path, write: F) -> Result<(), ArtifactError>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<(), ArtifactError>,
    {
        let tmp = sibling(dest, TMP_SUFFIX);
        let file = File::create(&tmp).map_err(|source| ArtifactError::Write {
            path: tmp.clone(),
            source,
        })?;
        self.entries.push(Entry {
            dest: dest.to_path_buf(),
            tmp: tmp.clone(),
        });

        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(|source| ArtifactError::Write { path: tmp, source })
    }

    /// Move every staged file into place.
    ///
    /// On error each destination holds exactly what it held before the call.
    pub fn commit(mut self) -> Result<(), ArtifactError> {
        let entries = std::mem::take(&mut self.entries);

        let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
        for e in &entries {
            let bak = sibling(&e.dest, BACKUP_SUFFIX);
            match fs::rename(&e.dest, &bak) {
                Ok(()) => backups.push((e.dest.clone(), bak)),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    restore(&[], &backups);
                    discard_all(&entries);
                    return Err(ArtifactError::Write {
                        path: e.dest.clone(),
                        source,
                    });
                }
            }
        }

        let mut placed: Vec<PathBuf> = Vec::new();
        for e in &entries {
            if let Err(source) = fs::rename(&e.tmp, &e.dest) {
                restore(&placed, &backups);
                discard_all(&entries);
                return Err(ArtifactError::Write {
                    path: e.dest.clone(),
                    source,
                });
            }
            placed.push(e.dest.clone());
        }

        for (_, bak) in &backups {
            let _ = fs::remove_file(bak);
        }
        Ok(())
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        discard_all(&self.entries);
    }
}

/// Remove newly placed files and move backups back over their destinations.
fn restore(placed: &[PathBuf], backups: &[(PathBuf, PathBuf)]) {
    for dest in placed {
        let _ = fs::remove_file(dest);
    }
    for (dest, bak) in backups {
        if let Err(e) = fs::rename(bak, dest) {
            warn!(path = %dest.display(), error = %e, "failed to restore previous file");
        }
    }
}

fn discard_all(entries: &[Entry]) {
    for e in entries {
        let _ = fs::remove_file(&e.tmp);
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}
