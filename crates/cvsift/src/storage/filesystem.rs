use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Flat-folder attachment store. Files are only ever created, never
/// overwritten or deleted.
pub struct FileStorage {
    output_directory: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Saves `content` under `filename`, creating the folder on first use.
    /// Name collisions resolve by inserting `_<n>` (n = 1, 2, 3, ...) before
    /// the extension until a free name is found; the existing file keeps its
    /// name.
    pub fn save_unique(&self, filename: &str, content: &[u8]) -> Result<PathBuf, StorageError> {
        self.ensure_directory()?;

        let (base, ext) = split_extension(filename);

        // Atomic check-and-create (O_CREAT | O_EXCL) so two concurrent saves
        // can never claim the same name.
        for counter in 0..=1000u32 {
            let candidate = if counter == 0 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let path = self.output_directory.join(&candidate);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: path.clone(),
                            source: e,
                        })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::WriteFile { path, source: e });
                }
            }
        }

        Err(StorageError::FileExists(
            self.output_directory.join(filename),
        ))
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                StorageError::CreateDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }
}

/// Splits `resume.pdf` into `("resume", Some(".pdf"))`; names without a dot
/// split into `(name, None)`.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(dot_pos) => (&filename[..dot_pos], Some(&filename[dot_pos..])),
        None => (filename, None),
    }
}
