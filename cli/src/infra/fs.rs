//! Filesystem infrastructure: implements the `FileStager` port.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::FileStager;

/// Stages generated files in a local directory (e.g. `/bootflash`) that the
/// privileged `cp` can read from.
pub struct StagingDir {
    dir: PathBuf,
}

impl StagingDir {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileStager for StagingDir {
    fn stage(&self, name: &str, contents: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating staging directory {}", self.dir.display()))?;
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{name}."))
            .tempfile_in(&self.dir)
            .with_context(|| format!("creating staged {name} in {}", self.dir.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("writing staged {name}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644))
                .with_context(|| format!("setting permissions on staged {name}"))?;
        }

        let (_, path) = file
            .keep()
            .with_context(|| format!("keeping staged {name}"))?;
        Ok(path)
    }

    fn discard(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }
}
