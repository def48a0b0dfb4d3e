//! Plugin archive unpacking
//!
//! Plugin archives are gzip-compressed tars containing exactly one regular
//! file: the plugin binary. The entry's name is ignored; its bytes are
//! installed at the destination with mode `0755`. The bytes are staged in a
//! sibling temporary file and renamed into place on success so a failed
//! unpack never leaves a valid-looking stub at the install path.

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Unpack a single-file tgz archive to the destination path
pub fn unpack_single_file_tgz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open {} for reading", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut entries = tar
        .entries()
        .with_context(|| format!("failed to read archive {}", archive.display()))?;

    let mut entry = match entries.next() {
        None => bail!("archive {} contains no files", archive.display()),
        Some(entry) => {
            entry.with_context(|| format!("failed to read archive {}", archive.display()))?
        }
    };
    if !entry.header().entry_type().is_file() {
        bail!(
            "archive {} entry \"{}\" is not a regular file",
            archive.display(),
            entry_name(&entry)
        );
    }

    let staging = staging_path(dest)?;
    let unpack = (|| -> Result<()> {
        let mut out = File::create(&staging)
            .with_context(|| format!("failed to create file {}", staging.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract archive {}", archive.display()))?;

        match entries.next() {
            None => {}
            Some(Ok(_)) => bail!(
                "archive {} contains more than one file",
                archive.display()
            ),
            Some(Err(err)) => {
                return Err(err)
                    .with_context(|| format!("failed to read archive {}", archive.display()))
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staging, fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    })();

    match unpack {
        Ok(()) => {
            fs::rename(&staging, dest)
                .with_context(|| format!("failed to move plugin into {}", dest.display()))?;
            debug!("unpacked {} to {}", archive.display(), dest.display());
            Ok(())
        }
        Err(err) => {
            let _ = fs::remove_file(&staging);
            Err(err)
        }
    }
}

fn staging_path(dest: &Path) -> Result<PathBuf> {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid destination path {}", dest.display()))?;
    Ok(dest.with_file_name(format!("{}.tmp", name)))
}

fn entry_name<R: io::Read>(entry: &tar::Entry<'_, R>) -> String {
    entry
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "<unreadable>".to_string())
}
