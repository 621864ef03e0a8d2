// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Destination folders and file moves

use fs_extra::error::ErrorKind as FsExtraKind;
use fs_extra::file::{move_file, CopyOptions};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{DirsortError, Result};

/// Create a directory and its parents; an existing directory is fine
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| DirsortError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Created folder {:?}", path);
    Ok(())
}

/// Move a file into `dest_dir`, keeping its name
///
/// Fails without touching the source if the destination already holds a
/// file of that name. Across filesystems `move_file` copies then deletes;
/// if that fails, any partial copy is removed again.
pub fn move_into(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| DirsortError::Move {
        from: source.to_path_buf(),
        to: dest_dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
    })?;
    let target = dest_dir.join(file_name);

    if target.symlink_metadata().is_ok() {
        return Err(DirsortError::Move {
            from: source.to_path_buf(),
            to: target,
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination path already exists",
            ),
        });
    }

    let options = CopyOptions::new();
    if let Err(e) = move_file(source, &target, &options) {
        let err = discard_partial_copy(source, &target, into_io_error(e));
        return Err(DirsortError::Move {
            from: source.to_path_buf(),
            to: target,
            source: err,
        });
    }

    info!("File moved from {:?} to {:?}", source, target);
    Ok(target)
}

/// Remove what a failed move left at `target` while the source survives
///
/// The target did not exist before the move, so anything there now is a
/// partial or duplicate copy. A failed removal is folded into the error.
fn discard_partial_copy(source: &Path, target: &Path, err: io::Error) -> io::Error {
    if !source.exists() || target.symlink_metadata().is_err() {
        return err;
    }
    match fs::remove_file(target) {
        Ok(()) => {
            debug!("Removed partial copy {:?}", target);
            err
        }
        Err(cleanup) => {
            warn!("Leftover copy {:?} could not be removed: {}", target, cleanup);
            io::Error::new(
                err.kind(),
                format!("{}; leftover copy {:?} could not be removed: {}", err, target, cleanup),
            )
        }
    }
}

fn into_io_error(err: fs_extra::error::Error) -> io::Error {
    let message = err.to_string();
    let kind = match err.kind {
        FsExtraKind::Io(e) => return e,
        FsExtraKind::NotFound => io::ErrorKind::NotFound,
        FsExtraKind::PermissionDenied => io::ErrorKind::PermissionDenied,
        FsExtraKind::AlreadyExists => io::ErrorKind::AlreadyExists,
        FsExtraKind::Interrupted => io::ErrorKind::Interrupted,
        FsExtraKind::InvalidFile | FsExtraKind::InvalidFileName | FsExtraKind::InvalidPath => {
            io::ErrorKind::InvalidInput
        }
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, message)
}
