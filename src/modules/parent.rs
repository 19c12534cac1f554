//! Preparation of mount points for services that create the mount point
//! themselves inside an existing parent directory.
//!
//! Such services need the mount point to be absent while its parent exists.
//! A user chosen mount point that exists as an empty directory is moved to a
//! hidden sibling (the hideaway) before mounting and moved back afterwards.

use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use super::constants::{
    HIDEAWAY_PREFIX, HIDEAWAY_SUFFIX, MOUNT_POINT_CLEAR_ATTEMPTS, MOUNT_POINT_POLL_INTERVAL,
    MOUNT_POINT_RESTORE_ATTEMPTS,
};
use super::error::{MountError, Result};

/// Hidden sibling used to park an existing mount point directory: `.~$<name>.tmp`.
pub fn hideaway_path(mount_point: &Path) -> Option<PathBuf> {
    let name = mount_point.file_name()?.to_string_lossy();
    Some(mount_point.with_file_name(format!("{HIDEAWAY_PREFIX}{name}{HIDEAWAY_SUFFIX}")))
}

/// Makes sure `mount_point` does not exist while its parent does.
///
/// | mount point     | hideaway | result                                   |
/// |-----------------|----------|------------------------------------------|
/// | empty directory | absent   | mount point moved to the hideaway        |
/// | absent          | present  | stale hideaway kept, restored on cleanup |
/// | present         | present  | error                                    |
/// | absent          | absent   | error                                    |
///
/// A mount point that is a file or a non-empty directory is an error.
///
/// # Errors
///
/// Returns [`MountError::MountPointPreparation`] in the error cases above or
/// if moving the directory fails.
pub fn prepare_parent_no_mount_point(mount_point: &Path) -> Result<()> {
    let fail = |source: io::Error| MountError::MountPointPreparation {
        path: mount_point.to_path_buf(),
        source,
    };

    let has_parent = mount_point
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    let hideaway = match hideaway_path(mount_point) {
        Some(hideaway) if has_parent => hideaway,
        _ => {
            return Err(fail(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mount point has no parent directory",
            )))
        }
    };

    let mp_exists = exists_no_follow(mount_point);
    let hide_exists = exists_no_follow(&hideaway);

    match (mp_exists, hide_exists) {
        (true, true) => Err(fail(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", hideaway.display()),
        ))),
        (false, false) => Err(fail(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", mount_point.display()),
        ))),
        (false, true) => {
            check_is_directory(&hideaway).map_err(fail)?;
            info!(
                "Mount point {:?} was not properly cleaned up, it will be restored on unmount",
                mount_point
            );
            Ok(())
        }
        (true, false) => {
            check_is_directory(mount_point).map_err(fail)?;
            check_is_empty(mount_point).map_err(fail)?;
            fs::rename(mount_point, &hideaway).map_err(fail)?;
            debug!("Moved {:?} to {:?}", mount_point, hideaway);
            wait_until_absent(mount_point, MOUNT_POINT_CLEAR_ATTEMPTS).map_err(fail)
        }
    }
}

/// Moves the hideaway back to `mount_point` once the mount point is gone.
///
/// Does nothing if there is no hideaway, so calling it twice is harmless.
/// Failures are logged, not returned.
pub fn cleanup(mount_point: &Path) {
    let Some(hideaway) = hideaway_path(mount_point) else {
        return;
    };
    if !exists_no_follow(&hideaway) {
        debug!("No hideaway for {:?}, nothing to restore", mount_point);
        return;
    }
    if let Err(e) = wait_until_absent(mount_point, MOUNT_POINT_RESTORE_ATTEMPTS) {
        error!("Unable to restore mount point {:?}: {}", mount_point, e);
        return;
    }
    match fs::rename(&hideaway, mount_point) {
        Ok(()) => debug!("Restored {:?} from {:?}", mount_point, hideaway),
        Err(e) => error!(
            "Unable to restore hidden directory to mount point {:?}: {}",
            mount_point, e
        ),
    }
}

fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn check_is_directory(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} is not a directory", path.display()),
        ))
    }
}

fn check_is_empty(path: &Path) -> io::Result<()> {
    if fs::read_dir(path)?.next().is_none() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} is not empty", path.display()),
        ))
    }
}

fn wait_until_absent(path: &Path, attempts: u32) -> io::Result<()> {
    for attempt in 0..attempts {
        if !exists_no_follow(path) {
            return Ok(());
        }
        if attempt > 0 {
            warn!("Waiting for {:?} to disappear", path);
        }
        thread::sleep(MOUNT_POINT_POLL_INTERVAL);
    }
    if exists_no_follow(path) {
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} could not be cleared", path.display()),
        ))
    } else {
        Ok(())
    }
}
