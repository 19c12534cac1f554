//! Error types for mount negotiation and mount point resolution.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::handle::Cleanup;

/// Rejection of a single builder call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// The backend does not implement this option.
    #[error("{0} is not supported by this mount service")]
    Unsupported(&'static str),

    /// The backend implements the option but refused the given value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failure reported by a backend while mounting or unmounting.
#[derive(Debug, Error)]
pub enum BackendError {
    /// I/O error from the operating system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The operation is not provided by this backend.
    #[error("{0} is not supported by this mount service")]
    Unsupported(&'static str),

    /// Any other backend failure.
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while selecting a mount service, preparing a mount point or mounting.
///
/// Every variant except [`MountError::MountFailed`] is raised before the
/// backend's terminal mount call, so no OS-level mount exists when it is seen.
#[derive(Debug, Error)]
pub enum MountError {
    /// A different problematic FUSE driver was already used in this process.
    #[error("mount service {requested} requires a restart: {first} is already in use")]
    DriverRestartRequired {
        /// Identity of the service that claimed the driver slot.
        first: String,
        /// Identity of the service that was requested now.
        requested: String,
    },

    /// No mount service is available.
    #[error("no mount service available")]
    NoMountService,

    /// The requested drive letter is occupied.
    #[error("mount point {} is already in use", .0.display())]
    MountPointInUse(PathBuf),

    /// The requested kind of mount point cannot be used with the selected service.
    #[error("mount point {} is not supported: {reason}", .path.display())]
    MountPointNotSupported {
        /// Requested mount point.
        path: PathBuf,
        /// Why the service cannot use it.
        reason: String,
    },

    /// The selected service only mounts onto existing directories.
    #[error("mount point {} does not exist", .0.display())]
    MountPointNotExisting(PathBuf),

    /// The service refused the mount point for any other reason.
    #[error("illegal mount point {}: {reason}", .path.display())]
    IllegalMountPoint {
        /// Requested mount point.
        path: PathBuf,
        /// Message reported by the service.
        reason: String,
    },

    /// All drive letters are taken.
    #[error("no drive letter available")]
    NoDriveLetterAvailable,

    /// The environment does not provide a base directory for mount points.
    #[error("no mount points directory configured")]
    MountPointsDirUnavailable,

    /// Preparing the parent of a mount point failed.
    #[error("failed to prepare mount point {}: {source}", .path.display())]
    MountPointPreparation {
        /// Mount point being prepared.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The service rejected an option it advertises.
    #[error("mount service rejected option: {0}")]
    InvalidOption(#[from] BuilderError),

    /// I/O error while provisioning directories.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal mount call failed.
    ///
    /// Carries the cleanup produced while preparing the mount point; the
    /// caller is responsible for running it.
    #[error("mount failed: {source}")]
    MountFailed {
        /// Backend failure.
        #[source]
        source: BackendError,
        /// Reverses any mount point preparation.
        cleanup: Cleanup,
    },
}

impl MountError {
    /// Returns the pending cleanup if this error still owns one.
    pub fn cleanup(&self) -> Option<&Cleanup> {
        match self {
            MountError::MountFailed { cleanup, .. } => Some(cleanup),
            _ => None,
        }
    }
}

/// Type alias for Results using MountError.
pub type Result<T> = std::result::Result<T, MountError>;
