//! Boundary to the platform specific mount backends.
//!
//! A [`MountService`] advertises a [`CapabilitySet`] and hands out a fresh
//! [`MountBuilder`] per mount attempt. Builder setters that the service does
//! not advertise keep their default implementation, which rejects the call
//! with [`BuilderError::Unsupported`].

use std::path::Path;

use super::capability::{Capability, CapabilitySet};
use super::error::{BackendError, BuilderError};

/// A platform specific mount backend.
pub trait MountService: Send + Sync {
    /// Stable identity used in settings to prefer this service.
    fn id(&self) -> &str;

    /// Human readable name.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Capabilities of this service. Never changes during the process lifetime.
    fn capabilities(&self) -> &CapabilitySet;

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Flags used when the vault does not configure its own.
    fn default_mount_flags(&self) -> String {
        String::new()
    }

    /// Whether the service can be used on this machine.
    fn is_supported(&self) -> bool {
        true
    }

    /// Creates an empty builder that will expose `root` once mounted.
    fn for_file_system(&self, root: &Path) -> Box<dyn MountBuilder>;
}

/// Write-once accumulator of mount options, consumed by [`MountBuilder::mount`].
pub trait MountBuilder {
    fn set_file_system_name(&mut self, _name: &str) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("file system name"))
    }

    fn set_loopback_port(&mut self, _port: u16) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("loopback port"))
    }

    fn set_loopback_host_name(&mut self, _host_name: &str) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("loopback host name"))
    }

    fn set_read_only(&mut self, _read_only: bool) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("read-only mode"))
    }

    fn set_mount_flags(&mut self, _flags: &str) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("mount flags"))
    }

    fn set_volume_id(&mut self, _id: &str) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("volume id"))
    }

    fn set_volume_name(&mut self, _name: &str) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("volume name"))
    }

    /// Sets the mount point. Drive letters are passed as `X:\`.
    fn set_mount_point(&mut self, _mount_point: &Path) -> Result<(), BuilderError> {
        Err(BuilderError::Unsupported("mount point"))
    }

    /// Performs the OS-level mount.
    fn mount(self: Box<Self>) -> Result<Box<dyn Mount>, BackendError>;
}

/// A live mount.
pub trait Mount: Send {
    /// Location where the volume is visible, once known.
    fn mount_point(&self) -> Option<&Path>;

    /// Gracefully unmounts.
    fn unmount(&mut self) -> Result<(), BackendError>;

    /// Unmounts even if files are still open.
    fn unmount_forced(&mut self) -> Result<(), BackendError> {
        Err(BackendError::Unsupported("forced unmount"))
    }
}
