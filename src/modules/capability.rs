//! Capabilities a mount service may advertise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A feature a mount service may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// The builder accepts a filesystem name.
    FileSystemName,
    /// The builder accepts a loopback port.
    LoopbackPort,
    /// The builder accepts a loopback host name.
    LoopbackHostName,
    /// The builder can mount read-only.
    ReadOnly,
    /// The builder accepts backend specific mount flags.
    MountFlags,
    /// The builder accepts a stable volume id.
    VolumeId,
    /// The builder accepts a volume display name.
    VolumeName,
    /// The service mounts to a drive letter such as `X:\`.
    MountAsDriveLetter,
    /// The service mounts onto an existing directory.
    MountToExistingDir,
    /// The service chooses the mount point itself.
    MountToSystemChosenPath,
    /// The service creates the mount point inside an existing parent directory.
    MountWithinExistingParent,
    /// Mounts can be force-unmounted.
    UnmountForced,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 12] = [
        Capability::FileSystemName,
        Capability::LoopbackPort,
        Capability::LoopbackHostName,
        Capability::ReadOnly,
        Capability::MountFlags,
        Capability::VolumeId,
        Capability::VolumeName,
        Capability::MountAsDriveLetter,
        Capability::MountToExistingDir,
        Capability::MountToSystemChosenPath,
        Capability::MountWithinExistingParent,
        Capability::UnmountForced,
    ];

    /// Stable upper-case name, as used in settings files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::FileSystemName => "FILE_SYSTEM_NAME",
            Capability::LoopbackPort => "LOOPBACK_PORT",
            Capability::LoopbackHostName => "LOOPBACK_HOST_NAME",
            Capability::ReadOnly => "READ_ONLY",
            Capability::MountFlags => "MOUNT_FLAGS",
            Capability::VolumeId => "VOLUME_ID",
            Capability::VolumeName => "VOLUME_NAME",
            Capability::MountAsDriveLetter => "MOUNT_AS_DRIVE_LETTER",
            Capability::MountToExistingDir => "MOUNT_TO_EXISTING_DIR",
            Capability::MountToSystemChosenPath => "MOUNT_TO_SYSTEM_CHOSEN_PATH",
            Capability::MountWithinExistingParent => "MOUNT_WITHIN_EXISTING_PARENT",
            Capability::UnmountForced => "UNMOUNT_FORCED",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable set of capabilities advertised by a mount service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Creates a set from a list of capabilities.
    pub fn new(capabilities: &[Capability]) -> Self {
        Self(capabilities.iter().copied().collect())
    }

    /// Returns true if `capability` is in the set.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Iterates over the set in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Number of capabilities in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}
