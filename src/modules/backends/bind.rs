//! Bind mount of the vault root onto an existing directory.

use log::{info, warn};
use nix::mount::{mount, umount2, MntFlags, MsFlags};
use nix::unistd::geteuid;
use std::io;
use std::path::{Path, PathBuf};

use crate::modules::capability::{Capability, CapabilitySet};
use crate::modules::error::{BackendError, BuilderError};
use crate::modules::service::{Mount, MountBuilder, MountService};

pub const BIND_SERVICE_ID: &str = "bind";

const DEFAULT_FLAGS: &str = "nosuid,nodev";

pub struct BindMountService {
    capabilities: CapabilitySet,
}

impl BindMountService {
    pub fn new() -> Self {
        Self {
            capabilities: CapabilitySet::new(&[
                Capability::ReadOnly,
                Capability::MountFlags,
                Capability::MountToExistingDir,
                Capability::UnmountForced,
            ]),
        }
    }
}

impl Default for BindMountService {
    fn default() -> Self {
        Self::new()
    }
}

impl MountService for BindMountService {
    fn id(&self) -> &str {
        BIND_SERVICE_ID
    }

    fn display_name(&self) -> &str {
        "Bind mount"
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn default_mount_flags(&self) -> String {
        DEFAULT_FLAGS.to_string()
    }

    fn is_supported(&self) -> bool {
        geteuid().is_root()
    }

    fn for_file_system(&self, root: &Path) -> Box<dyn MountBuilder> {
        Box::new(BindMountBuilder {
            root: root.to_path_buf(),
            mount_point: None,
            read_only: false,
            flags: MsFlags::empty(),
        })
    }
}

/// Parses comma or space separated flags such as `nosuid,nodev,noexec`.
pub fn parse_mount_flags(flags: &str) -> Result<MsFlags, BuilderError> {
    flags
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|flag| !flag.is_empty())
        .try_fold(MsFlags::empty(), |acc, flag| {
            let parsed = match flag {
                "ro" => MsFlags::MS_RDONLY,
                "nosuid" => MsFlags::MS_NOSUID,
                "nodev" => MsFlags::MS_NODEV,
                "noexec" => MsFlags::MS_NOEXEC,
                "noatime" => MsFlags::MS_NOATIME,
                "nodiratime" => MsFlags::MS_NODIRATIME,
                "relatime" => MsFlags::MS_RELATIME,
                other => {
                    return Err(BuilderError::InvalidArgument(format!(
                        "unknown mount flag {:?}",
                        other
                    )))
                }
            };
            Ok(acc | parsed)
        })
}

struct BindMountBuilder {
    root: PathBuf,
    mount_point: Option<PathBuf>,
    read_only: bool,
    flags: MsFlags,
}

impl MountBuilder for BindMountBuilder {
    fn set_read_only(&mut self, read_only: bool) -> Result<(), BuilderError> {
        self.read_only = read_only;
        Ok(())
    }

    fn set_mount_flags(&mut self, flags: &str) -> Result<(), BuilderError> {
        self.flags = parse_mount_flags(flags)?;
        Ok(())
    }

    fn set_mount_point(&mut self, mount_point: &Path) -> Result<(), BuilderError> {
        if !mount_point.is_dir() {
            return Err(BuilderError::InvalidArgument(format!(
                "{} is not an existing directory",
                mount_point.display()
            )));
        }
        self.mount_point = Some(mount_point.to_path_buf());
        Ok(())
    }

    fn mount(self: Box<Self>) -> Result<Box<dyn Mount>, BackendError> {
        let mount_point = self
            .mount_point
            .ok_or(BackendError::Failed("no mount point set".to_string()))?;

        mount(
            Some(self.root.as_path()),
            &mount_point,
            None::<&str>,
            MsFlags::MS_BIND,
            None::<&str>,
        )
        .map_err(io::Error::from)?;

        // bind mounts ignore flags on creation, they only apply on remount
        let mut remount_flags = self.flags;
        if self.read_only {
            remount_flags |= MsFlags::MS_RDONLY;
        }
        if !remount_flags.is_empty() {
            let remounted = mount(
                None::<&str>,
                &mount_point,
                None::<&str>,
                MsFlags::MS_BIND | MsFlags::MS_REMOUNT | remount_flags,
                None::<&str>,
            );
            if let Err(errno) = remounted {
                if let Err(e) = umount2(&mount_point, MntFlags::MNT_DETACH) {
                    warn!("Failed to undo bind mount at {:?}: {}", mount_point, e);
                }
                return Err(io::Error::from(errno).into());
            }
        }

        info!("Bind mounted {:?} at {:?}", self.root, mount_point);
        Ok(Box::new(BindMount { mount_point }))
    }
}

struct BindMount {
    mount_point: PathBuf,
}

impl Mount for BindMount {
    fn mount_point(&self) -> Option<&Path> {
        Some(&self.mount_point)
    }

    fn unmount(&mut self) -> Result<(), BackendError> {
        umount2(&self.mount_point, MntFlags::empty()).map_err(io::Error::from)?;
        Ok(())
    }

    fn unmount_forced(&mut self) -> Result<(), BackendError> {
        umount2(&self.mount_point, MntFlags::MNT_FORCE | MntFlags::MNT_DETACH)
            .map_err(io::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mount_flags() {
        assert_eq!(parse_mount_flags("").unwrap(), MsFlags::empty());
        assert_eq!(
            parse_mount_flags(DEFAULT_FLAGS).unwrap(),
            MsFlags::MS_NOSUID | MsFlags::MS_NODEV
        );
        assert_eq!(
            parse_mount_flags(" noexec, ro  noatime").unwrap(),
            MsFlags::MS_NOEXEC | MsFlags::MS_RDONLY | MsFlags::MS_NOATIME
        );
        assert!(matches!(
            parse_mount_flags("nosuid,bogus"),
            Err(BuilderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mount_point_must_exist() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut builder = BindMountService::new().for_file_system(temp_dir.path());

        assert!(builder
            .set_mount_point(&temp_dir.path().join("missing"))
            .is_err());
        builder.set_mount_point(temp_dir.path())?;
        Ok(())
    }

    #[test]
    fn test_capabilities() {
        let service = BindMountService::new();
        assert!(service.has_capability(Capability::UnmountForced));
        assert!(service.has_capability(Capability::MountToExistingDir));
        assert!(!service.has_capability(Capability::MountWithinExistingParent));
        assert_eq!(service.default_mount_flags(), DEFAULT_FLAGS);
    }
}
