//! Mount service exposing the vault root through a symbolic link.
//!
//! The link is created inside an existing parent directory: at the mount
//! point itself if it does not exist, or inside it, named after the volume,
//! if it is a directory. Without a mount point the link goes into the
//! temporary directory.

use log::{debug, info};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::modules::capability::{Capability, CapabilitySet};
use crate::modules::error::{BackendError, BuilderError};
use crate::modules::service::{Mount, MountBuilder, MountService};

pub const SYMLINK_SERVICE_ID: &str = "symlink";

pub struct SymlinkMountService {
    capabilities: CapabilitySet,
}

impl SymlinkMountService {
    pub fn new() -> Self {
        Self {
            capabilities: CapabilitySet::new(&[
                Capability::VolumeName,
                Capability::MountWithinExistingParent,
                Capability::MountToSystemChosenPath,
            ]),
        }
    }
}

impl Default for SymlinkMountService {
    fn default() -> Self {
        Self::new()
    }
}

impl MountService for SymlinkMountService {
    fn id(&self) -> &str {
        SYMLINK_SERVICE_ID
    }

    fn display_name(&self) -> &str {
        "Symbolic link"
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn for_file_system(&self, root: &Path) -> Box<dyn MountBuilder> {
        Box::new(SymlinkMountBuilder {
            root: root.to_path_buf(),
            mount_point: None,
            volume_name: None,
        })
    }
}

struct SymlinkMountBuilder {
    root: PathBuf,
    mount_point: Option<PathBuf>,
    volume_name: Option<String>,
}

impl SymlinkMountBuilder {
    fn link_path(&self) -> PathBuf {
        let name = self
            .volume_name
            .clone()
            .or_else(|| {
                self.root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "vault".to_string());
        match &self.mount_point {
            None => std::env::temp_dir().join(format!("{}-{}", name, Uuid::new_v4())),
            Some(dir) if is_real_dir(dir) => dir.join(name),
            Some(path) => path.clone(),
        }
    }
}

impl MountBuilder for SymlinkMountBuilder {
    fn set_volume_name(&mut self, name: &str) -> Result<(), BuilderError> {
        if name.is_empty() || name.contains('/') {
            return Err(BuilderError::InvalidArgument(format!(
                "invalid volume name {:?}",
                name
            )));
        }
        self.volume_name = Some(name.to_string());
        Ok(())
    }

    fn set_mount_point(&mut self, mount_point: &Path) -> Result<(), BuilderError> {
        let parent_exists = mount_point.parent().is_some_and(is_real_dir);
        if !is_real_dir(mount_point) && !parent_exists {
            return Err(BuilderError::InvalidArgument(format!(
                "parent of {} is not an existing directory",
                mount_point.display()
            )));
        }
        self.mount_point = Some(mount_point.to_path_buf());
        Ok(())
    }

    fn mount(self: Box<Self>) -> Result<Box<dyn Mount>, BackendError> {
        let link = self.link_path();
        if fs::symlink_metadata(&link).is_ok() {
            return Err(BackendError::Failed(format!(
                "{} already exists",
                link.display()
            )));
        }
        symlink(&self.root, &link)?;
        info!("Linked {:?} to {:?}", link, self.root);
        Ok(Box::new(SymlinkMount {
            link,
            mounted: true,
        }))
    }
}

struct SymlinkMount {
    link: PathBuf,
    mounted: bool,
}

impl Mount for SymlinkMount {
    fn mount_point(&self) -> Option<&Path> {
        Some(&self.link)
    }

    fn unmount(&mut self) -> Result<(), BackendError> {
        if !self.mounted {
            return Ok(());
        }
        if !fs::symlink_metadata(&self.link)?.file_type().is_symlink() {
            return Err(BackendError::Failed(format!(
                "{} is no longer a symbolic link",
                self.link.display()
            )));
        }
        fs::remove_file(&self.link)?;
        self.mounted = false;
        debug!("Removed link {:?}", self.link);
        Ok(())
    }

    fn unmount_forced(&mut self) -> Result<(), BackendError> {
        self.unmount()
    }
}

fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::drive_letters::SystemDriveLetters;
    use crate::modules::mount::Mounter;
    use crate::modules::selector::ProblematicServiceSlot;
    use crate::modules::settings::{Settings, VaultSettings};
    use crate::modules::testing::FakeEnvironment;
    use anyhow::Result;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_test_dirs() -> Result<(TempDir, PathBuf)> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("root");
        fs::create_dir(&root)?;
        fs::write(root.join("test.txt"), "test content")?;
        Ok((temp_dir, root))
    }

    fn setup_test_mounter(temp_dir: &TempDir) -> Mounter {
        Mounter::new(
            Arc::new(FakeEnvironment {
                mount_points_dir: Some(temp_dir.path().join("mnt")),
                loopback_alias: None,
            }),
            Arc::new(SystemDriveLetters),
            Settings::default(),
            vec![Arc::new(SymlinkMountService::new())],
            Arc::new(ProblematicServiceSlot::new()),
        )
    }

    #[test]
    fn test_link_at_missing_mount_point() -> Result<()> {
        let (temp_dir, root) = setup_test_dirs()?;
        let service = SymlinkMountService::new();
        let mount_point = temp_dir.path().join("vault");

        let mut builder = service.for_file_system(&root);
        builder.set_mount_point(&mount_point)?;
        let mut mount = builder.mount()?;

        assert_eq!(mount.mount_point(), Some(mount_point.as_path()));
        assert_eq!(fs::read_to_string(mount_point.join("test.txt"))?, "test content");

        mount.unmount()?;
        assert!(fs::symlink_metadata(&mount_point).is_err());
        mount.unmount()?;
        assert!(root.join("test.txt").is_file());
        Ok(())
    }

    #[test]
    fn test_link_inside_existing_dir() -> Result<()> {
        let (temp_dir, root) = setup_test_dirs()?;
        let service = SymlinkMountService::new();
        let parent = temp_dir.path().join("parent");
        fs::create_dir(&parent)?;

        let mut builder = service.for_file_system(&root);
        builder.set_volume_name("Work")?;
        builder.set_mount_point(&parent)?;
        let mut mount = builder.mount()?;

        assert_eq!(mount.mount_point(), Some(parent.join("Work").as_path()));
        mount.unmount()?;
        Ok(())
    }

    #[test]
    fn test_rejects_missing_parent() -> Result<()> {
        let (temp_dir, root) = setup_test_dirs()?;
        let mut builder = SymlinkMountService::new().for_file_system(&root);
        let result = builder.set_mount_point(&temp_dir.path().join("missing").join("vault"));
        assert!(matches!(result, Err(BuilderError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn test_system_chosen_path() -> Result<()> {
        let (_temp_dir, root) = setup_test_dirs()?;
        let mut builder = SymlinkMountService::new().for_file_system(&root);
        builder.set_volume_name("Work")?;
        let mut mount = builder.mount()?;

        let link = mount.mount_point().map(Path::to_path_buf).unwrap();
        assert!(link.starts_with(std::env::temp_dir()));
        assert!(link.join("test.txt").is_file());
        mount.unmount()?;
        Ok(())
    }

    #[test]
    fn test_mounter_with_user_chosen_directory() -> Result<()> {
        let (temp_dir, root) = setup_test_dirs()?;
        let mounter = setup_test_mounter(&temp_dir);
        let mount_point = temp_dir.path().join("vault");
        fs::create_dir(&mount_point)?;

        let mut vault = VaultSettings::new("Work");
        vault.mount_point = Some(mount_point.clone());
        let mut handle = mounter.mount(&vault, &root)?;

        assert_eq!(handle.mount_point(), Some(mount_point.as_path()));
        assert!(mount_point.join("test.txt").is_file());
        assert!(temp_dir.path().join(".~$vault.tmp").is_dir());

        handle.unmount()?;
        assert!(mount_point.is_dir());
        assert!(!mount_point.join("test.txt").exists());
        assert!(!temp_dir.path().join(".~$vault.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_mounter_default_location() -> Result<()> {
        let (temp_dir, root) = setup_test_dirs()?;
        let mounter = setup_test_mounter(&temp_dir);

        let mut handle = mounter.mount(&VaultSettings::new("Work"), &root)?;
        let link = handle.mount_point().map(Path::to_path_buf).unwrap();
        assert!(link.join("test.txt").is_file());
        assert!(!handle.cleanup().is_pending());

        handle.unmount()?;
        assert!(fs::symlink_metadata(&link).is_err());
        Ok(())
    }
}
