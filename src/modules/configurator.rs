//! Translation of vault settings into builder calls.
//!
//! Only options matching the service's advertised capabilities are applied.
//! The mount point is decided up front from the capability set, so an
//! unusable mount point is reported before the builder or the filesystem is
//! touched.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::capability::Capability;
use super::constants::FILE_SYSTEM_NAME;
use super::drive_letters::{is_drive_letter, DriveLetterRegistry};
use super::environment::Environment;
use super::error::{MountError, Result};
use super::handle::Cleanup;
use super::parent;
use super::service::{MountBuilder, MountService};
use super::settings::VaultSettings;

/// Where the vault will be mounted, decided before anything is changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountPointPlan {
    /// The service picks the location.
    SystemChosen,
    /// A free drive letter.
    DriveLetter(PathBuf),
    /// The default base directory, used as parent of the mount point.
    WithinParent(PathBuf),
    /// `<base>/<mount name>`, created if missing.
    ExistingDir(PathBuf),
    /// The user's choice. `prepare_parent` moves an existing empty
    /// directory out of the way first.
    UserChosen { path: PathBuf, prepare_parent: bool },
    /// The service offers no usable way to place the mount point.
    Unresolved,
}

/// What the service can do with mount points.
#[derive(Debug, Clone, Copy)]
struct LocationSupport {
    drive_letter: bool,
    within_parent: bool,
    existing_dir: bool,
    system_chosen: bool,
}

impl LocationSupport {
    fn of(service: &dyn MountService) -> Self {
        Self {
            drive_letter: service.has_capability(Capability::MountAsDriveLetter),
            within_parent: service.has_capability(Capability::MountWithinExistingParent),
            existing_dir: service.has_capability(Capability::MountToExistingDir),
            system_chosen: service.has_capability(Capability::MountToSystemChosenPath),
        }
    }
}

/// Applies vault settings to a builder and resolves the mount point.
pub struct MountConfigurator<'a> {
    environment: &'a dyn Environment,
    drive_letters: &'a dyn DriveLetterRegistry,
}

impl<'a> MountConfigurator<'a> {
    pub fn new(environment: &'a dyn Environment, drive_letters: &'a dyn DriveLetterRegistry) -> Self {
        Self {
            environment,
            drive_letters,
        }
    }

    /// Configures `builder` for `vault` and returns the cleanup for whatever
    /// was prepared on disk.
    ///
    /// # Errors
    ///
    /// Mount point errors are raised before any builder call. I/O and
    /// preparation errors leave nothing to clean up.
    pub fn configure(
        &self,
        service: &dyn MountService,
        builder: &mut dyn MountBuilder,
        vault: &VaultSettings,
    ) -> Result<Cleanup> {
        let plan = self.plan_mount_point(service, vault)?;
        debug!("Mount point plan for {:?}: {:?}", vault.display_name, plan);
        self.apply_options(service, builder, vault)?;
        self.apply_mount_point(builder, plan)
    }

    /// Applies one builder call per advertised option capability.
    pub fn apply_options(
        &self,
        service: &dyn MountService,
        builder: &mut dyn MountBuilder,
        vault: &VaultSettings,
    ) -> Result<()> {
        for capability in service.capabilities().iter() {
            match capability {
                Capability::FileSystemName => builder.set_file_system_name(FILE_SYSTEM_NAME)?,
                Capability::LoopbackPort => builder.set_loopback_port(vault.port)?,
                Capability::LoopbackHostName => {
                    if let Some(alias) = self.environment.loopback_alias() {
                        builder.set_loopback_host_name(&alias)?;
                    }
                }
                Capability::ReadOnly => builder.set_read_only(vault.read_only)?,
                Capability::MountFlags => match vault.custom_mount_flags() {
                    Some(flags) => builder.set_mount_flags(flags)?,
                    None => builder.set_mount_flags(&service.default_mount_flags())?,
                },
                Capability::VolumeId => builder.set_volume_id(&vault.id)?,
                Capability::VolumeName => builder.set_volume_name(&vault.mount_name())?,
                Capability::MountAsDriveLetter
                | Capability::MountToExistingDir
                | Capability::MountToSystemChosenPath
                | Capability::MountWithinExistingParent
                | Capability::UnmountForced => {}
            }
        }
        Ok(())
    }

    /// Decides the mount point without changing anything.
    ///
    /// # Errors
    ///
    /// * [`MountError::MountPointInUse`] for an occupied drive letter
    /// * [`MountError::MountPointNotSupported`] if the service cannot mount to
    ///   this kind of location
    /// * [`MountError::MountPointNotExisting`] if the service needs an
    ///   existing directory and there is none
    /// * [`MountError::NoDriveLetterAvailable`] and
    ///   [`MountError::MountPointsDirUnavailable`] when a default location
    ///   cannot be found
    pub fn plan_mount_point(
        &self,
        service: &dyn MountService,
        vault: &VaultSettings,
    ) -> Result<MountPointPlan> {
        let support = LocationSupport::of(service);
        match &vault.mount_point {
            None => self.plan_default(support, vault),
            Some(path) => self.plan_user_chosen(support, path),
        }
    }

    fn plan_default(&self, support: LocationSupport, vault: &VaultSettings) -> Result<MountPointPlan> {
        if support.system_chosen {
            Ok(MountPointPlan::SystemChosen)
        } else if support.drive_letter {
            let letter = self
                .drive_letters
                .first_available()
                .ok_or(MountError::NoDriveLetterAvailable)?;
            Ok(MountPointPlan::DriveLetter(letter))
        } else if support.within_parent {
            Ok(MountPointPlan::WithinParent(self.mount_points_dir()?))
        } else if support.existing_dir {
            Ok(MountPointPlan::ExistingDir(
                self.mount_points_dir()?.join(vault.mount_name()),
            ))
        } else {
            warn!("Mount service offers no way to place the mount point");
            Ok(MountPointPlan::Unresolved)
        }
    }

    fn plan_user_chosen(&self, support: LocationSupport, path: &Path) -> Result<MountPointPlan> {
        let not_supported = |reason: &str| MountError::MountPointNotSupported {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if is_drive_letter(path) {
            if self.drive_letters.occupied().contains(path) {
                return Err(MountError::MountPointInUse(path.to_path_buf()));
            }
            if !support.drive_letter {
                return Err(not_supported("mount service cannot mount to drive letters"));
            }
            return Ok(MountPointPlan::UserChosen {
                path: path.to_path_buf(),
                prepare_parent: false,
            });
        }

        if !support.existing_dir && !support.within_parent {
            return Err(not_supported("mount service cannot mount to directories"));
        }
        if support.existing_dir && !support.within_parent && !path.exists() {
            return Err(MountError::MountPointNotExisting(path.to_path_buf()));
        }
        Ok(MountPointPlan::UserChosen {
            path: path.to_path_buf(),
            prepare_parent: support.within_parent && !support.existing_dir,
        })
    }

    /// Provisions directories for `plan` and hands the mount point to the builder.
    pub fn apply_mount_point(
        &self,
        builder: &mut dyn MountBuilder,
        plan: MountPointPlan,
    ) -> Result<Cleanup> {
        match plan {
            MountPointPlan::SystemChosen | MountPointPlan::Unresolved => Ok(Cleanup::noop()),
            MountPointPlan::DriveLetter(letter) => {
                set_mount_point(builder, &letter)?;
                info!("Mounting to drive letter {}", letter.display());
                Ok(Cleanup::noop())
            }
            MountPointPlan::WithinParent(dir) | MountPointPlan::ExistingDir(dir) => {
                fs::create_dir_all(&dir)?;
                set_mount_point(builder, &dir)?;
                info!("Mounting to {:?}", dir);
                Ok(Cleanup::noop())
            }
            MountPointPlan::UserChosen {
                path,
                prepare_parent: false,
            } => {
                set_mount_point(builder, &path)?;
                info!("Mounting to {:?}", path);
                Ok(Cleanup::noop())
            }
            MountPointPlan::UserChosen {
                path,
                prepare_parent: true,
            } => {
                parent::prepare_parent_no_mount_point(&path)?;
                let restore_path = path.clone();
                let cleanup = Cleanup::new(move || parent::cleanup(&restore_path));
                if let Err(e) = set_mount_point(builder, &path) {
                    cleanup.run();
                    return Err(e);
                }
                info!("Mounting within parent of {:?}", path);
                Ok(cleanup)
            }
        }
    }

    fn mount_points_dir(&self) -> Result<PathBuf> {
        self.environment
            .mount_points_dir()
            .ok_or(MountError::MountPointsDirUnavailable)
    }
}

fn set_mount_point(builder: &mut dyn MountBuilder, path: &Path) -> Result<()> {
    builder
        .set_mount_point(path)
        .map_err(|e| MountError::IllegalMountPoint {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
