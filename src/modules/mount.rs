use log::info;
use std::path::Path;
use std::sync::Arc;

use super::capability::Capability;
use super::configurator::MountConfigurator;
use super::drive_letters::DriveLetterRegistry;
use super::environment::Environment;
use super::error::{MountError, Result};
use super::handle::MountHandle;
use super::selector::{ProblematicServiceSlot, ProviderSelector};
use super::service::MountService;
use super::settings::{Settings, VaultSettings};

/// Mounts vaults using the best matching mount service.
pub struct Mounter {
    environment: Arc<dyn Environment>,
    drive_letters: Arc<dyn DriveLetterRegistry>,
    settings: Settings,
    services: Vec<Arc<dyn MountService>>,
    selector: ProviderSelector,
}

impl Mounter {
    /// Creates a mounter.
    ///
    /// `slot` records the first problematic FUSE service used and should be
    /// shared by every mounter of the process.
    pub fn new(
        environment: Arc<dyn Environment>,
        drive_letters: Arc<dyn DriveLetterRegistry>,
        settings: Settings,
        services: Vec<Arc<dyn MountService>>,
        slot: Arc<ProblematicServiceSlot>,
    ) -> Self {
        Self {
            environment,
            drive_letters,
            settings,
            services,
            selector: ProviderSelector::new(slot),
        }
    }

    /// Services to choose from, in order of preference when nothing is configured.
    pub fn services(&self) -> &[Arc<dyn MountService>] {
        &self.services
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mounts the filesystem at `root` according to `vault`.
    ///
    /// # Errors
    ///
    /// All errors except [`MountError::MountFailed`] occur before the OS-level
    /// mount is attempted. `MountFailed` carries the cleanup the caller must run.
    pub fn mount(&self, vault: &VaultSettings, root: &Path) -> Result<MountHandle> {
        let service = self.selector.select(
            vault.mount_service.as_deref(),
            self.settings.mount_service.as_deref(),
            &self.services,
        )?;
        info!(
            "Mounting {:?} from {:?} using {}",
            vault.display_name,
            root,
            service.display_name()
        );

        let mut builder = service.for_file_system(root);
        let configurator =
            MountConfigurator::new(self.environment.as_ref(), self.drive_letters.as_ref());
        let cleanup = configurator.configure(service.as_ref(), builder.as_mut(), vault)?;

        let mount = builder.mount().map_err(|source| MountError::MountFailed {
            source,
            cleanup: cleanup.clone(),
        })?;
        info!(
            "Mounted {:?} at {:?}",
            vault.display_name,
            mount.mount_point()
        );

        Ok(MountHandle::new(
            mount,
            service.has_capability(Capability::UnmountForced),
            cleanup,
        ))
    }
}
