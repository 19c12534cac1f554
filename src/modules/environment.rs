//! Host environment lookups needed to place mount points.

use std::env;
use std::path::PathBuf;

use super::constants::{
    APP_DIR_NAME, ENV_LOOPBACK_ALIAS, ENV_MOUNT_POINTS_DIR, MOUNT_POINTS_DIR_NAME,
};
use super::settings::Settings;

pub trait Environment: Send + Sync {
    /// Host name resolving to the loopback interface, if one is configured.
    fn loopback_alias(&self) -> Option<String>;

    /// Base directory for mount points created on behalf of vaults.
    fn mount_points_dir(&self) -> Option<PathBuf>;
}

/// Environment backed by process environment variables, settings and the
/// platform's data directory.
#[derive(Debug, Clone, Default)]
pub struct SystemEnvironment {
    mount_points_dir: Option<PathBuf>,
    loopback_alias: Option<String>,
}

impl SystemEnvironment {
    /// Resolves the environment once.
    ///
    /// The mount points directory comes from `VAULTMOUNT_MOUNT_POINTS_DIR`,
    /// then `settings.mount_points_dir`, then the local data directory. The
    /// loopback alias comes from `VAULTMOUNT_LOOPBACK_ALIAS`, then
    /// `settings.loopback_alias`.
    pub fn new(settings: &Settings) -> Self {
        let mount_points_dir = non_empty_var(ENV_MOUNT_POINTS_DIR)
            .map(PathBuf::from)
            .or_else(|| settings.mount_points_dir.clone())
            .or_else(|| {
                dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME).join(MOUNT_POINTS_DIR_NAME))
            });
        let loopback_alias = non_empty_var(ENV_LOOPBACK_ALIAS)
            .or_else(|| settings.loopback_alias.clone())
            .filter(|alias| !alias.trim().is_empty());
        Self {
            mount_points_dir,
            loopback_alias,
        }
    }
}

impl Environment for SystemEnvironment {
    fn loopback_alias(&self) -> Option<String> {
        self.loopback_alias.clone()
    }

    fn mount_points_dir(&self) -> Option<PathBuf> {
        self.mount_points_dir.clone()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_are_used() {
        // The override variables are not set in the test environment.
        if env::var_os(ENV_MOUNT_POINTS_DIR).is_some() || env::var_os(ENV_LOOPBACK_ALIAS).is_some() {
            return;
        }
        let settings = Settings {
            mount_service: None,
            mount_points_dir: Some(PathBuf::from("/srv/vaults")),
            loopback_alias: Some("vault.localhost".to_string()),
        };
        let env = SystemEnvironment::new(&settings);
        assert_eq!(env.mount_points_dir(), Some(PathBuf::from("/srv/vaults")));
        assert_eq!(env.loopback_alias(), Some("vault.localhost".to_string()));
    }

    #[test]
    fn test_blank_alias_is_ignored() {
        if env::var_os(ENV_LOOPBACK_ALIAS).is_some() {
            return;
        }
        let settings = Settings {
            loopback_alias: Some("  ".to_string()),
            ..Settings::default()
        };
        assert_eq!(SystemEnvironment::new(&settings).loopback_alias(), None);
    }
}
