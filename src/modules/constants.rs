use std::time::Duration;

// Builder defaults
pub const FILE_SYSTEM_NAME: &str = "vaultFs";
pub const DEFAULT_LOOPBACK_PORT: u16 = 42427;

// Mount-within-parent hideaway naming: `.~$<name>.tmp`
pub const HIDEAWAY_PREFIX: &str = ".~$";
pub const HIDEAWAY_SUFFIX: &str = ".tmp";
pub const MOUNT_POINT_CLEAR_ATTEMPTS: u32 = 10;
pub const MOUNT_POINT_RESTORE_ATTEMPTS: u32 = 5;
pub const MOUNT_POINT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// Drive letters handed out to vaults; A to C are reserved for the system
pub const FIRST_DRIVE_LETTER: char = 'D';
pub const LAST_DRIVE_LETTER: char = 'Z';

/// Identities of FUSE backends whose kernel drivers cannot be swapped for
/// one another without restarting the process.
pub const PROBLEMATIC_FUSE_SERVICES: &[&str] = &["fuse.macfuse", "fuse.fuse-t"];

// Environment overrides
pub const ENV_MOUNT_POINTS_DIR: &str = "VAULTMOUNT_MOUNT_POINTS_DIR";
pub const ENV_LOOPBACK_ALIAS: &str = "VAULTMOUNT_LOOPBACK_ALIAS";

pub const APP_DIR_NAME: &str = "vaultmount";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const MOUNT_POINTS_DIR_NAME: &str = "mnt";
