#![doc(html_root_url = "https://docs.rs/vaultmount/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! vaultmount: mount provider negotiation for encrypted vaults
//!
//! Picks one of several competing mount services, translates vault settings
//! into the calls that service supports, resolves a mount point and returns
//! a handle that unmounts and cleans up afterwards.
//!
//! ## Features
//!
//! - Per-vault and global mount service preferences with a deterministic fallback
//! - Capability-gated builder configuration
//! - Mount point resolution for drive letters, existing directories,
//!   directories created within an existing parent and service chosen paths
//! - Protection against mixing FUSE drivers that cannot coexist in one process
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vaultmount::{
//!     available_services, Mounter, ProblematicServiceSlot, Settings, SystemDriveLetters,
//!     SystemEnvironment, VaultSettings,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let mounter = Mounter::new(
//!     Arc::new(SystemEnvironment::new(&settings)),
//!     Arc::new(SystemDriveLetters),
//!     settings,
//!     available_services(),
//!     Arc::new(ProblematicServiceSlot::new()),
//! );
//!
//! let mut handle = mounter.mount(&VaultSettings::new("Work"), Path::new("/tmp/vault"))?;
//! println!("Mounted at {:?}", handle.mount_point());
//! handle.unmount()?;
//! # Ok(())
//! # }
//! ```

pub mod modules;

pub use modules::backends::available_services;
pub use modules::capability::{Capability, CapabilitySet};
pub use modules::drive_letters::{DriveLetterRegistry, SystemDriveLetters};
pub use modules::environment::{Environment, SystemEnvironment};
pub use modules::error::{BackendError, BuilderError, MountError};
pub use modules::handle::{Cleanup, MountHandle};
pub use modules::mount::Mounter;
pub use modules::selector::ProblematicServiceSlot;
pub use modules::service::{Mount, MountBuilder, MountService};
pub use modules::settings::{Config, Settings, VaultSettings};
