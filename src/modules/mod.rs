//! Core mount orchestration modules.
//!
//! - `backends`: Built-in mount services
//! - `capability`: Capabilities advertised by mount services
//! - `configurator`: Builder configuration and mount point resolution
//! - `constants`: Fixed labels, defaults and limits
//! - `drive_letters`: Windows drive letters
//! - `environment`: Host environment lookups
//! - `error`: Error types
//! - `handle`: Mount handles and cleanup actions
//! - `mount`: Service selection, configuration and mounting in one call
//! - `parent`: Mount-within-parent preparation
//! - `selector`: Mount service selection
//! - `service`: Traits implemented by mount services
//! - `settings`: Persisted settings

pub mod backends;
pub mod capability;
pub mod configurator;
pub mod constants;
pub mod drive_letters;
pub mod environment;
pub mod error;
pub mod handle;
pub mod mount;
pub mod parent;
pub mod selector;
pub mod service;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;
