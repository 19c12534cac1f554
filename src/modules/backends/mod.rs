//! Built-in mount services.
//!
//! - `bind`: bind mount onto an existing directory (Linux, requires root)
//! - `symlink`: exposes the root through a symbolic link (unix)

#[cfg(target_os = "linux")]
pub mod bind;
#[cfg(unix)]
pub mod symlink;

use log::debug;
use std::sync::Arc;

use super::service::MountService;

/// All built-in services compiled for this platform, in order of preference.
pub fn builtin_services() -> Vec<Arc<dyn MountService>> {
    #[allow(unused_mut)]
    let mut services: Vec<Arc<dyn MountService>> = Vec::new();
    #[cfg(target_os = "linux")]
    services.push(Arc::new(bind::BindMountService::new()));
    #[cfg(unix)]
    services.push(Arc::new(symlink::SymlinkMountService::new()));
    services
}

/// Built-in services usable on this machine.
pub fn available_services() -> Vec<Arc<dyn MountService>> {
    builtin_services()
        .into_iter()
        .filter(|service| {
            let supported = service.is_supported();
            if !supported {
                debug!("Mount service {} is not supported here", service.id());
            }
            supported
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_service_ids_are_unique() {
        let services = builtin_services();
        let ids: HashSet<&str> = services.iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), services.len());
    }

    #[test]
    fn test_available_services_are_supported() {
        for service in available_services() {
            assert!(service.is_supported());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_always_available() {
        assert!(available_services()
            .iter()
            .any(|s| s.id() == symlink::SYMLINK_SERVICE_ID));
    }
}
