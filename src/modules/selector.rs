//! Mount service selection.
//!
//! A vault's preferred service wins over the global preference, which wins
//! over the first available service. Some FUSE drivers cannot coexist within
//! one process: once one of them has been used, selecting a different one
//! fails until the process restarts.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use super::constants::PROBLEMATIC_FUSE_SERVICES;
use super::error::{MountError, Result};
use super::service::MountService;

/// Returns true if the service belongs to the FUSE drivers that cannot be swapped at runtime.
pub fn is_problematic_fuse_service(service: &dyn MountService) -> bool {
    PROBLEMATIC_FUSE_SERVICES
        .iter()
        .any(|id| *id == service.id())
}

/// Picks the service matching `vault_preference`, else `global_preference`,
/// else the first of `services`.
///
/// # Errors
///
/// Returns [`MountError::NoMountService`] if `services` is empty.
pub fn select_service<'a>(
    vault_preference: Option<&str>,
    global_preference: Option<&str>,
    services: &'a [Arc<dyn MountService>],
) -> Result<&'a Arc<dyn MountService>> {
    let find = |preference: Option<&str>| {
        preference.and_then(|id| services.iter().find(|service| service.id() == id))
    };
    find(vault_preference)
        .or_else(|| find(global_preference))
        .or_else(|| services.first())
        .ok_or(MountError::NoMountService)
}

/// Process-wide record of the first problematic FUSE service used.
///
/// Set at most once and never cleared.
#[derive(Debug, Default)]
pub struct ProblematicServiceSlot {
    first: Mutex<Option<String>>,
}

impl ProblematicServiceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the first problematic service used, if any.
    pub fn get(&self) -> Option<String> {
        self.first.lock().clone()
    }

    /// Claims the slot for `service` if it is problematic and the slot is free.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::DriverRestartRequired`] if `service` is
    /// problematic and a different problematic service already holds the slot.
    pub fn claim(&self, service: &dyn MountService) -> Result<()> {
        if !is_problematic_fuse_service(service) {
            return Ok(());
        }
        let mut first = self.first.lock();
        match first.as_deref() {
            None => {
                info!("First problematic FUSE service in use: {}", service.id());
                *first = Some(service.id().to_string());
                Ok(())
            }
            Some(id) if id == service.id() => Ok(()),
            Some(id) => {
                warn!(
                    "Cannot use {} while {} is loaded, restart required",
                    service.id(),
                    id
                );
                Err(MountError::DriverRestartRequired {
                    first: id.to_string(),
                    requested: service.id().to_string(),
                })
            }
        }
    }
}

/// Selects a service and enforces the problematic driver rule.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelector {
    slot: Arc<ProblematicServiceSlot>,
}

impl ProviderSelector {
    pub fn new(slot: Arc<ProblematicServiceSlot>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &Arc<ProblematicServiceSlot> {
        &self.slot
    }

    /// Selects a service as [`select_service`] does, then claims the
    /// problematic driver slot for it.
    pub fn select(
        &self,
        vault_preference: Option<&str>,
        global_preference: Option<&str>,
        services: &[Arc<dyn MountService>],
    ) -> Result<Arc<dyn MountService>> {
        let service = select_service(vault_preference, global_preference, services)?;
        debug!(
            "Selected mount service {} (vault preference {:?}, global preference {:?})",
            service.id(),
            vault_preference,
            global_preference
        );
        self.slot.claim(service.as_ref())?;
        Ok(service.clone())
    }
}
