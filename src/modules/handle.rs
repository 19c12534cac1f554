//! Live mount handles and their deferred cleanup.

use log::{debug, info};
use parking_lot::Mutex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::error::BackendError;
use super::service::Mount;

type CleanupFn = Box<dyn FnOnce() + Send>;

/// Deferred action reversing whatever was provisioned for a mount point.
///
/// Clones share the same action. The action runs at most once; later calls
/// to [`Cleanup::run`] do nothing.
#[derive(Clone)]
pub struct Cleanup {
    action: Arc<Mutex<Option<CleanupFn>>>,
}

impl Cleanup {
    /// A cleanup with nothing to undo.
    pub fn noop() -> Self {
        Self {
            action: Arc::new(Mutex::new(None)),
        }
    }

    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Arc::new(Mutex::new(Some(Box::new(action)))),
        }
    }

    /// Runs the action if it has not run yet.
    pub fn run(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Returns true while there is still something to undo.
    pub fn is_pending(&self) -> bool {
        self.action.lock().is_some()
    }
}

impl Default for Cleanup {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// A mounted vault as returned by [`Mounter::mount`](super::mount::Mounter::mount).
pub struct MountHandle {
    mount: Box<dyn Mount>,
    supports_unmount_forced: bool,
    cleanup: Cleanup,
}

impl MountHandle {
    pub fn new(mount: Box<dyn Mount>, supports_unmount_forced: bool, cleanup: Cleanup) -> Self {
        Self {
            mount,
            supports_unmount_forced,
            cleanup,
        }
    }

    /// Location where the vault is visible.
    pub fn mount_point(&self) -> Option<&Path> {
        self.mount.mount_point()
    }

    /// Whether the service that produced this mount supports forced unmount.
    pub fn supports_unmount_forced(&self) -> bool {
        self.supports_unmount_forced
    }

    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }

    /// Unmounts and runs the cleanup.
    ///
    /// # Errors
    ///
    /// Returns the backend error if unmounting fails. The cleanup is kept
    /// pending in that case, so the call can be retried.
    pub fn unmount(&mut self) -> Result<(), BackendError> {
        self.mount.unmount()?;
        info!("Unmounted {:?}", self.mount.mount_point());
        self.run_cleanup();
        Ok(())
    }

    /// Force-unmounts and runs the cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unsupported`] if the service cannot force an
    /// unmount, or the backend error if unmounting fails.
    pub fn unmount_forced(&mut self) -> Result<(), BackendError> {
        if !self.supports_unmount_forced {
            return Err(BackendError::Unsupported("forced unmount"));
        }
        self.mount.unmount_forced()?;
        info!("Force-unmounted {:?}", self.mount.mount_point());
        self.run_cleanup();
        Ok(())
    }

    fn run_cleanup(&self) {
        if self.cleanup.is_pending() {
            debug!("Running mount point cleanup");
        }
        self.cleanup.run();
    }
}

impl fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHandle")
            .field("mount_point", &self.mount.mount_point())
            .field("supports_unmount_forced", &self.supports_unmount_forced)
            .field("cleanup", &self.cleanup)
            .finish()
    }
}
