//! Scripted fakes for the collaborator traits, shared by unit tests.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::capability::{Capability, CapabilitySet};
use super::drive_letters::DriveLetterRegistry;
use super::environment::Environment;
use super::error::{BackendError, BuilderError};
use super::service::{Mount, MountBuilder, MountService};

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<String>,
    builders: usize,
}

/// Mount service with a configurable capability set that records every
/// builder call made against it.
pub struct FakeService {
    id: String,
    capabilities: CapabilitySet,
    default_flags: String,
    reject_mount_point: Option<BuilderError>,
    fail_mount: bool,
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    pub fn new(id: &str, capabilities: &[Capability]) -> Self {
        Self {
            id: id.to_string(),
            capabilities: CapabilitySet::new(capabilities),
            default_flags: "-odefault".to_string(),
            reject_mount_point: None,
            fail_mount: false,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn rejecting_mount_point(mut self, error: BuilderError) -> Self {
        self.reject_mount_point = Some(error);
        self
    }

    pub fn failing_mount(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    /// Builder calls in order, e.g. `read_only=true` or `mount`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn builders_created(&self) -> usize {
        self.state.lock().builders
    }

    /// Returns the value recorded for a setter, e.g. `call_value("mount_flags")`.
    pub fn call_value(&self, setter: &str) -> Option<String> {
        let prefix = format!("{setter}=");
        self.calls()
            .iter()
            .find_map(|call| call.strip_prefix(&prefix).map(str::to_string))
    }

    /// Typed builder for configurator tests, bypassing `for_file_system`.
    pub fn builder(&self) -> FakeBuilder {
        self.state.lock().builders += 1;
        FakeBuilder {
            capabilities: self.capabilities.clone(),
            reject_mount_point: self.reject_mount_point.clone(),
            fail_mount: self.fail_mount,
            mount_point: None,
            state: self.state.clone(),
        }
    }
}

impl MountService for FakeService {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn default_mount_flags(&self) -> String {
        self.default_flags.clone()
    }

    fn for_file_system(&self, _root: &Path) -> Box<dyn MountBuilder> {
        Box::new(self.builder())
    }
}

pub struct FakeBuilder {
    capabilities: CapabilitySet,
    reject_mount_point: Option<BuilderError>,
    fail_mount: bool,
    mount_point: Option<PathBuf>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBuilder {
    fn record(
        &mut self,
        capability: Capability,
        setter: &'static str,
        value: String,
    ) -> Result<(), BuilderError> {
        let mut state = self.state.lock();
        if self.capabilities.contains(capability) {
            state.calls.push(format!("{setter}={value}"));
            Ok(())
        } else {
            state.calls.push(format!("unsupported:{setter}"));
            Err(BuilderError::Unsupported(setter))
        }
    }
}

impl MountBuilder for FakeBuilder {
    fn set_file_system_name(&mut self, name: &str) -> Result<(), BuilderError> {
        self.record(Capability::FileSystemName, "file_system_name", name.to_string())
    }

    fn set_loopback_port(&mut self, port: u16) -> Result<(), BuilderError> {
        self.record(Capability::LoopbackPort, "loopback_port", port.to_string())
    }

    fn set_loopback_host_name(&mut self, host_name: &str) -> Result<(), BuilderError> {
        self.record(
            Capability::LoopbackHostName,
            "loopback_host_name",
            host_name.to_string(),
        )
    }

    fn set_read_only(&mut self, read_only: bool) -> Result<(), BuilderError> {
        self.record(Capability::ReadOnly, "read_only", read_only.to_string())
    }

    fn set_mount_flags(&mut self, flags: &str) -> Result<(), BuilderError> {
        self.record(Capability::MountFlags, "mount_flags", flags.to_string())
    }

    fn set_volume_id(&mut self, id: &str) -> Result<(), BuilderError> {
        self.record(Capability::VolumeId, "volume_id", id.to_string())
    }

    fn set_volume_name(&mut self, name: &str) -> Result<(), BuilderError> {
        self.record(Capability::VolumeName, "volume_name", name.to_string())
    }

    fn set_mount_point(&mut self, mount_point: &Path) -> Result<(), BuilderError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(format!("mount_point={}", mount_point.display()));
        if let Some(error) = &self.reject_mount_point {
            return Err(error.clone());
        }
        self.mount_point = Some(mount_point.to_path_buf());
        Ok(())
    }

    fn mount(self: Box<Self>) -> Result<Box<dyn Mount>, BackendError> {
        self.state.lock().calls.push("mount".to_string());
        if self.fail_mount {
            return Err(BackendError::Failed("scripted mount failure".to_string()));
        }
        Ok(Box::new(FakeMount {
            mount_point: self.mount_point,
            state: self.state,
        }))
    }
}

pub struct FakeMount {
    mount_point: Option<PathBuf>,
    state: Arc<Mutex<FakeState>>,
}

impl Mount for FakeMount {
    fn mount_point(&self) -> Option<&Path> {
        self.mount_point.as_deref()
    }

    fn unmount(&mut self) -> Result<(), BackendError> {
        self.state.lock().calls.push("unmount".to_string());
        Ok(())
    }

    fn unmount_forced(&mut self) -> Result<(), BackendError> {
        self.state.lock().calls.push("unmount_forced".to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeEnvironment {
    pub mount_points_dir: Option<PathBuf>,
    pub loopback_alias: Option<String>,
}

impl Environment for FakeEnvironment {
    fn loopback_alias(&self) -> Option<String> {
        self.loopback_alias.clone()
    }

    fn mount_points_dir(&self) -> Option<PathBuf> {
        self.mount_points_dir.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDriveLetters {
    pub available: Vec<PathBuf>,
    pub occupied: BTreeSet<PathBuf>,
}

impl DriveLetterRegistry for FakeDriveLetters {
    fn first_available(&self) -> Option<PathBuf> {
        self.available.first().cloned()
    }

    fn occupied(&self) -> BTreeSet<PathBuf> {
        self.occupied.clone()
    }
}
