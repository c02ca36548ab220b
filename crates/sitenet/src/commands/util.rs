//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sitenet_core::{
    Actor, BroadcastLiveUpdates, CoreError, Device, DeviceId, DeviceRegistry, MacAddress,
    MemoryDeviceStore, MemoryPlacements, MemoryProjectDirectory, Project, TracingActivityLog,
};

use crate::error::CliError;

// ── State file ──────────────────────────────────────────────────────

/// On-disk shape of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    devices: Vec<Device>,
    #[serde(default)]
    placements: Vec<DeviceId>,
}

/// The in-memory adapters loaded from a state file, wired into a registry.
pub struct Site {
    pub devices: Arc<MemoryDeviceStore>,
    pub projects: Arc<MemoryProjectDirectory>,
    pub placements: Arc<MemoryPlacements>,
    pub registry: Arc<DeviceRegistry>,
    path: PathBuf,
}

impl Site {
    /// Load the state file. A missing file is an empty site.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let state: StateFile = if path.exists() {
            read_json_file(path)?
        } else {
            debug!(path = %path.display(), "state file absent, starting empty");
            StateFile::default()
        };

        let devices = Arc::new(MemoryDeviceStore::with_devices(state.devices)?);
        let projects = Arc::new(MemoryProjectDirectory::with_projects(state.projects));
        let placements = Arc::new(MemoryPlacements::with_placed(state.placements));
        let registry = Arc::new(DeviceRegistry::new(
            devices.clone(),
            placements.clone(),
            Arc::new(TracingActivityLog),
            Arc::new(BroadcastLiveUpdates::new()),
        ));

        Ok(Self {
            devices,
            projects,
            placements,
            registry,
            path: path.to_owned(),
        })
    }

    /// Write the current state back, replacing the file atomically.
    pub fn save(&self) -> Result<(), CliError> {
        let state = StateFile {
            projects: self.projects.all(),
            devices: self.devices.all(),
            placements: self.placements.all(),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(
            path = %self.path.display(),
            projects = state.projects.len(),
            devices = state.devices.len(),
            "state saved"
        );
        Ok(())
    }

    /// Look a project up by its numeric code.
    pub fn project(&self, code: u8) -> Result<Project, CliError> {
        self.projects
            .all()
            .into_iter()
            .find(|p| p.code == code)
            .ok_or_else(|| CoreError::ProjectNotFound { code }.into())
    }

    /// Resolve a device identifier (UUID or MAC) within a project.
    pub async fn resolve_device(
        &self,
        project: &Project,
        identifier: &str,
    ) -> Result<Device, CliError> {
        if let Ok(id) = identifier.parse::<DeviceId>() {
            return Ok(self.registry.get(project.id, id).await?);
        }
        if let Ok(mac) = MacAddress::parse(identifier) {
            let found = self
                .registry
                .list(project.id)
                .await?
                .into_iter()
                .find(|d| d.mac_address.as_ref() == Some(&mac));
            if let Some(device) = found {
                return Ok(device);
            }
        }
        Err(CoreError::DeviceNotFound {
            identifier: identifier.into(),
        }
        .into())
    }
}

// ── Input ───────────────────────────────────────────────────────────

/// Read and parse a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::InvalidFile {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidFile {
        path: path.to_owned(),
        reason: format!("invalid JSON: {e}"),
    })
}

// ── Interaction ─────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// The operator recorded against manual edits.
pub fn operator() -> Actor {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map_or_else(|_| Actor::user("cli"), Actor::user)
}
