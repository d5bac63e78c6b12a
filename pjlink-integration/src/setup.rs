//! Entry setup: coordinator, first refresh, entities and polling
//!
//! [`setup_entry`] turns a persisted [`ConfigEntry`] into a running
//! [`ProjectorIntegration`]. The integration owns everything belonging to
//! the entry; dropping or unloading it tears the entry down.

use std::sync::Arc;
use std::time::Duration;

use pjlink_client::{Connector, MuteChannel};
use pjlink_coordinator::{Coordinator, DeviceSnapshot, Poller, SCAN_INTERVAL};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::ConfigEntry;
use crate::constants::{Platform, PLATFORMS};
use crate::entity::{
    Entity, ErrorSensor, InputSourceSelect, LampSensor, MuteSwitch, PowerSwitch,
    ProjectorMediaPlayer, SensorEntity, SwitchEntity,
};
use crate::error::{Result, SetupError};

const REDACTED: &str = "**REDACTED**";

/// Optional features the projector reported during setup
///
/// Detected once from the first snapshot and kept for the lifetime of the
/// entry, even if the projector later starts or stops reporting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub has_audio_mute: bool,
    pub has_video_mute: bool,
    pub has_inputs: bool,
    /// Indices of the lamps present at setup
    pub lamps: Vec<u8>,
    /// Subsystems the error report covered at setup
    pub error_subsystems: Vec<String>,
}

impl Capabilities {
    pub fn detect(snapshot: &DeviceSnapshot) -> Self {
        Self {
            has_audio_mute: snapshot.audio_mute.is_some(),
            has_video_mute: snapshot.video_mute.is_some(),
            has_inputs: !snapshot.source_list().is_empty(),
            lamps: snapshot.lamps.keys().copied().collect(),
            error_subsystems: snapshot.errors.keys().cloned().collect(),
        }
    }

    pub fn has_lamps(&self) -> bool {
        !self.lamps.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.error_subsystems.is_empty()
    }
}

/// Every entity built for one entry, grouped by platform
pub struct Entities {
    pub media_player: ProjectorMediaPlayer,
    pub select: Option<InputSourceSelect>,
    pub switches: Vec<Box<dyn SwitchEntity>>,
    pub sensors: Vec<Box<dyn SensorEntity>>,
}

impl Entities {
    fn build(coordinator: &Arc<Coordinator>, capabilities: &Capabilities) -> Self {
        let mut switches: Vec<Box<dyn SwitchEntity>> =
            vec![Box::new(PowerSwitch::new(Arc::clone(coordinator)))];
        if capabilities.has_audio_mute {
            switches.push(Box::new(MuteSwitch::new(Arc::clone(coordinator), MuteChannel::Audio)));
        }
        if capabilities.has_video_mute {
            switches.push(Box::new(MuteSwitch::new(Arc::clone(coordinator), MuteChannel::Video)));
        }

        let select = capabilities
            .has_inputs
            .then(|| InputSourceSelect::new(Arc::clone(coordinator)));

        let mut sensors: Vec<Box<dyn SensorEntity>> = Vec::new();
        for &index in &capabilities.lamps {
            sensors.push(Box::new(LampSensor::new(Arc::clone(coordinator), index)));
        }
        for subsystem in &capabilities.error_subsystems {
            sensors.push(Box::new(ErrorSensor::new(Arc::clone(coordinator), subsystem.clone())));
        }

        Self {
            media_player: ProjectorMediaPlayer::new(Arc::clone(coordinator)),
            select,
            switches,
            sensors,
        }
    }

    /// Unique ids of all entities, media player first
    pub fn unique_ids(&self) -> Vec<String> {
        let mut ids = vec![self.media_player.unique_id()];
        ids.extend(self.select.iter().map(|s| s.unique_id()));
        ids.extend(self.switches.iter().map(|s| s.unique_id()));
        ids.extend(self.sensors.iter().map(|s| s.unique_id()));
        ids
    }

    /// Number of entities on one platform
    pub fn count(&self, platform: Platform) -> usize {
        match platform {
            Platform::MediaPlayer => 1,
            Platform::Select => usize::from(self.select.is_some()),
            Platform::Switch => self.switches.len(),
            Platform::Sensor => self.sensors.len(),
        }
    }

    pub fn total(&self) -> usize {
        PLATFORMS.into_iter().map(|p| self.count(p)).sum()
    }

    pub fn switch(&self, unique_id: &str) -> Option<&dyn SwitchEntity> {
        self.switches
            .iter()
            .find(|s| s.unique_id() == unique_id)
            .map(|s| s.as_ref())
    }

    pub fn sensor(&self, unique_id: &str) -> Option<&dyn SensorEntity> {
        self.sensors
            .iter()
            .find(|s| s.unique_id() == unique_id)
            .map(|s| s.as_ref())
    }
}

impl std::fmt::Debug for Entities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.unique_ids()).finish()
    }
}

/// A set-up projector entry
#[derive(Debug)]
pub struct ProjectorIntegration {
    entry: ConfigEntry,
    coordinator: Arc<Coordinator>,
    capabilities: Capabilities,
    entities: Entities,
    poller: Option<Poller>,
}

/// Set up an entry with the default polling interval
///
/// Blocks for the first refresh. If it fails the entry is not set up and
/// [`SetupError::NotReady`] tells the host to retry later.
pub fn setup_entry(entry: &ConfigEntry, connector: Arc<dyn Connector>) -> Result<ProjectorIntegration> {
    setup_entry_with_interval(entry, connector, SCAN_INTERVAL)
}

pub fn setup_entry_with_interval(
    entry: &ConfigEntry,
    connector: Arc<dyn Connector>,
    update_interval: Duration,
) -> Result<ProjectorIntegration> {
    let params = entry.data.connection_params();
    let coordinator =
        Arc::new(Coordinator::new(params, connector).with_update_interval(update_interval));

    let snapshot = coordinator.refresh().map_err(|e| {
        warn!("Projector {} not ready: {}", entry.data.host, e);
        SetupError::NotReady(e)
    })?;

    let capabilities = Capabilities::detect(&snapshot);
    debug!("Projector {} capabilities: {:?}", entry.data.host, capabilities);

    let entities = Entities::build(&coordinator, &capabilities);
    info!(
        "Set up {} {} at {} with {} entities",
        snapshot.manufacturer,
        snapshot.product_name,
        entry.data.host,
        entities.total()
    );

    Ok(ProjectorIntegration {
        entry: entry.clone(),
        coordinator,
        capabilities,
        entities,
        poller: None,
    })
}

impl ProjectorIntegration {
    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Platforms that received at least one entity
    pub fn platforms(&self) -> Vec<Platform> {
        PLATFORMS
            .into_iter()
            .filter(|p| self.entities.count(*p) > 0)
            .collect()
    }

    /// Start the periodic refresh on the current tokio runtime
    ///
    /// Does nothing if polling already runs.
    pub fn start_polling(&mut self) {
        if self.poller.is_some() {
            return;
        }
        self.poller = Some(Poller::start(Arc::clone(&self.coordinator)));
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_running)
    }

    /// Stop polling and release the entry
    pub async fn unload(mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        info!("Unloaded projector {}", self.entry.data.host);
    }

    /// Tear the entry down and set it up again from `entry`
    ///
    /// Used when the stored settings change. Polling resumes if it was
    /// running before.
    pub async fn reload(self, entry: ConfigEntry, connector: Arc<dyn Connector>) -> Result<Self> {
        let was_polling = self.poller.is_some();
        let interval = self.coordinator.update_interval();
        self.unload().await;

        let mut reloaded = tokio::task::spawn_blocking(move || {
            setup_entry_with_interval(&entry, connector, interval)
        })
        .await??;

        if was_polling {
            reloaded.start_polling();
        }
        Ok(reloaded)
    }

    /// Entry, status and snapshot as JSON, with the password redacted
    pub fn diagnostics(&self) -> Value {
        let mut data = self.entry.data.clone();
        if !data.password.is_empty() {
            data.password = REDACTED.to_string();
        }

        json!({
            "entry": {
                "title": self.entry.title,
                "data": data,
            },
            "status": format!("{:?}", self.coordinator.status()),
            "last_update_success": self.coordinator.last_update_success(),
            "capabilities": self.capabilities,
            "entities": self.entities.unique_ids(),
            "snapshot": self.coordinator.snapshot().as_deref(),
        })
    }
}
