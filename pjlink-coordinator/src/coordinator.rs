//! Coordinator - owns the projector connection and the latest snapshot
//!
//! One coordinator exists per configured projector. It refreshes the
//! snapshot on demand (the [`Poller`](crate::Poller) calls it on a timer)
//! and offers the commands the entity layer forwards user actions to.
//! Every refresh and every command opens its own short-lived session.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pjlink_client::{Connector, MuteChannel, PowerState};
use snapshot_store::{SnapshotStore, UpdateListener};
use tracing::{debug, info, warn};

use crate::error::{CoordinatorError, Result};
use crate::params::ConnectionParams;
use crate::session::Session;
use crate::snapshot::{format_input_source, has_power, DeviceSnapshot};

/// Fixed polling interval
pub const SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Where the coordinator is in its refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStatus {
    /// No refresh has completed yet
    Unknown,
    /// A refresh is in flight
    Refreshing,
    /// The last refresh succeeded
    Available,
    /// The last refresh failed
    Unavailable,
}

/// Polling coordinator for one projector
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = Coordinator::new(params, connector);
/// coordinator.refresh()?;
///
/// if let Some(snapshot) = coordinator.snapshot() {
///     println!("{} is {}", snapshot.name, snapshot.power_state);
/// }
///
/// coordinator.turn_on()?;
/// ```
pub struct Coordinator {
    params: ConnectionParams,
    connector: Arc<dyn Connector>,
    store: SnapshotStore<DeviceSnapshot>,
    /// Refresh cycles currently in flight
    refreshing: AtomicUsize,
    update_interval: Duration,
}

impl Coordinator {
    pub fn new(params: ConnectionParams, connector: Arc<dyn Connector>) -> Self {
        Self {
            params,
            connector,
            store: SnapshotStore::new(),
            refreshing: AtomicUsize::new(0),
            update_interval: SCAN_INTERVAL,
        }
    }

    /// Override the polling interval (mainly for tests)
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.store.current()
    }

    /// Whether the last refresh succeeded
    pub fn last_update_success(&self) -> bool {
        self.store.last_update_success()
    }

    pub fn status(&self) -> CoordinatorStatus {
        if self.refreshing.load(Ordering::SeqCst) > 0 {
            CoordinatorStatus::Refreshing
        } else if self.store.last_update_success() {
            CoordinatorStatus::Available
        } else if self.store.last_error().is_some() {
            CoordinatorStatus::Unavailable
        } else {
            CoordinatorStatus::Unknown
        }
    }

    /// New listener for snapshot updates and render requests
    ///
    /// Each listener sees every event emitted after it subscribed.
    pub fn updates(&self) -> UpdateListener {
        self.store.subscribe()
    }

    /// Ask listeners to re-render one entity from the current snapshot
    pub fn request_render(&self, entity_id: &str) {
        self.store.request_render(entity_id);
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Run one refresh cycle and publish the result
    ///
    /// On failure the previous snapshot stays current and the store records
    /// the failed update.
    pub fn refresh(&self) -> Result<Arc<DeviceSnapshot>> {
        self.refreshing.fetch_add(1, Ordering::SeqCst);
        let was_available = self.store.last_update_success();
        let result = self.fetch();
        self.refreshing.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(snapshot) => {
                if !was_available && self.store.generation() > 0 {
                    info!("Fetching {} data recovered", self.params.host());
                }
                debug!(
                    host = self.params.host(),
                    power = %snapshot.power_state,
                    "Refreshed projector"
                );
                Ok(self.store.publish(snapshot))
            }
            Err(err) => {
                if was_available {
                    warn!("Error fetching {} data: {}", self.params.host(), err);
                } else {
                    debug!("Error fetching {} data: {}", self.params.host(), err);
                }
                self.store.fail(err.to_string());
                Err(err)
            }
        }
    }

    fn fetch(&self) -> Result<DeviceSnapshot> {
        let mut session = self.session()?;

        let manufacturer = session.get_manufacturer()?;
        let product_name = session.get_product_name()?;
        let power_state = session.get_power()?;

        let input = optional("input", session.get_input());
        let inputs = optional("inputs", session.get_inputs());
        let lamps = optional("lamps", session.get_lamps()).unwrap_or_default();
        let errors = optional("errors", session.get_errors()).unwrap_or_default();
        let mute = optional("mute", session.get_mute());

        drop(session);

        let mut lamp_state = BTreeMap::new();
        let mut lamp_hours = BTreeMap::new();
        for (index, lamp) in (1u8..).zip(lamps) {
            lamp_state.insert(index, lamp.on);
            lamp_hours.insert(index, lamp.hours);
        }

        Ok(DeviceSnapshot {
            device_id: self.params.host().to_string(),
            name: self.params.name().to_string(),
            manufacturer,
            product_name,
            power: has_power(power_state),
            power_state,
            input,
            inputs,
            lamps: lamp_state,
            lamp_hours,
            errors,
            audio_mute: mute.map(|m| m.audio),
            video_mute: mute.map(|m| m.video),
        })
    }

    fn session(&self) -> Result<Session> {
        Session::open(self.connector.as_ref(), &self.params)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Switch the projector on unless it already has power
    pub fn turn_on(&self) -> Result<()> {
        self.set_power(true)
    }

    /// Switch the projector off unless it is already without power
    pub fn turn_off(&self) -> Result<()> {
        self.set_power(false)
    }

    fn set_power(&self, on: bool) -> Result<()> {
        let mut session = self.session()?;
        let state = session.get_power()?;

        if has_power(state) == on {
            debug!("Projector {} already {}, not sending power command", self.params.host(), state);
            return Ok(());
        }

        let target = if on { PowerState::On } else { PowerState::Off };
        session.set_power(target)?;
        info!("Projector {} power set to {}", self.params.host(), target);
        Ok(())
    }

    /// Mute (true) or unmute (false) audio
    pub fn mute_volume(&self, muted: bool) -> Result<()> {
        self.set_mute(MuteChannel::Audio, muted)
    }

    /// Mute (true) or unmute (false) video
    pub fn mute_video(&self, muted: bool) -> Result<()> {
        self.set_mute(MuteChannel::Video, muted)
    }

    fn set_mute(&self, channel: MuteChannel, muted: bool) -> Result<()> {
        let mut session = self.session()?;
        session.set_mute(channel, muted)?;
        debug!("Projector {} {:?} mute set to {}", self.params.host(), channel, muted);
        Ok(())
    }

    /// Select the input whose display label is `label`
    ///
    /// The label is resolved against the latest snapshot, which may lag
    /// behind the projector.
    pub fn select_source(&self, label: &str) -> Result<()> {
        let snapshot = self.snapshot().ok_or(CoordinatorError::NoSnapshot)?;
        let input = snapshot
            .find_source(label)
            .cloned()
            .ok_or_else(|| CoordinatorError::UnknownSource(label.to_string()))?;

        let mut session = self.session()?;
        session.set_input(&input)?;
        debug!(
            "Projector {} input set to {}",
            self.params.host(),
            format_input_source(&input)
        );
        Ok(())
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("params", &self.params)
            .field("status", &self.status())
            .field("update_interval", &self.update_interval)
            .finish()
    }
}

/// Degrade a failed optional read to `None`
fn optional<T>(field: &'static str, result: pjlink_client::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(field, error = %err, "Projector did not report field");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pjlink_client::mock::{Call, Failure, MockConnector, MockDevice, Op};
    use pjlink_client::{InputSource, ProjectorFault};

    fn coordinator() -> (Coordinator, MockDevice) {
        let connector = MockConnector::default();
        let device = connector.device().clone();
        let params = ConnectionParams::new("192.168.1.40", 4352, "Beamer", "utf-8", None);
        (Coordinator::new(params, Arc::new(connector)), device)
    }

    #[test]
    fn test_initial_status_unknown() {
        let (coordinator, _) = coordinator();
        assert_eq!(coordinator.status(), CoordinatorStatus::Unknown);
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.update_interval(), SCAN_INTERVAL);
    }

    #[test]
    fn test_overlapping_refreshes_stay_refreshing_until_last_ends() {
        use std::sync::{mpsc, Mutex};

        let inner = MockConnector::default();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let gate = Mutex::new(Some((entered_tx, release_rx)));
        // The first connect parks until released; later ones pass through
        let connector = move |host: &str, port: u16, encoding: &str| {
            let pending = gate.lock().unwrap().take();
            if let Some((entered, release)) = pending {
                entered.send(()).unwrap();
                release.recv().unwrap();
            }
            inner.connect(host, port, encoding)
        };
        let params = ConnectionParams::new("192.168.1.40", 4352, "Beamer", "utf-8", None);
        let coordinator = Coordinator::new(params, Arc::new(connector));

        std::thread::scope(|scope| {
            let slow = scope.spawn(|| coordinator.refresh());
            entered_rx.recv().unwrap();

            coordinator.refresh().unwrap();
            assert_eq!(coordinator.status(), CoordinatorStatus::Refreshing);

            release_tx.send(()).unwrap();
            slow.join().unwrap().unwrap();
        });

        assert_eq!(coordinator.status(), CoordinatorStatus::Available);
    }

    #[test]
    fn test_refresh_reads_in_order_and_closes() {
        let (coordinator, device) = coordinator();

        coordinator.refresh().unwrap();

        assert_eq!(
            device.calls(),
            vec![
                Call::Connect {
                    host: "192.168.1.40".to_string(),
                    port: 4352,
                    encoding: "utf-8".to_string()
                },
                Call::Authenticate(None),
                Call::GetManufacturer,
                Call::GetProductName,
                Call::GetPower,
                Call::GetInput,
                Call::GetInputs,
                Call::GetLamps,
                Call::GetErrors,
                Call::GetMute,
                Call::Close,
            ]
        );
        assert_eq!(device.open_sessions(), 0);
        assert_eq!(coordinator.status(), CoordinatorStatus::Available);
    }

    #[test]
    fn test_mandatory_read_failure_fails_refresh() {
        let (coordinator, device) = coordinator();
        device.fail(Op::GetProductName, Failure::Fault(ProjectorFault::ProjectorFailure));

        let err = coordinator.refresh().unwrap_err();

        assert!(matches!(err, CoordinatorError::Device(_)));
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.status(), CoordinatorStatus::Unavailable);
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_authentication_failure_is_device_error() {
        let (coordinator, device) = coordinator();
        device.fail(Op::Authenticate, Failure::Authentication);

        let err = coordinator.refresh().unwrap_err();

        assert!(matches!(err, CoordinatorError::Device(_)));
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_lamp_hours_indexed_from_one() {
        let (coordinator, device) = coordinator();
        device.update(|s| {
            s.lamps = vec![
                pjlink_client::LampStatus { hours: 10, on: true },
                pjlink_client::LampStatus { hours: 20, on: false },
            ]
        });

        let snapshot = coordinator.refresh().unwrap();

        assert_eq!(snapshot.lamps, BTreeMap::from([(1, true), (2, false)]));
        assert_eq!(snapshot.lamp_hours, BTreeMap::from([(1, 10), (2, 20)]));
    }

    #[test]
    fn test_turn_off_guarded() {
        let (coordinator, device) = coordinator();

        coordinator.turn_off().unwrap();
        assert_eq!(device.count(|c| matches!(c, Call::SetPower(PowerState::Off))), 1);

        coordinator.turn_off().unwrap();
        assert_eq!(device.count(|c| matches!(c, Call::SetPower(_))), 1);
    }

    #[test]
    fn test_turn_on_while_cooling_surfaces_busy_projector() {
        let (coordinator, device) = coordinator();
        device.update(|s| s.power = PowerState::Cooling);

        let err = coordinator.turn_on().unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Device(pjlink_client::ClientError::Protocol(
                ProjectorFault::UnavailableTime
            ))
        ));
        assert_eq!(device.count(|c| *c == Call::SetPower(PowerState::On)), 1);
        assert_eq!(device.state().power, PowerState::Cooling);
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_turn_on_while_warming_is_noop() {
        let (coordinator, device) = coordinator();
        device.update(|s| s.power = PowerState::WarmUp);

        coordinator.turn_on().unwrap();

        assert_eq!(device.count(|c| matches!(c, Call::SetPower(_))), 0);
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_mute_commands_unconditional() {
        let (coordinator, device) = coordinator();

        coordinator.mute_volume(false).unwrap();
        coordinator.mute_video(true).unwrap();

        assert_eq!(
            device.count(|c| matches!(c, Call::SetMute(..))),
            2
        );
        assert!(device.calls().contains(&Call::SetMute(MuteChannel::Audio, false)));
        assert!(device.calls().contains(&Call::SetMute(MuteChannel::Video, true)));
        assert!(device.state().mute.video);
    }

    #[test]
    fn test_select_source_requires_snapshot() {
        let (coordinator, device) = coordinator();

        let err = coordinator.select_source("RGB 1").unwrap_err();

        assert!(matches!(err, CoordinatorError::NoSnapshot));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_select_source_unknown_label() {
        let (coordinator, device) = coordinator();
        coordinator.refresh().unwrap();
        device.clear_calls();

        let err = coordinator.select_source("HDMI 7").unwrap_err();

        assert!(matches!(err, CoordinatorError::UnknownSource(ref l) if l == "HDMI 7"));
        // Lookup fails before any session is opened
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_select_source_sends_resolved_input() {
        let (coordinator, device) = coordinator();
        coordinator.refresh().unwrap();

        coordinator.select_source("DIGITAL 1").unwrap();

        assert!(device
            .calls()
            .contains(&Call::SetInput(InputSource::new("DIGITAL", "1"))));
        assert_eq!(device.state().input, InputSource::new("DIGITAL", "1"));
    }

    #[test]
    fn test_command_connectivity_failure_propagates() {
        let (coordinator, device) = coordinator();
        device.fail(Op::Connect, Failure::Refused);

        let err = coordinator.mute_volume(true).unwrap_err();

        assert!(err.is_unavailable());
        assert!(!device.calls().iter().any(|c| matches!(c, Call::SetMute(..))));
    }

    #[test]
    fn test_render_request_reaches_listener() {
        let (coordinator, _) = coordinator();
        let updates = coordinator.updates();

        coordinator.request_render("192.168.1.40");

        let event = updates.try_recv().unwrap();
        assert_eq!(
            event.kind,
            snapshot_store::UpdateKind::RenderRequested {
                entity_id: "192.168.1.40".to_string()
            }
        );
    }
}
