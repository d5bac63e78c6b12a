//! Scripted in-memory projector for tests
//!
//! [`MockConnector`] hands out sessions that all share one [`MockDevice`].
//! Tests mutate the device between refreshes, inject failures per
//! operation and inspect the call log afterwards.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    ClientError, Connector, ErrorSeverity, InputSource, LampStatus, MuteChannel, MuteState,
    PowerState, Projector, ProjectorFault, Result,
};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Connect,
    Authenticate,
    GetManufacturer,
    GetProductName,
    GetPower,
    SetPower,
    GetInput,
    SetInput,
    GetInputs,
    GetLamps,
    GetErrors,
    GetMute,
    SetMute,
}

/// Kind of error an injected failure produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    Refused,
    Authentication,
    Fault(ProjectorFault),
}

impl Failure {
    fn to_error(self, op: Op) -> ClientError {
        match self {
            Failure::Timeout => ClientError::Timeout(format!("{:?}", op)),
            Failure::Refused => ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{:?} refused", op),
            )),
            Failure::Authentication => ClientError::Authentication,
            Failure::Fault(fault) => ClientError::Protocol(fault),
        }
    }
}

/// A recorded call against the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect { host: String, port: u16, encoding: String },
    Authenticate(Option<String>),
    GetManufacturer,
    GetProductName,
    GetPower,
    SetPower(PowerState),
    GetInput,
    SetInput(InputSource),
    GetInputs,
    GetLamps,
    GetErrors,
    GetMute,
    SetMute(MuteChannel, bool),
    Close,
}

/// State of the simulated projector
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub manufacturer: String,
    pub product_name: String,
    pub power: PowerState,
    pub input: InputSource,
    pub inputs: Vec<InputSource>,
    pub lamps: Vec<LampStatus>,
    pub errors: BTreeMap<String, ErrorSeverity>,
    pub mute: MuteState,
}

impl Default for DeviceState {
    fn default() -> Self {
        let inputs = vec![
            InputSource::new("RGB", "1"),
            InputSource::new("VIDEO", "2"),
            InputSource::new("DIGITAL", "1"),
        ];
        let errors = crate::ERROR_SUBSYSTEMS
            .iter()
            .map(|name| (name.to_string(), ErrorSeverity::Ok))
            .collect();

        Self {
            manufacturer: "EPSON".to_string(),
            product_name: "EB-W05".to_string(),
            power: PowerState::On,
            input: inputs[0].clone(),
            inputs,
            lamps: vec![LampStatus { hours: 1200, on: true }],
            errors,
            mute: MuteState::default(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: DeviceState,
    failing: HashMap<Op, Failure>,
    calls: Vec<Call>,
    open_sessions: usize,
}

/// Shared handle to the simulated projector
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    inner: Arc<Mutex<Inner>>,
}

impl MockDevice {
    pub fn new(state: DeviceState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                ..Inner::default()
            })),
        }
    }

    /// Mutate the simulated device state
    pub fn update(&self, f: impl FnOnce(&mut DeviceState)) {
        f(&mut self.inner.lock().state);
    }

    pub fn state(&self) -> DeviceState {
        self.inner.lock().state.clone()
    }

    /// Make `op` fail with `failure` until [`MockDevice::heal`] is called
    pub fn fail(&self, op: Op, failure: Failure) {
        self.inner.lock().failing.insert(op, failure);
    }

    pub fn heal(&self, op: Op) {
        self.inner.lock().failing.remove(&op);
    }

    pub fn heal_all(&self) {
        self.inner.lock().failing.clear();
    }

    /// Every call recorded so far, across sessions
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Count recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Sessions connected but not yet closed
    pub fn open_sessions(&self) -> usize {
        self.inner.lock().open_sessions
    }

    fn record(&self, call: Call, op: Op) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        match inner.failing.get(&op) {
            Some(failure) => Err(failure.to_error(op)),
            None => Ok(()),
        }
    }
}

/// Connector whose sessions all talk to one [`MockDevice`]
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    device: MockDevice,
}

impl MockConnector {
    pub fn new(device: MockDevice) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &MockDevice {
        &self.device
    }
}

impl Connector for MockConnector {
    fn connect(&self, host: &str, port: u16, encoding: &str) -> Result<Box<dyn Projector>> {
        self.device.record(
            Call::Connect {
                host: host.to_string(),
                port,
                encoding: encoding.to_string(),
            },
            Op::Connect,
        )?;
        self.device.inner.lock().open_sessions += 1;

        Ok(Box::new(MockSession {
            device: self.device.clone(),
            closed: false,
        }))
    }
}

struct MockSession {
    device: MockDevice,
    closed: bool,
}

impl MockSession {
    fn read<T>(&self, call: Call, op: Op, f: impl FnOnce(&DeviceState) -> T) -> Result<T> {
        self.device.record(call, op)?;
        Ok(f(&self.device.inner.lock().state))
    }

    fn write(&self, call: Call, op: Op, f: impl FnOnce(&mut DeviceState) -> Result<()>) -> Result<()> {
        self.device.record(call, op)?;
        f(&mut self.device.inner.lock().state)
    }
}

impl Projector for MockSession {
    fn authenticate(&mut self, password: Option<&str>) -> Result<()> {
        self.device
            .record(Call::Authenticate(password.map(str::to_string)), Op::Authenticate)
    }

    fn get_manufacturer(&mut self) -> Result<String> {
        self.read(Call::GetManufacturer, Op::GetManufacturer, |s| s.manufacturer.clone())
    }

    fn get_product_name(&mut self) -> Result<String> {
        self.read(Call::GetProductName, Op::GetProductName, |s| s.product_name.clone())
    }

    fn get_power(&mut self) -> Result<PowerState> {
        self.read(Call::GetPower, Op::GetPower, |s| s.power)
    }

    fn set_power(&mut self, state: PowerState) -> Result<()> {
        self.write(Call::SetPower(state), Op::SetPower, |s| match (s.power, state) {
            // Real projectors answer ERR3 until a power transition is over
            (PowerState::Cooling | PowerState::WarmUp, _) => {
                Err(ClientError::Protocol(ProjectorFault::UnavailableTime))
            }
            (_, PowerState::On | PowerState::Off) => {
                s.power = state;
                Ok(())
            }
            _ => Err(ClientError::Protocol(ProjectorFault::OutOfParameter)),
        })
    }

    fn get_input(&mut self) -> Result<InputSource> {
        self.read(Call::GetInput, Op::GetInput, |s| s.input.clone())
    }

    fn set_input(&mut self, input: &InputSource) -> Result<()> {
        self.write(Call::SetInput(input.clone()), Op::SetInput, |s| {
            if s.inputs.contains(input) {
                s.input = input.clone();
                Ok(())
            } else {
                Err(ClientError::Protocol(ProjectorFault::OutOfParameter))
            }
        })
    }

    fn get_inputs(&mut self) -> Result<Vec<InputSource>> {
        self.read(Call::GetInputs, Op::GetInputs, |s| s.inputs.clone())
    }

    fn get_lamps(&mut self) -> Result<Vec<LampStatus>> {
        self.read(Call::GetLamps, Op::GetLamps, |s| s.lamps.clone())
    }

    fn get_errors(&mut self) -> Result<BTreeMap<String, ErrorSeverity>> {
        self.read(Call::GetErrors, Op::GetErrors, |s| s.errors.clone())
    }

    fn get_mute(&mut self) -> Result<MuteState> {
        self.read(Call::GetMute, Op::GetMute, |s| s.mute)
    }

    fn set_mute(&mut self, channel: MuteChannel, muted: bool) -> Result<()> {
        self.write(Call::SetMute(channel, muted), Op::SetMute, |s| {
            match channel {
                MuteChannel::Audio => s.mute.audio = muted,
                MuteChannel::Video => s.mute.video = muted,
            }
            Ok(())
        })
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let mut inner = self.device.inner.lock();
        inner.calls.push(Call::Close);
        inner.open_sessions = inner.open_sessions.saturating_sub(1);
    }
}
