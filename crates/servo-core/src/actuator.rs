//! Actuator channels and the servo bank.
//!
//! A servo bank is a fixed, statically-sized set of actuator channels built
//! once by the composition root. Each channel sits behind its own mutex so a
//! write only ever serializes against other writes to the same channel.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, trace};

/// Number of servo channels wired on the node.
pub const SERVO_COUNT: usize = 3;

/// Largest accepted servo position, in degrees.
pub const MAX_POSITION: u8 = 180;

/// Errors reported by an actuator driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The underlying peripheral refused the write.
    #[error("actuator driver rejected write: {0}")]
    Rejected(String),
}

/// A single position-controlled output.
///
/// Writes are fire-and-forget: returning `Ok` means the driver accepted the
/// command, not that the horn physically reached the position.
pub trait ActuatorDriver: Send {
    /// Command the output to `degrees` (0..=180).
    fn write(&mut self, degrees: u8) -> Result<(), DriverError>;
}

impl<D: ActuatorDriver + ?Sized> ActuatorDriver for Box<D> {
    fn write(&mut self, degrees: u8) -> Result<(), DriverError> {
        (**self).write(degrees)
    }
}

/// One addressable servo and its last commanded position.
#[derive(Debug)]
pub struct ActuatorChannel<D> {
    index: usize,
    driver: D,
    position: Option<u8>,
}

impl<D: ActuatorDriver> ActuatorChannel<D> {
    fn new(index: usize, driver: D) -> Self {
        Self {
            index,
            driver,
            position: None,
        }
    }

    /// Channel index within the bank.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Last successfully written position, `None` until the first move.
    pub fn position(&self) -> Option<u8> {
        self.position
    }

    /// Write `degrees` to the driver and record it on success.
    fn write(&mut self, degrees: u8) -> Result<(), DriverError> {
        self.driver.write(degrees)?;
        self.position = Some(degrees);
        Ok(())
    }
}

/// Fixed-size collection of actuator channels, indexed `0..N`.
pub struct ServoBank<D, const N: usize = SERVO_COUNT> {
    channels: [Mutex<ActuatorChannel<D>>; N],
}

impl<D: ActuatorDriver, const N: usize> ServoBank<D, N> {
    /// Bind each driver to the channel matching its array position.
    pub fn new(drivers: [D; N]) -> Self {
        let mut index = 0;
        let channels = drivers.map(|driver| {
            let channel = Mutex::new(ActuatorChannel::new(index, driver));
            index += 1;
            channel
        });
        debug!("Servo bank ready with {} channels", N);
        Self { channels }
    }

    /// Number of channels in the bank.
    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Move channel `index` to `degrees`.
    ///
    /// Callers validate the range first; an index outside the bank is a
    /// logic error and panics like slice indexing does.
    pub fn move_to(&self, index: usize, degrees: u8) -> Result<(), DriverError> {
        debug_assert!(degrees <= MAX_POSITION);
        let mut channel = self.lock(index);
        trace!(channel = index, degrees, "Writing servo position");
        channel.write(degrees)
    }

    /// Last recorded position of channel `index`.
    pub fn position(&self, index: usize) -> Option<u8> {
        self.channels
            .get(index)
            .and_then(|_| self.lock(index).position())
    }

    /// Snapshot of every channel's recorded position.
    pub fn positions(&self) -> [Option<u8>; N] {
        std::array::from_fn(|index| self.lock(index).position())
    }

    // A poisoned channel still holds a consistent position: the driver write
    // and the position update happen without intermediate state.
    fn lock(&self, index: usize) -> MutexGuard<'_, ActuatorChannel<D>> {
        self.channels[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host-side stand-in for a servo: records and logs each write.
#[derive(Debug, Default, Clone)]
pub struct SimulatedServo {
    label: String,
    writes: usize,
}

impl SimulatedServo {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            writes: 0,
        }
    }

    /// Number of writes the simulated servo has accepted.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ActuatorDriver for SimulatedServo {
    fn write(&mut self, degrees: u8) -> Result<(), DriverError> {
        self.writes += 1;
        debug!(servo = %self.label, degrees, "Simulated servo moved");
        Ok(())
    }
}
