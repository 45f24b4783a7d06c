//! Command implementations.
//!
//! Every command turns its flags into an ordered list of [`Operation`]s and
//! applies them one after another against a single device connection. The
//! connection is opened lazily so commands that only print usage never touch
//! the serial port.

pub mod args;
pub mod device;
pub mod level;
pub mod marker;
pub mod menu;
pub mod preset;
pub mod raw;
pub mod save;
pub mod signal;
pub mod sweep;
pub mod trace;

use std::fmt;
use std::io::Write;

use anyhow::{Result, anyhow};

use crate::config::RunOptions;
use crate::device::Device;

pub use args::{FrequencyArg, MarkerDelta};

/// One step of a command, applied in declaration order.
pub type Operation<'a> = Box<dyn Fn(&mut dyn Device, &mut dyn Write) -> Result<()> + 'a>;

/// Box a closure as an [`Operation`].
pub fn step<'a>(
    operation: impl Fn(&mut dyn Device, &mut dyn Write) -> Result<()> + 'a,
) -> Operation<'a> {
    Box::new(operation)
}

/// Opens a device on first use.
pub type Connector<'c> = Box<dyn FnMut() -> Result<Box<dyn Device>> + 'c>;

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran.
    Done,

    /// Nothing to do with the given flags; the caller should print usage.
    Usage,
}

/// A lazily opened device connection shared by the operations of a command.
pub struct Session<'c> {
    connect: Connector<'c>,
    device: Option<Box<dyn Device>>,
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.device.is_some())
            .finish_non_exhaustive()
    }
}

impl<'c> Session<'c> {
    /// Create a session that calls `connect` the first time a device is needed.
    #[must_use]
    pub fn new(connect: Connector<'c>) -> Self {
        Self {
            connect,
            device: None,
        }
    }

    /// Whether the device has been opened.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    /// The connected device, opening it on first call.
    ///
    /// # Errors
    ///
    /// Returns the connector's error if the device cannot be opened.
    pub fn device(&mut self) -> Result<&mut dyn Device> {
        if self.device.is_none() {
            self.device = Some((self.connect)()?);
        }

        match self.device.as_deref_mut() {
            Some(device) => Ok(device),
            None => Err(anyhow!("device connection unavailable")),
        }
    }
}

/// A CLI command that can run against a session.
pub trait Command {
    /// Run the command, writing human-readable output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first error from connecting or from any operation.
    fn run(&self, session: &mut Session<'_>, out: &mut dyn Write, options: &RunOptions)
    -> Result<Outcome>;
}

/// Apply operations in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the connector's error or the first failing operation's error.
pub fn apply(operations: &[Operation<'_>], session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let device = session.device()?;
    for operation in operations {
        operation(&mut *device, &mut *out)?;
    }
    Ok(())
}
