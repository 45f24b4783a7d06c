//! Serial connection settings.

use std::time::Duration;

/// Default baud rate of the instrument's USB serial port.
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Default time to wait for a complete reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// How to reach the instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Serial port name; `None` auto-detects the instrument
    pub port: Option<String>,

    /// Baud rate
    pub baudrate: u32,

    /// Maximum wait for a reply
    pub timeout: Duration,

    /// Log every serial exchange to stderr
    pub debug: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            port: None,
            baudrate: DEFAULT_BAUDRATE,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connect_options() {
        let options = ConnectOptions::default();

        assert!(options.port.is_none());
        assert_eq!(options.baudrate, 115_200);
        assert_eq!(options.timeout, Duration::from_secs(1));
        assert!(!options.debug);
    }
}
