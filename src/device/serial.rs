//! Serial port backed [`Device`] speaking the instrument's text shell.
//!
//! Each command is written as `<command>\r`. The instrument echoes the
//! command line, prints its reply and finishes with the `ch> ` prompt.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use serialport::{ClearBuffer, SerialPort, SerialPortType};

use super::Device;
use super::log::{Field, debug};
use crate::config::ConnectOptions;

/// Shell prompt that terminates every reply.
const PROMPT: &[u8] = b"ch> ";

/// USB vendor/product id of the instrument's virtual COM port.
const USB_VID: u16 = 0x0483;
const USB_PID: u16 = 0x5740;

/// A connected instrument.
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
    port_name: String,
    timeout: Duration,
    debug: bool,
}

impl fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialDevice")
            .field("port_name", &self.port_name)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl SerialDevice {
    /// Open the configured port, or the first detected instrument when no
    /// port name is given.
    ///
    /// # Errors
    ///
    /// Returns an error if no instrument can be found or the port cannot be
    /// opened.
    pub fn open(options: &ConnectOptions) -> Result<Self> {
        let port_name = match &options.port {
            Some(name) => name.clone(),
            None => Self::find_port()?,
        };

        if options.debug {
            debug(
                "open port",
                &[
                    ("port", Field::Text(&port_name)),
                    ("baudrate", Field::Number(u64::from(options.baudrate))),
                ],
            );
        }

        let port = serialport::new(&port_name, options.baudrate)
            .timeout(options.timeout)
            .open()
            .with_context(|| format!("Failed to open port '{port_name}'"))?;

        port.clear(ClearBuffer::All)
            .with_context(|| format!("Failed to clear buffers of '{port_name}'"))?;

        Ok(Self {
            port,
            port_name,
            timeout: options.timeout,
            debug: options.debug,
        })
    }

    /// Find the first USB serial port with the instrument's VID/PID.
    ///
    /// # Errors
    ///
    /// Returns an error if ports cannot be enumerated or none matches.
    pub fn find_port() -> Result<String> {
        let ports = serialport::available_ports().context("Could not enumerate serial ports")?;

        ports
            .into_iter()
            .find(|p| matches!(&p.port_type, SerialPortType::UsbPort(usb) if usb.vid == USB_VID && usb.pid == USB_PID))
            .map(|p| p.port_name)
            .ok_or_else(|| anyhow!("No tinySA device found, use --device to select a port"))
    }

    fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 512];

        while !buffer.ends_with(PROMPT) {
            if Instant::now() > deadline {
                bail!("timed out waiting for prompt on '{}'", self.port_name);
            }

            match self.port.read(&mut chunk) {
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => {}
                Err(e) => return Err(e).context("Failed to read from device"),
            }
        }

        Ok(buffer)
    }
}

impl Device for SerialDevice {
    fn send_command(&mut self, command: &str) -> Result<String> {
        let reply = self.send_command_bytes(command)?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }

    fn send_command_bytes(&mut self, command: &str) -> Result<Vec<u8>> {
        if self.debug {
            debug("tx", &[("cmd", Field::Text(command))]);
        }

        self.port
            .write_all(format!("{command}\r").as_bytes())
            .with_context(|| format!("Failed to send '{command}'"))?;

        let raw = self.read_until_prompt()?;

        if self.debug {
            debug(
                "rx",
                &[
                    ("len", Field::Number(raw.len() as u64)),
                    ("data", Field::Bytes(&raw)),
                ],
            );
        }

        Ok(strip_echo_and_prompt(&raw).to_vec())
    }

    fn send_final_command(&mut self, command: &str) -> Result<()> {
        if self.debug {
            debug("tx", &[("cmd", Field::Text(command))]);
        }

        self.port
            .write_all(format!("{command}\r").as_bytes())
            .with_context(|| format!("Failed to send '{command}'"))?;
        self.port.flush().context("Failed to flush serial port")
    }
}

/// Drop the echoed command line and the trailing prompt from a raw reply.
fn strip_echo_and_prompt(raw: &[u8]) -> &[u8] {
    let body = raw.strip_suffix(PROMPT).unwrap_or(raw);

    body.windows(2)
        .position(|w| w == b"\r\n")
        .map_or(&body[body.len()..], |i| &body[i + 2..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_echo_and_prompt() {
        assert_eq!(
            strip_echo_and_prompt(b"sweep\r\n0 350000000 450\r\nch> "),
            b"0 350000000 450\r\n"
        );
        assert_eq!(strip_echo_and_prompt(b"pause\r\nch> "), b"");
        assert_eq!(strip_echo_and_prompt(b"ch> "), b"");
    }

    #[test]
    fn test_strip_keeps_binary_payload() {
        let raw = [b"capture\r\n".as_slice(), &[0x00, 0x0d, 0xff], b"ch> "].concat();
        assert_eq!(strip_echo_and_prompt(&raw), &[0x00u8, 0x0d, 0xff]);
    }
}
