//! Instrument capability interface and data model.
//!
//! The [`Device`] trait is the single seam between the command layer and the
//! instrument. Implementors only provide [`Device::send_command`]; every
//! higher-level operation is a provided method that encodes a text shell
//! command and parses the reply into a typed value. Binary replies (screen
//! captures) go through [`Device::send_command_bytes`].

pub mod log;
pub mod serial;

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use serde::Serialize;

use crate::utils::format_seconds;

pub use serial::SerialDevice;

/// Current sweep range of the instrument, in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sweep {
    /// First swept frequency.
    pub start: u64,

    /// Last swept frequency.
    pub stop: u64,

    /// Number of measurement points across the range.
    pub points: u32,
}

impl Sweep {
    /// Width of the sweep range.
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    /// Midpoint of the sweep range.
    #[must_use]
    pub const fn center(&self) -> u64 {
        self.start + self.span() / 2
    }

    /// Whether the instrument sits on a single frequency (zero span).
    #[must_use]
    pub const fn is_continuous_wave(&self) -> bool {
        self.start == self.stop
    }
}

/// Whether the sweep is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    /// Sweeping continuously.
    Resumed,

    /// Frozen on the last sweep.
    Paused,
}

impl fmt::Display for SweepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resumed => write!(f, "Resumed"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Input/output path and band the instrument sweeps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepMode {
    /// Low band, spectrum analyzer input
    LowInput,

    /// Low band, signal generator output
    LowOutput,

    /// High band, spectrum analyzer input
    HighInput,

    /// High band, signal generator output
    HighOutput,
}

impl SweepMode {
    const fn shell_args(self) -> &'static str {
        match self {
            Self::LowInput => "low input",
            Self::LowOutput => "low output",
            Self::HighInput => "high input",
            Self::HighOutput => "high output",
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shell_args())
    }
}

/// An active marker as reported by the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    /// Marker number (1-based).
    pub id: u32,

    /// Sweep point the marker sits on.
    pub index: u32,

    /// Marker frequency in hertz.
    pub frequency: u64,

    /// Measured level at the marker, in the current trace unit.
    pub value: f64,
}

/// An active trace as reported by the instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Trace number (1-based).
    pub id: u32,

    /// Display unit, e.g. `dBm`.
    pub unit: String,

    /// Reference level position.
    pub ref_pos: f64,

    /// Vertical scale per division.
    pub scale: f64,
}

/// One measured point of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceData {
    /// Trace the point belongs to.
    pub trace: u32,

    /// Point index within the sweep.
    pub point: u32,

    /// Frequency of the point in hertz.
    pub frequency: u64,

    /// Measured level.
    pub value: f64,
}

/// Level unit for trace display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceUnit {
    #[value(name = "dbm")]
    Dbm,
    #[value(name = "dbmv")]
    DbmV,
    #[value(name = "dbuv")]
    DbuV,
    #[value(name = "v")]
    Volt,
    #[value(name = "w")]
    Watt,
}

impl fmt::Display for TraceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dbm => "dBm",
            Self::DbmV => "dBmV",
            Self::DbuV => "dBuV",
            Self::Volt => "V",
            Self::Watt => "W",
        })
    }
}

/// Calculation applied on top of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceCalc {
    /// No calculation
    Off,
    /// Minimum hold
    Minh,
    /// Maximum hold
    Maxh,
    /// Maximum decay
    Maxd,
    /// Average over 4 sweeps
    Aver4,
    /// Average over 16 sweeps
    Aver16,
    /// Quasi-peak
    Quasip,
}

impl fmt::Display for TraceCalc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Minh => "minh",
            Self::Maxh => "maxh",
            Self::Maxd => "maxd",
            Self::Aver4 => "aver4",
            Self::Aver16 => "aver16",
            Self::Quasip => "quasip",
        })
    }
}

/// Spur removal setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpurRemoval {
    On,
    Off,
    Auto,
}

impl fmt::Display for SpurRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Auto => "auto",
        })
    }
}

/// Firmware and hardware identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Model name, e.g. `tinySA4`.
    pub model: String,

    /// Full firmware version string.
    pub firmware: String,

    /// Hardware revision, empty when the firmware does not report it.
    pub hardware: String,
}

/// Width of the instrument's display in pixels.
pub const SCREEN_WIDTH: u32 = 320;

/// Height of the instrument's display in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

/// A decoded screen capture, 8-bit RGB, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Screen {
    /// Decode a big-endian RGB565 frame of `width × height` pixels.
    ///
    /// Bytes past the frame are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `frame` holds fewer bytes than the frame needs.
    pub fn from_rgb565(frame: &[u8], width: u32, height: u32) -> Result<Self> {
        let pixels = width as usize * height as usize;
        let Some(frame) = frame.get(..pixels * 2) else {
            bail!(
                "capture returned {} bytes, expected {}",
                frame.len(),
                pixels * 2
            );
        };

        let rgb = frame
            .chunks_exact(2)
            .flat_map(|pair| {
                let (high, low) = (pair[0], pair[1]);
                [
                    high & 0xf8,
                    ((high & 0x07) << 5) | ((low & 0xe0) >> 3),
                    (low & 0x1f) << 3,
                ]
            })
            .collect();

        Ok(Self { width, height, rgb })
    }
}

/// Capability interface to a connected instrument.
///
/// Only [`send_command`](Device::send_command) must be implemented. It sends
/// one shell command and returns the reply with the command echo and prompt
/// removed.
pub trait Device {
    /// Send a shell command and return its reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be written or no complete reply
    /// arrives.
    fn send_command(&mut self, command: &str) -> Result<String>;

    /// Send a shell command and return its reply as raw bytes.
    ///
    /// Transports that can carry binary replies override this; the default
    /// goes through [`send_command`](Device::send_command).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be written or no complete reply
    /// arrives.
    fn send_command_bytes(&mut self, command: &str) -> Result<Vec<u8>> {
        self.send_command(command).map(String::into_bytes)
    }

    /// Send a command after which the instrument drops the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be written.
    fn send_final_command(&mut self, command: &str) -> Result<()> {
        self.send_command(command).map(|_| ())
    }

    /// Send a command whose only reply is an acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or when the shell reports the command
    /// as unknown (`<command>?`).
    fn execute(&mut self, command: &str) -> Result<()> {
        let reply = self.send_command(command)?;
        check_accepted(command, &reply)
    }

    // ── Sweep ───────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error on I/O failure or an unexpected reply.
    fn sweep(&mut self) -> Result<Sweep> {
        parse_sweep(&self.send_command("sweep")?)
    }

    /// # Errors
    ///
    /// Returns an error on I/O failure or an unexpected reply.
    fn sweep_status(&mut self) -> Result<SweepStatus> {
        let reply = self.send_command("status")?;
        match reply.trim() {
            "Resumed" => Ok(SweepStatus::Resumed),
            "Paused" => Ok(SweepStatus::Paused),
            other => bail!("unexpected sweep status '{other}'"),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn pause_sweep(&mut self) -> Result<()> {
        self.execute("pause")
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn resume_sweep(&mut self) -> Result<()> {
        self.execute("resume")
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_mode(&mut self, mode: SweepMode) -> Result<()> {
        self.execute(&format!("mode {}", mode.shell_args()))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_start(&mut self, hertz: u64) -> Result<()> {
        self.execute(&format!("sweep start {hertz}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_stop(&mut self, hertz: u64) -> Result<()> {
        self.execute(&format!("sweep stop {hertz}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_center(&mut self, hertz: u64) -> Result<()> {
        self.execute(&format!("sweep center {hertz}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_span(&mut self, hertz: u64) -> Result<()> {
        self.execute(&format!("sweep span {hertz}"))
    }

    /// Park the sweep on a single frequency.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_continuous_wave(&mut self, hertz: u64) -> Result<()> {
        self.execute(&format!("sweep cw {hertz}"))
    }

    /// Change the point count while keeping the current range.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep cannot be read or the command is rejected.
    fn set_sweep_points(&mut self, points: u32) -> Result<()> {
        let sweep = self.sweep()?;
        self.execute(&format!("sweep {} {} {points}", sweep.start, sweep.stop))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_sweep_time(&mut self, microseconds: u64) -> Result<()> {
        self.execute(&format!("sweeptime {}", format_seconds(microseconds)))
    }

    // ── Markers ─────────────────────────────────────────────────────────

    /// All active markers.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or an unparsable marker line.
    fn markers(&mut self) -> Result<Vec<Marker>> {
        self.send_command("marker")?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_marker)
            .collect()
    }

    /// A single active marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker list cannot be read or the marker is
    /// not active.
    fn marker(&mut self, id: u32) -> Result<Marker> {
        self.markers()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| anyhow!("marker #{id} is not active"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn enable_marker(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("marker {id} on"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn disable_marker(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("marker {id} off"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_marker_trace(&mut self, id: u32, trace: u32) -> Result<()> {
        self.execute(&format!("marker {id} trace {trace}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_marker_frequency(&mut self, id: u32, hertz: u64) -> Result<()> {
        self.execute(&format!("marker {id} {hertz}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn move_marker_to_peak(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("marker {id} peak"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn enable_marker_delta(&mut self, id: u32, reference: u32) -> Result<()> {
        self.execute(&format!("marker {id} delta {reference}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn disable_marker_delta(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("marker {id} delta off"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_marker_tracking(&mut self, id: u32, enabled: bool) -> Result<()> {
        self.execute(&format!("marker {id} tracking {}", on_off(enabled)))
    }

    // ── Traces ──────────────────────────────────────────────────────────

    /// All active traces.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or an unparsable trace line.
    fn traces(&mut self) -> Result<Vec<Trace>> {
        self.send_command("trace")?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_trace)
            .collect()
    }

    /// A single active trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace list cannot be read or the trace is not
    /// active.
    fn trace(&mut self, id: u32) -> Result<Trace> {
        self.traces()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("trace #{id} is not active"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn enable_trace(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("trace {id} view on"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn disable_trace(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("trace {id} view off"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_trace_calc(&mut self, id: u32, calc: TraceCalc) -> Result<()> {
        self.execute(&format!("calc {id} {calc}"))
    }

    /// Measured points of a trace, paired with the sweep frequencies.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, an unparsable reply, or when the
    /// number of values does not match the number of frequencies.
    fn trace_data(&mut self, id: u32) -> Result<Vec<TraceData>> {
        let frequencies = parse_frequencies(&self.send_command("frequencies")?)?;
        let values = parse_trace_values(&self.send_command(&format!("trace {id} value"))?)?;

        if frequencies.len() != values.len() {
            bail!(
                "trace #{id} has {} values for {} frequencies",
                values.len(),
                frequencies.len()
            );
        }

        Ok(frequencies
            .into_iter()
            .zip(values)
            .map(|(frequency, (point, value))| TraceData {
                trace: id,
                point,
                frequency,
                value,
            })
            .collect())
    }

    // ── Level ───────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_trace_unit(&mut self, unit: TraceUnit) -> Result<()> {
        self.execute(&format!("trace {unit}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_ref_level(&mut self, dbm: i32) -> Result<()> {
        self.execute(&format!("trace reflevel {dbm}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_ref_level_auto(&mut self) -> Result<()> {
        self.execute("trace reflevel auto")
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_trace_scale(&mut self, scale: f64) -> Result<()> {
        self.execute(&format!("trace scale {scale}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_lna(&mut self, enabled: bool) -> Result<()> {
        self.execute(&format!("lna {}", on_off(enabled)))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_spur_removal(&mut self, setting: SpurRemoval) -> Result<()> {
        self.execute(&format!("spur {setting}"))
    }

    // ── Presets ─────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn load_preset(&mut self, slot: u32) -> Result<()> {
        self.execute(&format!("load {slot}"))
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn save_preset(&mut self, slot: u32) -> Result<()> {
        self.execute(&format!("save {slot}"))
    }

    // ── Device ──────────────────────────────────────────────────────────

    /// Reboot the instrument, optionally into DFU bootloader mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be written.
    fn reset(&mut self, dfu: bool) -> Result<()> {
        self.send_final_command(if dfu { "reset dfu" } else { "reset" })
    }

    /// # Errors
    ///
    /// Returns an error on I/O failure or a non-numeric reply.
    fn device_id(&mut self) -> Result<u32> {
        last_number(&self.send_command("deviceid")?)
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_device_id(&mut self, id: u32) -> Result<()> {
        self.execute(&format!("deviceid {id}"))
    }

    /// Battery voltage in millivolts.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or a non-numeric reply.
    fn battery_voltage(&mut self) -> Result<u32> {
        first_number(&self.send_command("vbat")?)
    }

    /// Battery measurement offset in millivolts.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or a non-numeric reply.
    fn battery_offset(&mut self) -> Result<u32> {
        first_number(&self.send_command("vbat_offset")?)
    }

    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn set_battery_offset(&mut self, millivolts: u32) -> Result<()> {
        self.execute(&format!("vbat_offset {millivolts}"))
    }

    /// # Errors
    ///
    /// Returns an error on I/O failure or an empty version reply.
    fn info(&mut self) -> Result<DeviceInfo> {
        parse_version(&self.send_command("version")?)
    }

    /// Grab the current screen contents.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or a short frame.
    fn capture(&mut self) -> Result<Screen> {
        let frame = self.send_command_bytes("capture")?;
        Screen::from_rgb565(&frame, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Press a sequence of menu entries by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument rejects the command.
    fn trigger_menu(&mut self, ids: &[u32]) -> Result<()> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.execute(&format!("menu {}", ids.join(" ")))
    }
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// The shell answers unknown commands with `<command>?`.
fn check_accepted(command: &str, reply: &str) -> Result<()> {
    let reply = reply.trim();
    if reply.ends_with('?') {
        bail!("device rejected command '{command}': {reply}");
    }
    Ok(())
}

fn parse_field<T: FromStr>(token: Option<&str>, what: &str, line: &str) -> Result<T> {
    token
        .and_then(|t| t.parse().ok())
        .with_context(|| format!("invalid {what} in '{}'", line.trim()))
}

/// `<start> <stop> <points>`
fn parse_sweep(reply: &str) -> Result<Sweep> {
    let mut fields = reply.split_whitespace();
    Ok(Sweep {
        start: parse_field(fields.next(), "sweep start", reply)?,
        stop: parse_field(fields.next(), "sweep stop", reply)?,
        points: parse_field(fields.next(), "sweep points", reply)?,
    })
}

/// `<id> <index> <frequency> <value>`
fn parse_marker(line: &str) -> Result<Marker> {
    let mut fields = line.split_whitespace();
    Ok(Marker {
        id: parse_field(fields.next(), "marker id", line)?,
        index: parse_field(fields.next(), "marker index", line)?,
        frequency: parse_field(fields.next(), "marker frequency", line)?,
        value: parse_field(fields.next(), "marker value", line)?,
    })
}

/// `<id>: <unit> <ref pos> <scale>`
fn parse_trace(line: &str) -> Result<Trace> {
    let mut fields = line.split_whitespace();
    let id = fields.next().map(|t| t.trim_end_matches(':'));
    Ok(Trace {
        id: parse_field(id, "trace id", line)?,
        unit: fields
            .next()
            .map(str::to_string)
            .with_context(|| format!("missing trace unit in '{}'", line.trim()))?,
        ref_pos: parse_field(fields.next(), "trace reference position", line)?,
        scale: parse_field(fields.next(), "trace scale", line)?,
    })
}

/// One frequency in hertz per line.
fn parse_frequencies(reply: &str) -> Result<Vec<u64>> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_field(Some(line), "frequency", line))
        .collect()
}

/// `trace <id> value <point> <value>` per line.
fn parse_trace_values(reply: &str) -> Result<Vec<(u32, f64)>> {
    reply
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["trace", _, "value", point, value] => Ok((
                    parse_field(Some(*point), "point index", line)?,
                    parse_field(Some(*value), "trace value", line)?,
                )),
                _ => bail!("unexpected trace value line '{}'", line.trim()),
            }
        })
        .collect()
}

/// First line is the firmware version (`<model>_v<version>`), followed by
/// an optional `HW Version:<rev>` line.
fn parse_version(reply: &str) -> Result<DeviceInfo> {
    let mut lines = reply.lines().map(str::trim).filter(|l| !l.is_empty());
    let firmware = lines
        .next()
        .context("empty version reply")?
        .to_string();
    let model = firmware
        .split_once('_')
        .map_or(firmware.as_str(), |(model, _)| model)
        .to_string();
    let hardware = lines
        .find_map(|l| l.strip_prefix("HW Version:"))
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    Ok(DeviceInfo {
        model,
        firmware,
        hardware,
    })
}

fn first_number<T: FromStr>(reply: &str) -> Result<T> {
    parse_field(reply.split_whitespace().next(), "number", reply)
}

fn last_number<T: FromStr>(reply: &str) -> Result<T> {
    parse_field(reply.split_whitespace().last(), "number", reply)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned replies and records every command sent.
    struct Scripted {
        replies: VecDeque<&'static str>,
        sent: Vec<String>,
    }

    impl Scripted {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl Device for Scripted {
        fn send_command(&mut self, command: &str) -> Result<String> {
            self.sent.push(command.to_string());
            Ok(self.replies.pop_front().unwrap_or("").to_string())
        }
    }

    #[test]
    fn test_sweep_geometry() {
        let sweep = Sweep {
            start: 100_000_000,
            stop: 300_000_000,
            points: 450,
        };
        assert_eq!(sweep.span(), 200_000_000);
        assert_eq!(sweep.center(), 200_000_000);
        assert!(!sweep.is_continuous_wave());

        let cw = Sweep {
            start: 5,
            stop: 5,
            points: 450,
        };
        assert_eq!(cw.span(), 0);
        assert!(cw.is_continuous_wave());
    }

    #[test]
    fn test_parse_sweep_reply() {
        let mut device = Scripted::new(&["0 350000000 450\r\n"]);
        let sweep = device.sweep().unwrap();
        assert_eq!(
            sweep,
            Sweep {
                start: 0,
                stop: 350_000_000,
                points: 450
            }
        );
        assert_eq!(device.sent, vec!["sweep"]);

        assert!(parse_sweep("0 350000000").is_err());
        assert!(parse_sweep("garbage").is_err());
    }

    #[test]
    fn test_sweep_status() {
        let mut device = Scripted::new(&["Paused\r\n", "Resumed", "Busy"]);
        assert_eq!(device.sweep_status().unwrap(), SweepStatus::Paused);
        assert_eq!(device.sweep_status().unwrap(), SweepStatus::Resumed);
        assert!(device.sweep_status().is_err());
    }

    #[test]
    fn test_markers_parsed_and_filtered() {
        let reply = "1 145 100000000 -3.72e+01\r\n2 200 150000000 -80.5\r\n";
        let mut device = Scripted::new(&[reply, reply]);

        let markers = device.markers().unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].frequency, 100_000_000);
        assert!((markers[0].value + 37.2).abs() < 1e-9);

        let marker = device.marker(2).unwrap();
        assert_eq!(marker.index, 200);

        let mut device = Scripted::new(&[reply]);
        let err = device.marker(3).unwrap_err();
        assert_eq!(err.to_string(), "marker #3 is not active");
    }

    #[test]
    fn test_traces_parsed() {
        let mut device = Scripted::new(&["1: dBm 0.000000000 10.000000000\r\n3: dBm -10 5\r\n"]);
        let traces = device.traces().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[1].id, 3);
        assert_eq!(traces[0].unit, "dBm");
        assert!((traces[0].scale - 10.0).abs() < f64::EPSILON);
        assert!((traces[1].ref_pos + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trace_data_zips_frequencies_and_values() {
        let mut device = Scripted::new(&[
            "100000000\r\n200000000\r\n",
            "trace 1 value 0 -87.5\r\ntrace 1 value 1 -60.25\r\n",
        ]);
        let data = device.trace_data(1).unwrap();
        assert_eq!(device.sent, vec!["frequencies", "trace 1 value"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].frequency, 200_000_000);
        assert_eq!(data[1].point, 1);
        assert!((data[1].value + 60.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trace_data_length_mismatch() {
        let mut device = Scripted::new(&["100000000\r\n", "trace 1 value 0 -87.5\r\ntrace 1 value 1 -60\r\n"]);
        assert!(device.trace_data(1).is_err());
    }

    #[test]
    fn test_command_encoding() {
        let mut device = Scripted::new(&[]);
        device.set_sweep_start(100_000_000).unwrap();
        device.set_sweep_time(1_500).unwrap();
        device.set_sweep_mode(SweepMode::HighInput).unwrap();
        device.set_marker_tracking(2, true).unwrap();
        device.disable_marker_delta(1).unwrap();
        device.set_trace_unit(TraceUnit::DbmV).unwrap();
        device.set_trace_calc(1, TraceCalc::Aver16).unwrap();
        device.set_ref_level(-10).unwrap();
        device.set_trace_scale(2.5).unwrap();
        device.set_spur_removal(SpurRemoval::Auto).unwrap();
        device.trigger_menu(&[3, 1, 2]).unwrap();
        device.reset(true).unwrap();

        assert_eq!(
            device.sent,
            vec![
                "sweep start 100000000",
                "sweeptime 0.0015",
                "mode high input",
                "marker 2 tracking on",
                "marker 1 delta off",
                "trace dBmV",
                "calc 1 aver16",
                "trace reflevel -10",
                "trace scale 2.5",
                "spur auto",
                "menu 3 1 2",
                "reset dfu",
            ]
        );
    }

    #[test]
    fn test_set_sweep_points_keeps_range() {
        let mut device = Scripted::new(&["1000000 2000000 290\r\n", ""]);
        device.set_sweep_points(450).unwrap();
        assert_eq!(device.sent, vec!["sweep", "sweep 1000000 2000000 450"]);
    }

    #[test]
    fn test_rejected_command() {
        let mut device = Scripted::new(&["spur?\r\n"]);
        let err = device.set_spur_removal(SpurRemoval::On).unwrap_err();
        assert_eq!(err.to_string(), "device rejected command 'spur on': spur?");
    }

    #[test]
    fn test_numeric_replies() {
        let mut device = Scripted::new(&["4152 mV\r\n", "300\r\n", "deviceid 12\r\n"]);
        assert_eq!(device.battery_voltage().unwrap(), 4152);
        assert_eq!(device.battery_offset().unwrap(), 300);
        assert_eq!(device.device_id().unwrap(), 12);

        let mut device = Scripted::new(&["no battery"]);
        assert!(device.battery_voltage().is_err());
    }

    #[test]
    fn test_parse_version() {
        let info = parse_version("tinySA4_v1.4-143-g864bb27\r\nHW Version:V0.4.5.1\r\n").unwrap();
        assert_eq!(info.model, "tinySA4");
        assert_eq!(info.firmware, "tinySA4_v1.4-143-g864bb27");
        assert_eq!(info.hardware, "V0.4.5.1");

        let info = parse_version("tinySA_v1.3\r\n").unwrap();
        assert_eq!(info.model, "tinySA");
        assert!(info.hardware.is_empty());

        assert!(parse_version("\r\n").is_err());
    }

    #[test]
    fn test_screen_from_rgb565() {
        // red, green, blue, white
        let frame = [0xf8, 0x00, 0x07, 0xe0, 0x00, 0x1f, 0xff, 0xff];
        let screen = Screen::from_rgb565(&frame, 2, 2).unwrap();

        assert_eq!((screen.width, screen.height), (2, 2));
        assert_eq!(
            screen.rgb,
            vec![0xf8, 0, 0, 0, 0xfc, 0, 0, 0, 0xf8, 0xf8, 0xfc, 0xf8]
        );
    }

    #[test]
    fn test_screen_short_frame() {
        let err = Screen::from_rgb565(&[0; 6], 2, 2).unwrap_err();
        assert_eq!(err.to_string(), "capture returned 6 bytes, expected 8");
    }

    #[test]
    fn test_capture_sends_command() {
        let frame = "\0".repeat((SCREEN_WIDTH * SCREEN_HEIGHT * 2) as usize);
        let frame: &'static str = Box::leak(frame.into_boxed_str());
        let mut device = Scripted::new(&[frame]);

        let screen = device.capture().unwrap();
        assert_eq!(device.sent, vec!["capture"]);
        assert_eq!(screen.rgb.len(), 320 * 240 * 3);
        assert!(screen.rgb.iter().all(|&b| b == 0));
    }
}
