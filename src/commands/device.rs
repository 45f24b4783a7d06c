//! `device`: identification, battery and reset.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::output::print_json;

/// Flags of the `device` command.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceArgs {
    /// Reset device
    #[arg(short = 'r', long)]
    pub reset: bool,

    /// Reset device into DFU mode
    #[arg(long)]
    pub reset_dfu: bool,

    /// Get device id
    #[arg(long = "id")]
    pub get_id: bool,

    /// Set device id
    #[arg(long, value_name = "ID")]
    pub set_id: Option<u32>,

    /// Get battery voltage (mV)
    #[arg(short = 'b', long = "bat")]
    pub battery: bool,

    /// Get battery offset voltage (mV)
    #[arg(long = "bat-offset")]
    pub battery_offset: bool,

    /// Set battery offset voltage (mV)
    #[arg(long = "set-bat-offset", value_name = "MV")]
    pub set_battery_offset: Option<u32>,

    /// Get firmware and hardware version
    #[arg(short = 'i', long)]
    pub info: bool,
}

impl DeviceArgs {
    fn operations(&self, json: bool) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if self.reset {
            operations.push(step(|device, out| {
                writeln!(out, "reset device")?;
                device.reset(false).context("failed to reset device")
            }));
        }

        if self.reset_dfu {
            operations.push(step(|device, out| {
                writeln!(out, "reset device in dfu mode")?;
                device.reset(true).context("failed to reset device in dfu mode")
            }));
        }

        if self.get_id {
            operations.push(step(move |device, out| {
                let id = device.device_id().context("failed to get device id")?;
                if json {
                    return print_json(out, &json!({ "device_id": id }));
                }
                writeln!(out, "Device id: {id}")?;
                Ok(())
            }));
        }

        if let Some(id) = self.set_id {
            operations.push(step(move |device, out| {
                writeln!(out, "set device id to {id}")?;
                device
                    .set_device_id(id)
                    .with_context(|| format!("failed to set device id to {id}"))
            }));
        }

        if self.info {
            operations.push(step(move |device, out| {
                let info = device.info().context("failed to get device info")?;
                if json {
                    return print_json(out, &info);
                }
                writeln!(out, "Model: {}", info.model)?;
                writeln!(out, "Firmware version: {}", info.firmware)?;
                writeln!(out, "Hardware version: {}", info.hardware)?;
                Ok(())
            }));
        }

        if self.battery {
            operations.push(step(move |device, out| {
                let millivolts = device
                    .battery_voltage()
                    .context("failed to get battery voltage")?;
                if json {
                    return print_json(out, &json!({ "battery_voltage_mv": millivolts }));
                }
                writeln!(out, "Battery voltage: {millivolts} mV")?;
                Ok(())
            }));
        }

        if self.battery_offset {
            operations.push(step(move |device, out| {
                let millivolts = device
                    .battery_offset()
                    .context("failed to get battery offset voltage")?;
                if json {
                    return print_json(out, &json!({ "battery_offset_mv": millivolts }));
                }
                writeln!(out, "Battery offset voltage: {millivolts} mV")?;
                Ok(())
            }));
        }

        if let Some(millivolts) = self.set_battery_offset {
            operations.push(step(move |device, out| {
                writeln!(out, "set battery offset voltage to {millivolts}")?;
                device.set_battery_offset(millivolts).with_context(|| {
                    format!("failed to set battery offset voltage to {millivolts}")
                })
            }));
        }

        operations
    }
}

impl Command for DeviceArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        options: &RunOptions,
    ) -> Result<Outcome> {
        let operations = self.operations(options.json);
        if operations.is_empty() {
            return Ok(Outcome::Usage);
        }

        apply(&operations, session, out)?;
        Ok(Outcome::Done)
    }
}
