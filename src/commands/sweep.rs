//! `sweep`: frequency range, point count, sweep time and mode.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::args::{self, FrequencyArg};
use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::device::{Device, Sweep, SweepMode};
use crate::output::{JsonSweepReport, print_json};
use crate::utils::{format_frequency, format_time_duration};

/// Flags of the `sweep` command.
///
/// Frequencies accept unit prefixes (`100M`, `2.4G`) or scientific notation
/// (`1.5e9`). Start, stop, span and center also accept a signed offset
/// (`+10M`, `-500k`) applied to the instrument's current value.
#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    /// Pause sweep
    #[arg(short = 'p', long)]
    pub pause: bool,

    /// Resume sweep
    #[arg(short = 'r', long)]
    pub resume: bool,

    /// Sweep mode
    #[arg(short = 'm', long, value_enum, value_name = "MODE")]
    pub mode: Option<SweepMode>,

    /// Start frequency
    #[arg(short = 's', long, value_name = "FREQ", allow_hyphen_values = true, value_parser = args::frequency_or_offset)]
    pub start: Option<FrequencyArg>,

    /// Stop frequency
    #[arg(short = 'e', long, value_name = "FREQ", allow_hyphen_values = true, value_parser = args::frequency_or_offset)]
    pub stop: Option<FrequencyArg>,

    /// Span frequency
    #[arg(short = 'S', long, value_name = "FREQ", allow_hyphen_values = true, value_parser = args::frequency_or_offset)]
    pub span: Option<FrequencyArg>,

    /// Center frequency
    #[arg(short = 'C', long, value_name = "FREQ", allow_hyphen_values = true, value_parser = args::frequency_or_offset)]
    pub center: Option<FrequencyArg>,

    /// Set center frequency from marker
    #[arg(short = 'M', long, value_name = "MARKER")]
    pub center_marker: Option<u32>,

    /// Number of sweep points
    #[arg(short = 'n', long)]
    pub points: Option<u32>,

    /// Sweep time (e.g. 200ms, 1.5s)
    #[arg(short = 't', long, value_parser = args::time)]
    pub time: Option<u64>,

    /// Set continuous wave frequency
    #[arg(long, value_name = "FREQ", value_parser = args::frequency)]
    pub cw: Option<u64>,
}

impl SweepArgs {
    fn operations(&self) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if self.pause {
            operations.push(step(|device, out| {
                writeln!(out, "pause sweep")?;
                device.pause_sweep().context("failed to pause sweep")
            }));
        }

        if self.resume {
            operations.push(step(|device, out| {
                writeln!(out, "resume sweep")?;
                device.resume_sweep().context("failed to resume sweep")
            }));
        }

        if let Some(mode) = self.mode {
            operations.push(step(move |device, out| {
                writeln!(out, "set sweep mode to {mode}")?;
                device
                    .set_sweep_mode(mode)
                    .with_context(|| format!("failed to set sweep mode to {mode}"))
            }));
        }

        if let Some(start) = self.start {
            operations.push(set_frequency("start", start, |sweep| sweep.start, |device, hertz| {
                device.set_sweep_start(hertz)
            }));
        }

        if let Some(stop) = self.stop {
            operations.push(set_frequency("stop", stop, |sweep| sweep.stop, |device, hertz| {
                device.set_sweep_stop(hertz)
            }));
        }

        if let Some(span) = self.span {
            operations.push(set_frequency("span", span, Sweep::span, |device, hertz| {
                device.set_sweep_span(hertz)
            }));
        }

        if let Some(center) = self.center {
            operations.push(set_frequency("center", center, Sweep::center, |device, hertz| {
                device.set_sweep_center(hertz)
            }));
        }

        if let Some(id) = self.center_marker {
            operations.push(step(move |device, out| {
                let marker = device
                    .marker(id)
                    .with_context(|| format!("failed to get marker #{id}"))?;
                let formatted = format_frequency(marker.frequency);
                writeln!(out, "set sweep center frequency from marker #{id} ({formatted})")?;
                device
                    .set_sweep_center(marker.frequency)
                    .with_context(|| format!("failed to set sweep center frequency to {formatted}"))
            }));
        }

        if let Some(points) = self.points {
            operations.push(step(move |device, out| {
                writeln!(out, "set sweep points to {points}")?;
                device
                    .set_sweep_points(points)
                    .with_context(|| format!("failed to set sweep points to {points}"))
            }));
        }

        if let Some(time) = self.time {
            operations.push(step(move |device, out| {
                let formatted = format_time_duration(time);
                writeln!(out, "set sweep time to {formatted}")?;
                device
                    .set_sweep_time(time)
                    .with_context(|| format!("failed to set sweep time to {formatted}"))
            }));
        }

        if let Some(cw) = self.cw {
            operations.push(step(move |device, out| {
                let formatted = format_frequency(cw);
                writeln!(out, "set sweep cw frequency to {formatted}")?;
                device
                    .set_sweep_continuous_wave(cw)
                    .with_context(|| format!("failed to set sweep cw frequency to {formatted}"))
            }));
        }

        operations
    }
}

/// A sweep frequency setter whose relative form is resolved against the
/// current sweep.
fn set_frequency(
    label: &'static str,
    value: FrequencyArg,
    reference: fn(&Sweep) -> u64,
    set: fn(&mut dyn Device, u64) -> Result<()>,
) -> Operation<'static> {
    step(move |device, out| {
        let hertz = value.resolve(|| device.sweep().map(|sweep| reference(&sweep)))?;
        let formatted = format_frequency(hertz);
        writeln!(out, "set sweep {label} frequency to {formatted}")?;
        set(device, hertz)
            .with_context(|| format!("failed to set sweep {label} frequency to {formatted}"))
    })
}

/// Print the sweep status and range.
fn print_status(device: &mut dyn Device, out: &mut dyn Write, json: bool) -> Result<()> {
    let status = device.sweep_status().context("failed to get sweep status")?;
    let sweep = device.sweep().context("failed to get sweep")?;

    if json {
        return print_json(out, &JsonSweepReport::new(status, &sweep));
    }

    writeln!(out, "Status: {status}")?;
    if sweep.is_continuous_wave() {
        writeln!(out, "Frequency: {} (CW)", format_frequency(sweep.start))?;
    } else {
        writeln!(
            out,
            "Frequency: {} to {} ({} points)",
            format_frequency(sweep.start),
            format_frequency(sweep.stop),
            sweep.points
        )?;
        writeln!(out, "Center: {}", format_frequency(sweep.center()))?;
        writeln!(out, "Span: {}", format_frequency(sweep.span()))?;
    }

    Ok(())
}

impl Command for SweepArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        options: &RunOptions,
    ) -> Result<Outcome> {
        let operations = self.operations();

        if operations.is_empty() {
            print_status(session.device()?, out, options.json)?;
        } else {
            apply(&operations, session, out)?;
        }

        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_no_operations() {
        assert!(SweepArgs::default().operations().is_empty());
    }

    #[test]
    fn test_operation_count_follows_flags() {
        let args = SweepArgs {
            pause: true,
            start: Some(FrequencyArg::Absolute(1)),
            stop: Some(FrequencyArg::Relative(5)),
            points: Some(450),
            cw: Some(100),
            ..SweepArgs::default()
        };
        assert_eq!(args.operations().len(), 5);
    }
}
