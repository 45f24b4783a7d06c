//! `marker`: enable, place and inspect markers.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use super::args::{self, FrequencyArg, MarkerDelta};
use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::device::{Device, Marker};
use crate::output::{JsonMarkerEntry, print_json, write_table};
use crate::utils::format_frequency;

/// Flags of the `marker` command.
///
/// Without flags the command lists the given marker, or all active markers
/// when no id is given.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkerArgs {
    /// Enable marker
    #[arg(short = 'e', long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable marker
    #[arg(short = 'd', long)]
    pub disable: bool,

    /// Assign marker to trace
    #[arg(short = 't', long, value_name = "TRACE")]
    pub trace: Option<u32>,

    /// Set marker to frequency (absolute or +/- offset)
    #[arg(short = 'f', long = "freq", value_name = "FREQ", allow_hyphen_values = true, value_parser = args::frequency_or_offset)]
    pub frequency: Option<FrequencyArg>,

    /// Move marker to peak of assigned trace
    #[arg(short = 'p', long)]
    pub peak: bool,

    /// Enable delta mode relative to a reference marker, or `off`
    #[arg(long, value_name = "OFF|MARKER", value_parser = args::marker_delta)]
    pub delta: Option<MarkerDelta>,

    /// Enable tracking mode
    #[arg(long, overrides_with = "no_track")]
    pub track: bool,

    /// Disable tracking mode
    #[arg(long, overrides_with = "track")]
    pub no_track: bool,

    /// Marker id
    #[arg(value_name = "ID", value_parser = clap::value_parser!(u32).range(1..))]
    pub id: Option<u32>,
}

impl MarkerArgs {
    /// Requested tracking state, if any.
    #[must_use]
    pub const fn tracking(&self) -> Option<bool> {
        match (self.track, self.no_track) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }

    fn operations(&self, id: u32) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if self.enable {
            operations.push(step(move |device, out| {
                writeln!(out, "enable marker #{id}")?;
                device
                    .enable_marker(id)
                    .with_context(|| format!("failed to enable marker #{id}"))
            }));
        }

        if self.disable {
            operations.push(step(move |device, out| {
                writeln!(out, "disable marker #{id}")?;
                device
                    .disable_marker(id)
                    .with_context(|| format!("failed to disable marker #{id}"))
            }));
        }

        if let Some(trace) = self.trace {
            operations.push(step(move |device, out| {
                writeln!(out, "assign marker #{id} to trace #{trace}")?;
                device
                    .set_marker_trace(id, trace)
                    .with_context(|| format!("failed to assign marker #{id} to trace #{trace}"))
            }));
        }

        if let Some(frequency) = self.frequency {
            operations.push(step(move |device, out| {
                let hertz = frequency.resolve(|| device.marker(id).map(|m| m.frequency))?;
                let formatted = format_frequency(hertz);
                writeln!(out, "set marker #{id} to frequency {formatted}")?;
                device
                    .set_marker_frequency(id, hertz)
                    .with_context(|| format!("failed to set marker #{id} to frequency {formatted}"))
            }));
        }

        match self.delta {
            Some(MarkerDelta::Off) => operations.push(step(move |device, out| {
                writeln!(out, "disable delta mode for marker #{id}")?;
                device
                    .disable_marker_delta(id)
                    .with_context(|| format!("failed to disable delta mode for marker #{id}"))
            })),
            Some(MarkerDelta::Reference(reference)) => operations.push(step(move |device, out| {
                writeln!(
                    out,
                    "enable delta mode for marker #{id} relative to marker #{reference}"
                )?;
                device
                    .enable_marker_delta(id, reference)
                    .with_context(|| format!("failed to enable delta mode for marker #{id}"))
            })),
            None => {}
        }

        if self.peak {
            operations.push(step(move |device, out| {
                writeln!(out, "set marker #{id} to peak")?;
                device
                    .move_marker_to_peak(id)
                    .with_context(|| format!("failed to set marker #{id} to peak"))
            }));
        }

        if let Some(enabled) = self.tracking() {
            operations.push(step(move |device, out| {
                let verb = if enabled { "enable" } else { "disable" };
                writeln!(out, "{verb} tracking for marker #{id}")?;
                device
                    .set_marker_tracking(id, enabled)
                    .with_context(|| format!("failed to {verb} tracking for marker #{id}"))
            }));
        }

        operations
    }
}

fn marker_row(marker: &Marker) -> Vec<String> {
    vec![
        format!("Marker {}:", marker.id),
        format_frequency(marker.frequency),
        marker.value.to_string(),
        format!("(Index {})", marker.index),
    ]
}

fn print_markers(
    device: &mut dyn Device,
    out: &mut dyn Write,
    id: Option<u32>,
    json: bool,
) -> Result<()> {
    let markers = match id {
        Some(id) => vec![device.marker(id)?],
        None => device.markers().context("failed to get markers")?,
    };

    if json {
        let entries: Vec<JsonMarkerEntry> = markers.iter().map(JsonMarkerEntry::from).collect();
        return print_json(out, &entries);
    }

    if id.is_none() {
        writeln!(out, "Active markers:")?;
    }
    let rows: Vec<Vec<String>> = markers.iter().map(marker_row).collect();
    write_table(out, "  ", &rows)
}

impl Command for MarkerArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        options: &RunOptions,
    ) -> Result<Outcome> {
        // Operations only run once an id is known; 0 is never a valid marker.
        let operations = self.operations(self.id.unwrap_or_default());

        if operations.is_empty() {
            print_markers(session.device()?, out, self.id, options.json)?;
            return Ok(Outcome::Done);
        }

        if self.id.is_none() {
            bail!("expected \"<id>\"");
        }

        apply(&operations, session, out)?;
        Ok(Outcome::Done)
    }
}
