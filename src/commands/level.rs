//! `level`: trace unit, reference level, scale and LNA.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::device::TraceUnit;

/// Flags of the `level` command.
#[derive(Args, Debug, Default)]
pub struct LevelArgs {
    /// Set trace unit
    #[arg(short = 'u', long, value_enum, value_name = "UNIT")]
    pub unit: Option<TraceUnit>,

    /// Set trace reference level in dBm
    #[arg(
        long = "ref",
        value_name = "REFLEVEL",
        allow_negative_numbers = true,
        conflicts_with = "ref_auto"
    )]
    pub ref_level: Option<i32>,

    /// Set trace reference level to auto
    #[arg(long = "ref-auto")]
    pub ref_auto: bool,

    /// Set trace scale
    #[arg(short = 's', long, value_name = "SCALE")]
    pub scale: Option<f64>,

    /// Enable low noise amplifier (LNA)
    #[arg(long, overrides_with = "no_lna")]
    pub lna: bool,

    /// Disable low noise amplifier (LNA)
    #[arg(long, overrides_with = "lna")]
    pub no_lna: bool,
}

impl LevelArgs {
    fn operations(&self) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if let Some(unit) = self.unit {
            operations.push(step(move |device, out| {
                writeln!(out, "set trace unit to {unit}")?;
                device
                    .set_trace_unit(unit)
                    .with_context(|| format!("failed to set trace unit to {unit}"))
            }));
        }

        if let Some(level) = self.ref_level {
            operations.push(step(move |device, out| {
                writeln!(out, "set reference level to {level}")?;
                device
                    .set_ref_level(level)
                    .with_context(|| format!("failed to set reference level to {level}"))
            }));
        }

        if self.ref_auto {
            operations.push(step(|device, out| {
                writeln!(out, "set reference level to auto")?;
                device
                    .set_ref_level_auto()
                    .context("failed to set reference level to auto")
            }));
        }

        if let Some(scale) = self.scale {
            operations.push(step(move |device, out| {
                writeln!(out, "set display scale to {scale}")?;
                device
                    .set_trace_scale(scale)
                    .with_context(|| format!("failed to set scale to {scale}"))
            }));
        }

        let lna = match (self.lna, self.no_lna) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        if let Some(enabled) = lna {
            operations.push(step(move |device, out| {
                let verb = if enabled { "enable" } else { "disable" };
                writeln!(out, "{verb} lna")?;
                device
                    .set_lna(enabled)
                    .with_context(|| format!("failed to {verb} lna"))
            }));
        }

        operations
    }
}

impl Command for LevelArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        _options: &RunOptions,
    ) -> Result<Outcome> {
        let operations = self.operations();
        if operations.is_empty() {
            return Ok(Outcome::Usage);
        }

        apply(&operations, session, out)?;
        Ok(Outcome::Done)
    }
}
