//! `preset`: load or save instrument presets.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;

/// Flags of the `preset` command. Slot 0 is the startup preset.
#[derive(Args, Debug, Default)]
pub struct PresetArgs {
    /// Load preset (0 = startup)
    #[arg(short = 'l', long, value_name = "SLOT", conflicts_with = "save")]
    pub load: Option<u32>,

    /// Save preset (0 = startup)
    #[arg(short = 's', long, value_name = "SLOT")]
    pub save: Option<u32>,
}

impl PresetArgs {
    fn operations(&self) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if let Some(slot) = self.load {
            operations.push(step(move |device, out| {
                writeln!(out, "load preset {slot}")?;
                device
                    .load_preset(slot)
                    .with_context(|| format!("failed to load preset {slot}"))
            }));
        }

        if let Some(slot) = self.save {
            operations.push(step(move |device, out| {
                writeln!(out, "save preset {slot}")?;
                device
                    .save_preset(slot)
                    .with_context(|| format!("failed to save preset {slot}"))
            }));
        }

        operations
    }
}

impl Command for PresetArgs {
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
