//! `signal`: signal processing options.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::device::SpurRemoval;

/// Flags of the `signal` command.
#[derive(Args, Debug, Default)]
pub struct SignalArgs {
    /// Set spur removal
    #[arg(long, value_enum, value_name = "MODE")]
    pub spur: Option<SpurRemoval>,
}

impl SignalArgs {
    fn operations(&self) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if let Some(setting) = self.spur {
            operations.push(step(move |device, out| {
                let action = match setting {
                    SpurRemoval::On => "enable spur removal",
                    SpurRemoval::Off => "disable spur removal",
                    SpurRemoval::Auto => "enable auto spur removal",
                };
                writeln!(out, "{action}")?;
                device
                    .set_spur_removal(setting)
                    .with_context(|| format!("failed to {action}"))
            }));
        }

        operations
    }
}

impl Command for SignalArgs {
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
