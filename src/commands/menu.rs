//! `menu`: press on-screen menu entries by id.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{Command, Outcome, Session, apply, step};
use crate::config::RunOptions;

/// Arguments of the `menu` command.
#[derive(Args, Debug, Default)]
pub struct MenuArgs {
    /// Menu entry ids, pressed in order
    #[arg(value_name = "ID", required = true, num_args = 1..)]
    pub ids: Vec<u32>,
}

impl Command for MenuArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        _options: &RunOptions,
    ) -> Result<Outcome> {
        if self.ids.is_empty() {
            return Ok(Outcome::Usage);
        }

        let trigger = step(|device, out| {
            let ids: Vec<String> = self.ids.iter().map(ToString::to_string).collect();
            writeln!(out, "trigger menu {}", ids.join(", "))?;
            device.trigger_menu(&self.ids).context("failed to trigger menu")
        });

        apply(&[trigger], session, out)?;
        Ok(Outcome::Done)
    }
}
