//! `raw`: send a shell command verbatim and print the reply.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::{Command, Outcome, Session};
use crate::config::RunOptions;
use crate::utils::text::contains_binary;

/// Arguments of the `raw` command.
#[derive(Args, Debug, Default)]
pub struct RawArgs {
    /// Command and arguments, joined with spaces
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub command: Vec<String>,
}

impl Command for RawArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        _options: &RunOptions,
    ) -> Result<Outcome> {
        if self.command.is_empty() {
            return Ok(Outcome::Usage);
        }

        let reply = session
            .device()?
            .send_command(&self.command.join(" "))
            .context("failed to send raw command")?;

        write_reply(out, &reply)?;
        Ok(Outcome::Done)
    }
}

/// Text replies get a trailing newline; binary or empty replies are written
/// untouched.
fn write_reply(out: &mut dyn Write, reply: &str) -> Result<()> {
    out.write_all(reply.as_bytes())?;
    if !reply.is_empty() && !contains_binary(reply) {
        writeln!(out)?;
    }
    Ok(())
}
