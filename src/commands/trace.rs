//! `trace`: show/hide traces and set trace calculations.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use super::{Command, Operation, Outcome, Session, apply, step};
use crate::config::RunOptions;
use crate::device::{Device, Trace, TraceCalc};
use crate::output::{print_json, write_table};

/// Flags of the `trace` command.
#[derive(Args, Debug, Default)]
pub struct TraceArgs {
    /// Enable trace
    #[arg(short = 'e', long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable trace
    #[arg(short = 'd', long)]
    pub disable: bool,

    /// Trace calculation
    #[arg(short = 'c', long, value_enum, value_name = "MODE")]
    pub calc: Option<TraceCalc>,

    /// Trace id
    #[arg(value_name = "ID", value_parser = clap::value_parser!(u32).range(1..))]
    pub id: Option<u32>,
}

impl TraceArgs {
    fn operations(&self, id: u32) -> Vec<Operation<'_>> {
        let mut operations = Vec::new();

        if self.enable {
            operations.push(step(move |device, out| {
                writeln!(out, "enable trace #{id}")?;
                device
                    .enable_trace(id)
                    .with_context(|| format!("failed to enable trace #{id}"))
            }));
        }

        if self.disable {
            operations.push(step(move |device, out| {
                writeln!(out, "disable trace #{id}")?;
                device
                    .disable_trace(id)
                    .with_context(|| format!("failed to disable trace #{id}"))
            }));
        }

        match self.calc {
            Some(TraceCalc::Off) => operations.push(step(move |device, out| {
                writeln!(out, "disable calculations on trace #{id}")?;
                device
                    .set_trace_calc(id, TraceCalc::Off)
                    .with_context(|| format!("failed to disable calculation for trace #{id}"))
            })),
            Some(calc) => operations.push(step(move |device, out| {
                writeln!(out, "enable trace calculations {calc} for trace #{id}")?;
                // A calculation only shows on a visible trace.
                device
                    .enable_trace(id)
                    .with_context(|| format!("failed to enable trace #{id}"))?;
                device.set_trace_calc(id, calc).with_context(|| {
                    format!("failed to enable trace calculation {calc} for trace #{id}")
                })
            })),
            None => {}
        }

        operations
    }
}

fn trace_row(trace: &Trace) -> Vec<String> {
    vec![
        format!("Trace {}:", trace.id),
        trace.unit.clone(),
        format!("{:.6}", trace.scale),
        format!("{:.6}", trace.ref_pos),
    ]
}

fn print_traces(
    device: &mut dyn Device,
    out: &mut dyn Write,
    id: Option<u32>,
    json: bool,
) -> Result<()> {
    let traces = match id {
        Some(id) => vec![device.trace(id)?],
        None => device.traces().context("failed to get traces")?,
    };

    if json {
        return print_json(out, &traces);
    }

    if id.is_none() {
        writeln!(out, "Active traces:")?;
    }
    let rows: Vec<Vec<String>> = traces.iter().map(trace_row).collect();
    write_table(out, "  ", &rows)
}

impl Command for TraceArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        options: &RunOptions,
    ) -> Result<Outcome> {
        let operations = self.operations(self.id.unwrap_or_default());

        if operations.is_empty() {
            print_traces(session.device()?, out, self.id, options.json)?;
            return Ok(Outcome::Done);
        }

        if self.id.is_none() {
            bail!("expected \"<id>\"");
        }

        apply(&operations, session, out)?;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_is_a_single_operation() {
        let args = TraceArgs {
            calc: Some(TraceCalc::Maxh),
            ..TraceArgs::default()
        };
        assert_eq!(args.operations(1).len(), 1);
        assert!(TraceArgs::default().operations(1).is_empty());
    }

    #[test]
    fn test_trace_row() {
        let row = trace_row(&Trace {
            id: 1,
            unit: "dBm".to_string(),
            ref_pos: -10.0,
            scale: 10.0,
        });
        assert_eq!(row, vec!["Trace 1:", "dBm", "10.000000", "-10.000000"]);
    }
}
