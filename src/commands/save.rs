//! `save`: export the screen as PNG or trace data as CSV.
//!
//! Output paths are templates. `<date>` expands to `yymmdd`, `<time>` to
//! `HHMMSS` (local time) and `<trace>` to the trace id of a single-trace
//! export. A leading `~` is expanded to the home directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::Args;

use super::{Command, Outcome, Session};
use crate::config::RunOptions;
use crate::config::file::expand_tilde;
use crate::device::{Device, Screen, TraceData};

/// Flags of the `save` command.
#[derive(Args, Debug, Default)]
pub struct SaveArgs {
    /// Save screen as PNG
    #[arg(short = 'c', long)]
    pub capture: bool,

    /// Save trace as CSV (repeat to export several traces into one file)
    #[arg(short = 't', long = "trace", value_name = "TRACE", action = clap::ArgAction::Append)]
    pub traces: Vec<u32>,

    /// Output file path template
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<String>,
}

impl SaveArgs {
    fn output_path(&self, options: &RunOptions, now: &DateTime<Local>) -> PathBuf {
        let (template, trace) = match self.traces.as_slice() {
            [] => (&options.capture_template, None),
            [single] => (&options.trace_template, Some(*single)),
            _ => (&options.traces_template, None),
        };
        let template = self.output.as_ref().unwrap_or(template);
        expand_tilde(Path::new(&expand_template(template, now, trace)))
    }
}

/// Replace `<date>`, `<time>` and, for single-trace exports, `<trace>`.
#[must_use]
pub fn expand_template(template: &str, now: &DateTime<Local>, trace: Option<u32>) -> String {
    let expanded = template
        .replace("<date>", &now.format("%y%m%d").to_string())
        .replace("<time>", &now.format("%H%M%S").to_string());

    match trace {
        Some(id) => expanded.replace("<trace>", &id.to_string()),
        None => expanded,
    }
}

/// Write one trace as `trace,point,frequency,value` rows.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_trace_csv(writer: &mut dyn Write, data: &[TraceData]) -> Result<()> {
    writeln!(writer, "trace,point,frequency,value")?;
    for point in data {
        writeln!(
            writer,
            "{},{},{},{}",
            point.trace, point.point, point.frequency, point.value
        )?;
    }
    Ok(())
}

/// Write several traces side by side as `point,frequency,value_t<N>...`.
///
/// Point and frequency columns come from the first trace.
///
/// # Errors
///
/// Returns an error if the traces differ in length or the write fails.
pub fn write_traces_csv(writer: &mut dyn Write, ids: &[u32], data: &[Vec<TraceData>]) -> Result<()> {
    let Some(first) = data.first() else {
        return Ok(());
    };

    if let Some((id, other)) = ids.iter().zip(data).find(|(_, d)| d.len() != first.len()) {
        bail!(
            "trace #{id} has {} points, expected {}",
            other.len(),
            first.len()
        );
    }

    let mut header = String::from("point,frequency");
    for id in ids {
        header.push_str(&format!(",value_t{id}"));
    }
    writeln!(writer, "{header}")?;

    for (row, point) in first.iter().enumerate() {
        let mut line = format!("{},{}", point.point, point.frequency);
        for trace in data {
            line.push_str(&format!(",{}", trace[row].value));
        }
        writeln!(writer, "{line}")?;
    }

    Ok(())
}

/// Encode a screen capture as an 8-bit RGB PNG.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn write_png(writer: &mut dyn Write, screen: &Screen) -> Result<()> {
    let mut encoder = png::Encoder::new(writer, screen.width, screen.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut image = encoder.write_header()?;
    image.write_image_data(&screen.rgb)?;
    image.finish()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("failed to open file '{}'", path.display()))
}

fn save_capture(device: &mut dyn Device, path: &Path) -> Result<()> {
    let screen = device.capture().context("failed to capture screen")?;

    let mut writer = create(path)?;
    write_png(&mut writer, &screen)
        .with_context(|| format!("failed to encode file '{}'", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn save_trace(device: &mut dyn Device, id: u32, path: &Path) -> Result<()> {
    let data = device
        .trace_data(id)
        .context("failed to get trace data")?;

    let mut writer = create(path)?;
    write_trace_csv(&mut writer, &data)?;
    writer.flush()?;
    Ok(())
}

fn save_traces(device: &mut dyn Device, ids: &[u32], path: &Path) -> Result<()> {
    let data = ids
        .iter()
        .map(|&id| device.trace_data(id).context("failed to get trace data"))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = create(path)?;
    write_traces_csv(&mut writer, ids, &data)?;
    writer.flush()?;
    Ok(())
}

impl Command for SaveArgs {
    fn run(
        &self,
        session: &mut Session<'_>,
        out: &mut dyn Write,
        options: &RunOptions,
    ) -> Result<Outcome> {
        if self.traces.is_empty() && !self.capture {
            return Ok(Outcome::Usage);
        }

        let path = self.output_path(options, &Local::now());
        let device = session.device()?;

        match self.traces.as_slice() {
            [] => {
                save_capture(device, &path)?;
                writeln!(out, "capture saved to {}", path.display())?;
            }
            [id] => {
                save_trace(device, *id, &path)?;
                writeln!(out, "trace {id} data saved to {}", path.display())?;
            }
            _ => {
                save_traces(device, &self.traces, &path)?;
                writeln!(out, "traces {:?} saved to {}", self.traces, path.display())?;
            }
        }

        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap()
    }

    fn point(trace: u32, point: u32, frequency: u64, value: f64) -> TraceData {
        TraceData {
            trace,
            point,
            frequency,
            value,
        }
    }

    #[test]
    fn test_expand_template() {
        let now = fixed_time();
        assert_eq!(
            expand_template("SA_<date>_<time>_<trace>.csv", &now, Some(2)),
            "SA_250307_090502_2.csv"
        );
        assert_eq!(
            expand_template("SA_<date>_<time>.csv", &now, None),
            "SA_250307_090502.csv"
        );
        assert_eq!(expand_template("fixed.csv", &now, Some(1)), "fixed.csv");
    }

    #[test]
    fn test_output_path_picks_template() {
        let now = fixed_time();
        let options = RunOptions::default();

        let single = SaveArgs {
            capture: false,
            traces: vec![3],
            output: None,
        };
        assert_eq!(
            single.output_path(&options, &now),
            PathBuf::from("SA_250307_090502_3.csv")
        );

        let multi = SaveArgs {
            capture: false,
            traces: vec![1, 2],
            output: None,
        };
        assert_eq!(
            multi.output_path(&options, &now),
            PathBuf::from("SA_250307_090502.csv")
        );

        let explicit = SaveArgs {
            capture: false,
            traces: vec![1],
            output: Some("out/t<trace>.csv".to_string()),
        };
        assert_eq!(
            explicit.output_path(&options, &now),
            PathBuf::from("out/t1.csv")
        );

        let capture = SaveArgs {
            capture: true,
            ..SaveArgs::default()
        };
        assert_eq!(
            capture.output_path(&options, &now),
            PathBuf::from("SA_250307_090502.png")
        );
    }

    #[test]
    fn test_write_png_header() {
        let screen = Screen {
            width: 3,
            height: 2,
            rgb: vec![0x7f; 3 * 2 * 3],
        };
        let mut out = Vec::new();
        write_png(&mut out, &screen).unwrap();

        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&out[12..16], b"IHDR");
        assert_eq!(&out[16..20], &3u32.to_be_bytes());
        assert_eq!(&out[20..24], &2u32.to_be_bytes());
    }

    #[test]
    fn test_write_png_rejects_wrong_size() {
        let screen = Screen {
            width: 2,
            height: 2,
            rgb: vec![0; 3],
        };
        assert!(write_png(&mut Vec::new(), &screen).is_err());
    }

    #[test]
    fn test_write_trace_csv() {
        let mut out = Vec::new();
        write_trace_csv(
            &mut out,
            &[point(1, 0, 100_000, -87.5), point(1, 1, 200_000, -60.0)],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "trace,point,frequency,value\n1,0,100000,-87.5\n1,1,200000,-60\n"
        );
    }

    #[test]
    fn test_write_traces_csv() {
        let mut out = Vec::new();
        let data = vec![
            vec![point(1, 0, 100, -1.5), point(1, 1, 200, -2.0)],
            vec![point(3, 0, 100, -3.25), point(3, 1, 200, -4.0)],
        ];
        write_traces_csv(&mut out, &[1, 3], &data).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "point,frequency,value_t1,value_t3\n0,100,-1.5,-3.25\n1,200,-2,-4\n"
        );
    }

    #[test]
    fn test_write_traces_csv_length_mismatch() {
        let mut out = Vec::new();
        let data = vec![vec![point(1, 0, 100, -1.5)], vec![]];
        let err = write_traces_csv(&mut out, &[1, 2], &data).unwrap_err();
        assert_eq!(err.to_string(), "trace #2 has 0 points, expected 1");
    }
}
