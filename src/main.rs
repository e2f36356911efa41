use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::{self, ExitCode};
use thiserror::Error;

mod config;
mod diagnostics;
mod log;
mod model;
mod render;

use config::{Filters, Unit};
use log::{Decoder, LogSource};
use model::{Aggregator, Table};

pub type Result<T> = anyhow::Result<T>;

/// Exit status for argument errors, missing data and interrupts.
const EXIT_FAILURE: u8 = 1;

/// Exit status for an invalid `--timestamp` pattern.
const EXIT_BAD_PATTERN: u8 = 2;

#[derive(Parser)]
#[command(name = "wmp-log-extract", version)]
#[command(
    about = "Extracts WMP cgroup memory data from system log and prints it as CSV or as a human-readable table.",
    long_about = None
)]
struct Cli {
    /// Regular expression used to filter timestamps (matched at the start).
    #[arg(long = "timestamp", value_name = "PATTERN")]
    timestamp: Option<String>,

    /// Unit for memory values.
    #[arg(long, value_enum, default_value_t = Unit::B)]
    unit: Unit,

    /// Extract only these cgroups.
    #[arg(long = "cgroup", value_name = "CGROUP,...")]
    cgroups: Option<String>,

    /// Extract only these controller parameters.
    #[arg(long = "param", value_name = "PARAM,...")]
    params: Option<String>,

    /// Sort rows by timestamp.
    #[arg(long)]
    sort: bool,

    /// Print data as CSV.
    #[arg(long)]
    csv: bool,

    /// Delimiter for CSV output.
    #[arg(long, default_value = ",")]
    delim: String,

    /// (Compressed) system log files. Defaults to /var/log/messages-* and
    /// /var/log/messages.
    #[arg(value_name = "LOGFILE")]
    logfiles: Vec<PathBuf>,
}

/// Errors that end a run with a specific exit status.
#[derive(Debug, Error)]
enum Failure {
    #[error("timestamp pattern is invalid")]
    InvalidPattern(#[from] regex::Error),
    #[error("No WMP data found! Exiting.")]
    NoData,
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::InvalidPattern(_) => EXIT_BAD_PATTERN,
            Failure::NoData => EXIT_FAILURE,
        }
    }
}

fn main() -> ExitCode {
    diagnostics::init();

    if let Err(e) = ctrlc::set_handler(|| {
        process::exit(i32::from(EXIT_FAILURE));
    }) {
        tracing::warn!("failed to set Ctrl-C handler: {}", e);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let result = run(cli, &mut out).and_then(|()| Ok(out.flush()?));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // The reader went away (e.g. `| head`); nothing left to report.
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::fatal(&e);
            let code = e
                .downcast_ref::<Failure>()
                .map_or(EXIT_FAILURE, Failure::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    // 1) Resolve configuration before touching any file.
    let timestamp = cli
        .timestamp
        .as_deref()
        .map(config::compile_timestamp_pattern)
        .transpose()
        .map_err(Failure::from)?;
    let filters = Filters::new(
        timestamp,
        cli.cgroups.as_deref().and_then(config::parse_name_list),
        cli.params.as_deref().and_then(config::parse_name_list),
        cli.unit,
    );

    let logfiles = if cli.logfiles.is_empty() {
        let found = config::default_log_files();
        if found.is_empty() {
            tracing::warn!(
                "no log files found at {} or {}",
                config::ROTATED_LOG_GLOB,
                config::DEFAULT_LOG_FILE
            );
        }
        found
    } else {
        cli.logfiles
    };

    // 2) Read and aggregate.
    let table = read_logs(&logfiles, &Decoder::new(filters));
    if table.is_empty() {
        return Err(Failure::NoData.into());
    }
    tracing::debug!("{} rows, {} columns", table.len(), table.columns().len());

    // 3) Render.
    if cli.csv {
        render::render_csv(out, &table, &cli.delim, cli.sort)?;
    } else {
        render::render_table(out, &table, cli.sort)?;
    }

    Ok(())
}

/// Decode every line of every file, in order, into one table.
///
/// Unreadable files and malformed lines are reported and skipped.
fn read_logs(paths: &[PathBuf], decoder: &Decoder) -> Table {
    let mut aggregator = Aggregator::new();

    for path in paths {
        let source = match LogSource::open(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("could not read {}: {:#}", path.display(), e);
                continue;
            }
        };
        tracing::debug!("reading {}", source.path().display());

        let before = aggregator.records();
        let mut lines = 0usize;
        let mut rejected = 0usize;
        for line in source.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!("error reading {}: {}", path.display(), e);
                    break;
                }
            };
            lines += 1;

            match decoder.decode(&line) {
                Ok(Some(record)) => aggregator.ingest(record),
                Ok(None) => {}
                Err(e) => {
                    rejected += 1;
                    tracing::warn!("{}", e);
                }
            }
        }

        tracing::info!(
            "{}: {} lines, {} samples, {} rejected",
            path.display(),
            lines,
            aggregator.records() - before,
            rejected
        );
    }

    aggregator.finish()
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wmp-log-extract").chain(args.iter().copied())).unwrap()
    }

    fn write_log(dir: &Path, name: &str, lines: &[&str]) -> String {
        let path = dir.join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn run_to_string(args: &[&str]) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(cli(args), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn exit_code(result: &Result<()>) -> Option<u8> {
        result
            .as_ref()
            .err()
            .and_then(|e| e.downcast_ref::<Failure>())
            .map(Failure::exit_code)
    }

    #[test]
    fn csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "messages",
            &[
                "T1 node1 wmp_memory_current: a: mem_current=100",
                "T1 node1 sshd[42]: Accepted publickey",
                "T2 node1 wmp_memory_current: a: mem_current=200",
            ],
        );

        let (result, out) = run_to_string(&["--unit", "B", "--csv", &log]);
        assert!(result.is_ok());
        assert_eq!(out, "timestamp,a/mem_current\nT1,100\nT2,200\n");
    }

    #[test]
    fn files_are_read_in_order_and_merged() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_log(
            dir.path(),
            "messages-1",
            &["T2 n wmp_memory_current: b: x=1", "T1 n wmp_memory_current: a: x=2"],
        );
        let second = write_log(
            dir.path(),
            "messages",
            &["T2 n wmp_memory_current: a: x=3 y=4", "T3 n wmp_memory_current: c: x=-"],
        );

        let (_, out) = run_to_string(&["--csv", "--sort", "--delim", ";", &first, &second]);
        assert_eq!(out, "timestamp;b/x;a/x;a/y\nT1;-;2;-\nT2;1;3;4\n");
    }

    #[test]
    fn bad_lines_and_missing_files_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "messages",
            &[
                "T1 n wmp_memory_current: a: x=1 broken",
                "T2 n wmp_memory_current: a: x=2",
            ],
        );
        let missing = dir.path().join("absent").to_string_lossy().into_owned();

        let (result, out) = run_to_string(&["--csv", &missing, &log]);
        assert!(result.is_ok());
        assert_eq!(out, "timestamp,a/x\nT2,2\n");
    }

    #[test]
    fn filters_and_units_apply() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "messages",
            &[
                "2020-10-01T10:00 n wmp_memory_current: a: x=2048 y=1024, b: x=4096",
                "2020-10-02T10:00 n wmp_memory_current: a: x=1024 y=1024, b: x=4096",
            ],
        );

        let (_, out) = run_to_string(&[
            "--csv",
            "--unit",
            "kiB",
            "--timestamp",
            "2020-10-01",
            "--cgroup",
            "a",
            "--param",
            "x",
            &log,
        ]);
        assert_eq!(out, "timestamp,a/x\n2020-10-01T10:00,2.0\n");
    }

    #[test]
    fn human_readable_is_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "messages",
            &[
                "T1 n wmp_memory_current: a: x=10",
                "T2 n wmp_memory_current: a: x=5",
                "T3 n wmp_memory_current: a: x=20",
            ],
        );

        let (_, out) = run_to_string(&[&log]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "timestamp a ");
        assert_eq!(lines[lines.len() - 2], "  minimum  5");
        assert_eq!(lines[lines.len() - 1], "  maximum 20");
    }

    #[test]
    fn no_matching_lines_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "messages", &["T1 n kernel: nothing to see"]);

        let (result, out) = run_to_string(&["--csv", &log]);
        assert_eq!(exit_code(&result), Some(EXIT_FAILURE));
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_timestamp_pattern_exits_with_two() {
        let (result, out) = run_to_string(&["--timestamp", "(", "/nonexistent"]);
        assert_eq!(exit_code(&result), Some(EXIT_BAD_PATTERN));
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_unit_is_an_argument_error() {
        let err = Cli::try_parse_from(["wmp-log-extract", "--unit", "TB"]).err().unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn broken_pipe_is_detected_through_context() {
        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::BrokenPipe)).context("write");
        assert!(is_broken_pipe(&err));
        assert!(!is_broken_pipe(&anyhow::anyhow!("other")));
    }
}
