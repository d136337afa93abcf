//! Purpose: `tailtrim` CLI entry point.
//! Role: Binary crate root; resolves the root directory, runs the walk, reports progress.
//! Invariants: Stdout carries only the prompt, per-file progress, and the completion line.
//! Invariants: Non-interactive errors are emitted as JSON on stderr unless `--color always`.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

use tailtrim::core::error::{Error, ErrorKind, to_exit_code};
use tailtrim::core::walk::{DEFAULT_SUFFIX, WalkOptions, WalkReport, trim_tree};

const PROMPT: &str = "Directory path: ";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::with_code(0));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `tailtrim --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let options = WalkOptions {
        suffix: cli.suffix,
        dry_run: cli.dry_run,
    };

    let result = match cli.root {
        Some(root) => Ok(root),
        None => prompt_for_root(),
    }
    .and_then(|root| run_walk(&root, &options));

    result
        .map(|_| RunOutcome::ok())
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "tailtrim",
    version,
    about = "Remove the last line of every matching file under a directory",
    long_about = None,
    after_help = r#"EXAMPLES
  $ tailtrim runs/                      # trim every *.samples file under runs/
  $ tailtrim runs/ --suffix .log        # trim *.log files instead
  $ tailtrim runs/ --dry-run            # list what would be trimmed
  $ tailtrim                            # prompt for the directory on stdin

Each run removes exactly one line per file, whatever that line contains.
Set RUST_LOG=debug for per-file diagnostics on stderr."#
)]
struct Cli {
    #[arg(
        help = "Directory to scan recursively (prompted for when omitted)",
        value_hint = ValueHint::DirPath
    )]
    root: Option<PathBuf>,
    #[arg(
        long,
        default_value = DEFAULT_SUFFIX,
        help = "File-name suffix that selects files to trim"
    )]
    suffix: String,
    #[arg(long, help = "Report matching files without modifying them")]
    dry_run: bool,
    #[arg(
        long,
        default_value = "auto",
        help = "Colorize error labels; `always` also forces text errors off a terminal"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn prompt_for_root() -> Result<PathBuf, Error> {
    let mut stdout = io::stdout();
    write!(stdout, "{PROMPT}")
        .and_then(|_| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write prompt")
                .with_source(err)
        })?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read directory path from stdin")
            .with_source(err)
    })?;

    let root = line.trim_end_matches(['\r', '\n']);
    if root.is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("no directory path given")
            .with_hint("Type a directory path at the prompt, or pass it as an argument."));
    }
    Ok(PathBuf::from(root))
}

fn run_walk(root: &Path, options: &WalkOptions) -> Result<WalkReport, Error> {
    let label = if options.dry_run {
        "would trim"
    } else {
        "processing file"
    };
    let report = trim_tree(root, options, |path| {
        println!("{label}: {}", path.display());
    })?;
    println!(
        "processing complete: {} matched, {} trimmed, {} empty",
        report.matched, report.trimmed, report.empty
    );
    Ok(report)
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error: ").to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check that the path exists and is spelled correctly."),
        ErrorKind::Permission => {
            err.with_hint("Permission denied. Check read/write permissions on the file and its directory.")
        }
        ErrorKind::Encoding => err.with_hint(
            "Only UTF-8 text files can be trimmed. Files processed before this one were already modified.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty || matches!(color_mode, ColorMode::Always) {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        format!(
            "{{\"error\":{{\"kind\":\"{:?}\",\"message\":\"json encode failed\"}}}}",
            err.kind()
        )
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Encoding => "invalid text encoding".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
