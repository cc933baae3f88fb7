//! biggity - ticket-based backup
//!
//! Backs up a mounted volume into `<dest-root>/<ticket>_<name>`, splitting
//! Windows user profiles from the rest of the drive.

use biggity::{
    BackupOptions, BackupStats, CopyStats, Error as BiggityError, FailureKind, FailurePolicy,
    Reporter, SkipReason, TracingReporter, backup, create_spinner, fix_attributes,
    sync_filesystems,
};
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

const B_IN_KB: u64 = 1024;
const LOG_FILE_NAME: &str = "backup.log";

/// biggity - Backup a customer drive into a ticket directory
///
/// Every value not given on the command line is asked for interactively.
///
/// Usage:
///   biggity [SOURCE]
///   biggity SOURCE --dest-root DIR --ticket 1234 --name "Doe, John" --yes --no-wait
#[derive(Parser, Debug)]
#[command(name = "biggity", version, about, long_about = None)]
struct Args {
    /// Source mountpoint (offered as the default at the prompt)
    source: Option<PathBuf>,

    /// Directory the ticket directory is created in
    #[arg(short = 'd', long, value_name = "DIR")]
    dest_root: Option<PathBuf>,

    /// Ticket number
    #[arg(short = 't', long)]
    ticket: Option<String>,

    /// Customer name ("last, first")
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Continue without asking when the ticket directory already exists
    #[arg(short = 'y', long)]
    yes: bool,

    /// Stop on the first file that cannot be copied
    ///
    /// Filenames that are too long for the destination are always skipped.
    #[arg(long)]
    abort_on_error: bool,

    /// Do not make the copied files readable and writable afterwards
    #[arg(long)]
    no_fix_attrs: bool,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_fsync: bool,

    /// Show a spinner and only print warnings to the console
    #[arg(short = 'p', long)]
    progress: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Exit without waiting for Enter
    #[arg(long)]
    no_wait: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("No input left while asking for {what}")]
    InputClosed { what: String },

    #[error("Failed to read input: {source}")]
    Prompt { source: io::Error },

    #[error("Terminating...")]
    Declined,

    #[error("Failed to create directory: {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Failed to open log file: {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },

    #[error("Failed to initialize logging: {source}")]
    Logging { source: TryInitError },

    #[error("Backup failed: {source}")]
    Backup { source: BiggityError },

    #[error("Failed to fix file attributes: {path}: {source}")]
    FixAttributes { path: PathBuf, source: BiggityError },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

/// Line-based question and answer over any reader/writer pair.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and return the answer without its line ending.
    fn ask(&mut self, question: &str, what: &str) -> CliResult<String> {
        write!(self.output, "{question}").map_err(|source| CliError::Prompt { source })?;
        self.output
            .flush()
            .map_err(|source| CliError::Prompt { source })?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|source| CliError::Prompt { source })?;
        if read == 0 {
            return Err(CliError::InputClosed {
                what: what.to_string(),
            });
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) -> CliResult<()> {
        writeln!(self.output, "{message}").map_err(|source| CliError::Prompt { source })
    }

    /// Ask until the answer (or `default` for an empty answer) is an
    /// existing directory. A `given` directory that exists skips the prompt.
    fn directory(
        &mut self,
        label: &str,
        what: &str,
        given: Option<&Path>,
        default: Option<&Path>,
    ) -> CliResult<PathBuf> {
        if let Some(path) = given {
            if path.is_dir() {
                return Ok(path.to_path_buf());
            }
            self.say(&format!("{label} {} does not exist", path.display()))?;
        }

        let default = given.or(default);
        let shown = default.map(display_path).unwrap_or_default();
        loop {
            let answer = self.ask(&format!("{what} ({shown}): "), what)?;
            let candidate = if answer.is_empty() {
                default.map(Path::to_path_buf)
            } else {
                Some(PathBuf::from(answer))
            };

            match candidate {
                Some(path) if path.is_dir() => return Ok(path),
                Some(path) => self.say(&format!("{label} {} does not exist", path.display()))?,
                None => self.say("Input must not be blank")?,
            }
        }
    }

    /// Ask until the answer is not blank. A non-blank `given` value skips the
    /// prompt.
    fn text(&mut self, what: &str, given: Option<&str>) -> CliResult<String> {
        if let Some(value) = given.map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(value.to_string());
        }

        loop {
            let answer = self.ask(&format!("{what}: "), what)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            self.say("Input must not be blank")?;
        }
    }

    /// `true` only for an answer of `y` or `Y`.
    fn confirm(&mut self, question: &str) -> CliResult<bool> {
        self.say(question)?;
        let answer = self.ask("", "confirmation")?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Logs every copy event and moves the spinner along.
struct CliReporter {
    log: TracingReporter,
    spinner: Option<ProgressBar>,
}

impl Reporter for CliReporter {
    fn copy_started(&self, src: &Path, dst: &Path, size: u64) {
        self.log.copy_started(src, dst, size);
        if let Some(pb) = &self.spinner {
            pb.set_message(display_path(src));
        }
    }

    fn copy_finished(&self, _src: &Path, _dst: &Path, bytes: u64) {
        if let Some(pb) = &self.spinner {
            pb.inc(bytes);
        }
    }

    fn copy_failed(&self, src: &Path, dst: &Path, kind: FailureKind, error: &BiggityError) {
        self.log.copy_failed(src, dst, kind, error);
    }

    fn attributes_failed(&self, path: &Path, error: &io::Error) {
        self.log.attributes_failed(path, error);
    }

    fn entry_skipped(&self, path: &Path, reason: SkipReason) {
        self.log.entry_skipped(path, reason);
    }

    fn notice(&self, message: &str) {
        self.log.notice(message);
    }
}

fn main() {
    let args = Args::parse();

    let code = match run(&args) {
        Ok(()) => 0,
        Err(error) => {
            if tracing::dispatcher::has_been_set() {
                tracing::error!("error: {error}");
            } else {
                eprintln!("error: {error}");
            }
            1
        }
    };

    if !args.no_wait {
        wait_for_enter();
    }
    std::process::exit(code);
}

fn run(args: &Args) -> CliResult<()> {
    let mut prompter = Prompter::new(io::stdin().lock(), io::stderr());

    let source = prompter.directory("Source", "Source mountpoint", args.source.as_deref(), None)?;
    let default_root = default_dest_root();
    let dest_root = prompter.directory(
        "Destination",
        "Location",
        args.dest_root.as_deref(),
        default_root.as_deref(),
    )?;
    let ticket = prompter.text("Ticket number", args.ticket.as_deref())?;
    let name = prompter.text("Customer name (last, first)", args.name.as_deref())?;

    let backup_dir = backup_dir_for(&dest_root, &ticket, &name);
    if backup_dir.is_dir()
        && !args.yes
        && !prompter.confirm(&format!(
            "Destination directory {} already exists, continue? (y/N)",
            backup_dir.display()
        ))?
    {
        return Err(CliError::Declined);
    }
    drop(prompter);

    fs::create_dir_all(&backup_dir).map_err(|source| CliError::CreateDirectory {
        path: backup_dir.clone(),
        source,
    })?;
    init_logging(&backup_dir.join(LOG_FILE_NAME), args.progress)?;

    let mut options = BackupOptions::default();
    if args.abort_on_error {
        options = options.with_failure_policy(FailurePolicy::Abort);
    }
    if args.no_fsync {
        options = options.without_fsync();
    }

    let reporter = CliReporter {
        log: TracingReporter,
        spinner: args.progress.then(create_spinner),
    };

    let result = backup(&source, &backup_dir, &options, &reporter);
    if let Some(pb) = &reporter.spinner {
        pb.finish_and_clear();
    }
    let stats = result.map_err(|source| CliError::Backup { source })?;

    tracing::info!("Transferred {}MB(s)", stats.bytes_copied() / B_IN_KB / B_IN_KB);
    if stats.files_failed() > 0 {
        tracing::warn!(
            "{} file(s) could not be copied, see {}",
            stats.files_failed(),
            backup_dir.join(LOG_FILE_NAME).display()
        );
    }

    if !args.no_fix_attrs {
        tracing::info!("Fixing file attributes...");
        fix_attributes(&backup_dir, &reporter).map_err(|source| CliError::FixAttributes {
            path: backup_dir.clone(),
            source,
        })?;
    }

    if cfg!(unix) {
        tracing::info!("Syncing unwritten data...");
        sync_filesystems();
    }

    tracing::info!("Backup complete, verify size!");

    if args.output == OutputMode::Json {
        print_json_value(&summary_json(&source, &backup_dir, &ticket, &name, &stats))?;
    }
    Ok(())
}

/// Default location offered at the prompt.
fn default_dest_root() -> Option<PathBuf> {
    if cfg!(windows) {
        Some(PathBuf::from("X:\\"))
    } else if cfg!(target_os = "linux") {
        Some(PathBuf::from("/zfspool/"))
    } else {
        None
    }
}

fn backup_dir_for(dest_root: &Path, ticket: &str, name: &str) -> PathBuf {
    dest_root.join(format!("{ticket}_{name}"))
}

/// Send log lines to stderr and append them to `log_path`.
///
/// The console honors `RUST_LOG` and drops to warnings with `quiet_console`;
/// the log file always gets `INFO` and above.
fn init_logging(log_path: &Path, quiet_console: bool) -> CliResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| CliError::LogFile {
            path: log_path.to_path_buf(),
            source,
        })?;

    let console_filter = if quiet_console {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(console_filter);
    let log_file = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(console)
        .with(log_file)
        .try_init()
        .map_err(|source| CliError::Logging { source })
}

fn pass_json(stats: &CopyStats) -> Value {
    json!({
        "files_copied": stats.files_copied,
        "files_failed": stats.files_failed,
        "dirs_created": stats.dirs_created,
        "bytes_copied": stats.bytes_copied,
        "duration_ms": stats.duration.as_millis() as u64,
    })
}

fn summary_json(
    source: &Path,
    backup_dir: &Path,
    ticket: &str,
    name: &str,
    stats: &BackupStats,
) -> Value {
    json!({
        "status": "ok",
        "mode": stats.mode.as_str(),
        "source": display_path(source),
        "destination": display_path(backup_dir),
        "ticket": ticket,
        "name": name,
        "bytes_copied": stats.bytes_copied(),
        "mb_copied": stats.bytes_copied() / B_IN_KB / B_IN_KB,
        "files_copied": stats.files_copied(),
        "files_failed": stats.files_failed(),
        "passes": {
            "profile": stats.profile.as_ref().map(pass_json),
            "root": pass_json(&stats.root),
        },
    })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn wait_for_enter() {
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
