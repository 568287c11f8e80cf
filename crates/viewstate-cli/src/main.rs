use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use time::OffsetDateTime;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use viewstate_core::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_SPARSE_LENGTH, DecodeOptions, DecodeReport, Viewstate,
    ViewstateError,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("VIEWSTATE_BUILD_COMMIT"),
    ", ",
    env!("VIEWSTATE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "viewstate")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for captured viewstate payloads.",
    long_about = None,
    after_help = "Examples:\n  viewstate decode payload.txt -o report.json\n  viewstate decode --text /wECBQ== --stdout --pretty\n  cat payload.txt | viewstate parse --stdout"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a base64 viewstate payload into a versioned JSON report.
    #[command(alias = "parse")]
    #[command(
        after_help = "Examples:\n  viewstate decode payload.txt -o report.json\n  viewstate decode 'captures/*.txt' --stdout\n  viewstate decode --text /wECBQ== --stdout --strict"
    )]
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// File containing base64 text (glob patterns must match one file); reads stdin when omitted
    #[arg(conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Base64 payload passed inline
    #[arg(long)]
    text: Option<String>,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code unless the signature length matches HMAC-SHA1 or HMAC-SHA256
    #[arg(long)]
    strict: bool,

    /// Maximum nesting depth accepted while decoding
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of sparse array slots allocated across one decode
    #[arg(long, default_value_t = DEFAULT_MAX_SPARSE_LENGTH)]
    max_sparse_length: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<ViewstateError> for CliError {
    fn from(err: ViewstateError) -> Self {
        let hint = match &err {
            ViewstateError::InvalidBase64(_) => {
                Some("input must be standard base64; URL-decode captured form values first")
            }
            ViewstateError::BadPreamble { .. } => {
                Some("payload is not a serialized viewstate (expected ff 01 prefix)")
            }
            ViewstateError::DepthLimitExceeded { .. } => {
                Some("raise --max-depth to decode deeper trees")
            }
            ViewstateError::SparseArrayTooLarge { .. } => {
                Some("raise --max-sparse-length to accept larger sparse arrays")
            }
            _ => None,
        };
        CliError::new(
            format!("viewstate decoding failed: {}", err),
            hint.map(str::to_string),
        )
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    if args.pretty && args.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }

    let (input_label, text) = read_input(&args)?;
    debug!(input = %input_label, chars = text.len(), "read viewstate text");

    let options = DecodeOptions {
        max_depth: args.max_depth,
        max_sparse_length: args.max_sparse_length,
    };
    let mut viewstate = Viewstate::new(&text)?.with_options(options);
    debug!(bytes = viewstate.raw().len(), "base64 payload decoded");

    let mut rep = viewstate_core::build_report(&input_label, &mut viewstate)?;
    rep.generated_at = viewstate_core::format_generated_at(OffsetDateTime::now_utc());
    info!(
        kind = rep.value.kind(),
        signature = %rep.signature.algorithm,
        signature_len = rep.signature.length,
        "viewstate decoded"
    );
    let json = serialize_report(&rep, args.pretty)?;

    if args.stdout {
        println!("{}", json);
        return check_strict(&rep, args.strict);
    }

    let report = args.report.ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--report or --stdout".to_string()),
        )
    })?;
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !args.quiet {
        eprintln!(
            "OK: report written -> {} (signature: {})",
            report.display(),
            rep.signature.algorithm
        );
    }
    check_strict(&rep, args.strict)
}

fn check_strict(rep: &DecodeReport, strict: bool) -> Result<(), CliError> {
    if strict && !rep.signature.algorithm.is_recognized() {
        return Err(CliError::new(
            format!(
                "signature not recognized: {} trailing bytes ({})",
                rep.signature.length, rep.signature.algorithm
            ),
            Some("expected 20 (HMAC-SHA1) or 32 (HMAC-SHA256) trailing bytes".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &DecodeReport, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn read_input(args: &DecodeArgs) -> Result<(String, String), CliError> {
    if let Some(text) = args.text.as_ref() {
        return Ok(("-".to_string(), text.clone()));
    }

    match args.input.as_ref() {
        Some(input) => {
            let resolved = resolve_input_path(input)?;
            validate_input_file(&resolved)?;
            let text = fs::read_to_string(&resolved)
                .with_context(|| format!("Failed to read input file: {}", resolved.display()))?;
            Ok((resolved.display().to_string(), text))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read viewstate text from stdin")?;
            if text.trim().is_empty() {
                return Err(CliError::new(
                    "no input provided",
                    Some("pass a file, use --text, or pipe base64 text on stdin".to_string()),
                ));
            }
            Ok(("-".to_string(), text))
        }
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a file containing base64 viewstate text".to_string()),
        ));
    }
    let meta = fs::metadata(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a file containing base64 viewstate text".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single payload file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
