//! CLI binary for pdf-unlock.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `UnlockConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_unlock::config::DEFAULT_DOWNLOAD_TIMEOUT_SECS;
use pdf_unlock::pipeline::input::{is_url, unlocked_file_name};
use pdf_unlock::{
    inspect, unlock_envelope, unlock_to_file, DictionaryTier, Method, ProgressCallback,
    UnlockConfig, UnlockProgressCallback,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner showing the current strategy and
/// candidate, plus one log line per strategy that gives up.
struct CliProgressCallback {
    bar: ProgressBar,
    failures: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            failures: AtomicUsize::new(0),
        })
    }
}

impl UnlockProgressCallback for CliProgressCallback {
    fn on_unlock_start(&self, input_bytes: usize, candidates: usize) {
        self.bar.set_message(format!(
            "{input_bytes} bytes, {candidates} candidate passwords"
        ));
    }

    fn on_strategy_start(&self, method: Method) {
        self.bar.set_prefix(format!("{} ({})", method, method.label()));
        self.bar.set_message("starting…");
    }

    fn on_attempt(&self, _method: Method, index: usize, total: usize) {
        self.bar.set_message(format!("password {index}/{total}"));
    }

    fn on_strategy_failed(&self, method: Method, error: &str) {
        self.failures.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} {:<10}  {}",
            red("✗"),
            method.to_string(),
            dim(&msg)
        ));
    }

    fn on_unlock_complete(&self, method: Option<Method>) {
        self.bar.finish_and_clear();
        match method {
            Some(m) => eprintln!(
                "{} unlocked with {} ({})",
                green("✔"),
                bold(m.as_str()),
                m.label()
            ),
            None => eprintln!(
                "{} all {} strategies failed",
                red("✘"),
                self.failures.load(Ordering::SeqCst)
            ),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Unlock next to the input (writes report-unlocked.pdf)
  pdfunlock report.pdf

  # Choose the output path and give a password hint
  pdfunlock --password quarterly report.pdf -o plain.pdf

  # Bigger dictionary plus your own wordlist
  pdfunlock --extended --wordlist words.txt report.pdf

  # Years, short numbers and letters too, but stop after two minutes
  pdfunlock --exhaustive --timeout 120 report.pdf

  # Skip qpdf even when it is installed
  pdfunlock --no-external-tool report.pdf

  # Unlock from URL
  pdfunlock https://example.com/locked.pdf -o unlocked.pdf

  # Inspect PDF metadata
  pdfunlock --inspect-only report.pdf

  # JSON envelope on stdin, JSON response on stdout
  echo '{"pdf_data":"JVBERi0..."}' | pdfunlock --envelope

STRATEGIES (tried in order, first success wins):
  strategy-A   qpdf --decrypt, once per candidate password
  strategy-B   in-process decryption, once per candidate password
  strategy-C   copy every page into a fresh unencrypted document

ENVIRONMENT VARIABLES:
  PDFUNLOCK_QPDF          Path to the qpdf program
  PDFUNLOCK_PASSWORD      Password hint tried first
  RUST_LOG                Override the log filter (e.g. pdf_unlock=trace)
"#;

/// Remove password protection from PDF files and URLs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfunlock",
    version,
    about = "Remove password protection from PDF files and URLs",
    long_about = "Remove password protection from PDF documents (local files or URLs). \
Tries the qpdf tool, then in-process decryption with a dictionary of common passwords, \
then rebuilds the document page by page. Owner-restricted PDFs always unlock; \
user-password PDFs unlock when the password is guessable.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "envelope")]
    input: Option<String>,

    /// Write the unlocked PDF here instead of <stem>-unlocked.pdf.
    #[arg(short, long, env = "PDFUNLOCK_OUTPUT")]
    output: Option<PathBuf>,

    /// Read a JSON request envelope on stdin and write the JSON response on stdout.
    #[arg(long, conflicts_with_all = ["input", "inspect_only"])]
    envelope: bool,

    /// Password hint, tried before the dictionary.
    #[arg(long, env = "PDFUNLOCK_PASSWORD")]
    password: Option<String>,

    /// File with extra candidate passwords, one per line.
    #[arg(long, env = "PDFUNLOCK_WORDLIST")]
    wordlist: Option<PathBuf>,

    /// Use the extended dictionary (common passwords plus variations).
    #[arg(long, env = "PDFUNLOCK_EXTENDED")]
    extended: bool,

    /// Use the exhaustive dictionary (extended plus years and short patterns).
    #[arg(long, env = "PDFUNLOCK_EXHAUSTIVE", conflicts_with = "extended")]
    exhaustive: bool,

    /// qpdf program used by strategy A.
    #[arg(long, env = "PDFUNLOCK_QPDF", default_value = "qpdf")]
    qpdf: PathBuf,

    /// Skip strategy A (qpdf).
    #[arg(long, env = "PDFUNLOCK_NO_EXTERNAL_TOOL")]
    no_external_tool: bool,

    /// Kill each qpdf invocation after this many seconds.
    #[arg(long, env = "PDFUNLOCK_TOOL_TIMEOUT")]
    tool_timeout: Option<u64>,

    /// Give up on the whole unlock after this many seconds.
    #[arg(long, env = "PDFUNLOCK_TIMEOUT")]
    timeout: Option<u64>,

    /// Directory for strategy A temporaries (default: system temp dir).
    #[arg(long, env = "PDFUNLOCK_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(
        long,
        env = "PDFUNLOCK_DOWNLOAD_TIMEOUT",
        default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS
    )]
    download_timeout: u64,

    /// Print PDF metadata only, no unlocking.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report instead of text.
    #[arg(long, env = "PDFUNLOCK_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "PDFUNLOCK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFUNLOCK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFUNLOCK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.envelope;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || cli.envelope {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Envelope mode ────────────────────────────────────────────────────
    if cli.envelope {
        let config = build_config(&cli, None).await?;
        let mut request = String::new();
        io::stdin()
            .read_to_string(&mut request)
            .context("Failed to read envelope from stdin")?;

        let response = unlock_envelope(&request, &config).await;
        println!(
            "{}",
            serde_json::to_string(&response).context("Failed to serialise response")?
        );
        if !response.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input path or URL is required")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None).await?;
        let meta = inspect(&input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            println!("Encrypted:    {}", meta.is_encrypted);
            if meta.is_encrypted {
                println!("User pw:      {}", meta.requires_user_password);
            }
            println!("Size:         {} bytes", meta.file_size);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn UnlockProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run unlock ───────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input));

    let report = unlock_to_file(&input, &output_path, &config)
        .await
        .context("Unlock failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!("{}", report.message);
        eprintln!(
            "{}  {}  {}ms  →  {}",
            green("✔"),
            report.method,
            report.duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} bytes in  /  {} bytes out",
            dim(&report.input_bytes.to_string()),
            dim(&report.output_bytes.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `UnlockConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<UnlockConfig> {
    let extra = if let Some(ref path) = cli.wordlist {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read wordlist from {:?}", path))?;
        parse_wordlist(&text)
    } else {
        Vec::new()
    };

    let mut builder = UnlockConfig::builder()
        .extra_passwords(extra)
        .dictionary(if cli.exhaustive {
            DictionaryTier::Exhaustive
        } else if cli.extended {
            DictionaryTier::Extended
        } else {
            DictionaryTier::Common
        })
        .external_tool(!cli.no_external_tool)
        .qpdf_program(cli.qpdf.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pw) = cli.password {
        builder = builder.password(pw.clone());
    }
    if let Some(secs) = cli.tool_timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.pipeline_timeout_secs(secs);
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One candidate per line; blank lines are skipped.
fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `<stem>-unlocked.pdf` next to a local input, or in the working directory
/// for a URL.
fn default_output_path(input: &str) -> PathBuf {
    if is_url(input) {
        let name = input
            .rsplit('/')
            .next()
            .and_then(|seg| seg.split(['?', '#']).next())
            .unwrap_or_default();
        return PathBuf::from(unlocked_file_name(name));
    }

    let path = Path::new(input);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(unlocked_file_name(&name))
}
