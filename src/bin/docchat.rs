//! CLI binary for docchat.
//!
//! A thin shim over the library crate: `serve` maps flags to `ChatConfig`
//! and runs the HTTP proxy, `ask` runs one request against local PDFs.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docchat::{ChatConfig, ChatError, ChatOutput, ChatPipeline, Mode};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::{Duration, Instant};
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the proxy on port 4000 (key read from OPENROUTER_API_KEY or .env)
  docchat serve

  # Different port, local interface only
  docchat serve --bind 127.0.0.1 --port 8080

  # Summarise a contract
  docchat ask lease.pdf --tool Summarize

  # Find clauses about a topic
  docchat ask lease.pdf --tool "Clause Finder" --extra termination

  # Ask a question across several documents, with follow-up suggestions
  docchat ask nda.pdf msa.pdf --prompt "Which governing law applies?" --followups

  # Print the JSON envelope the HTTP endpoint would return
  docchat ask lease.pdf --tool "Analyze Risk" --json

TOOLS:
  Summarize            Summarize the document
  Redact               Redact personally identifiable information
  Clause Finder        Find important clauses (optionally about --extra)
  Chat with Document   Chat with the document content
  Analyze Risk         Analyze the legal risk

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY       Bearer credential for the completion endpoint
  DOCCHAT_BASE_URL         OpenAI-compatible base URL (default: https://openrouter.ai/api/v1)
  DOCCHAT_MODEL            Model ID (default: google/gemini-2.0-flash-001)
  DOCCHAT_API_TIMEOUT      Completion deadline in seconds (default: 60)
  DOCCHAT_FOLLOWUPS        Number of follow-up questions (default: 3)
  DOCCHAT_MAX_BODY_BYTES   Request body cap for `serve` (default: 52428800)
  DOCCHAT_BIND             Bind address for `serve` (default: 0.0.0.0)
  PORT                     Port for `serve` (default: 4000)
  RUST_LOG                 Log filter, overrides --verbose / --quiet

  A .env file in the working directory is loaded before flags are parsed.
"#;

/// Chat with legal PDF documents through an LLM completion endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "docchat",
    version,
    about = "Chat with legal PDF documents through an LLM completion endpoint",
    long_about = "Extract text from PDF documents, wrap it in a task prompt (summarise, redact, \
find clauses, analyse risk, or a free-form question) and send it to an OpenAI-compatible \
chat-completions endpoint such as OpenRouter. Runs as an HTTP proxy or as a one-shot command.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// OpenAI-compatible base URL.
    #[arg(long, global = true, env = "DOCCHAT_BASE_URL", default_value = docchat::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Model ID sent with every completion request.
    #[arg(long, global = true, env = "DOCCHAT_MODEL", default_value = docchat::config::DEFAULT_MODEL)]
    model: String,

    /// Bearer credential for the completion endpoint.
    #[arg(long, global = true, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Completion call deadline in seconds.
    #[arg(long, global = true, env = "DOCCHAT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Number of follow-up questions to request (1–10).
    #[arg(long, global = true, env = "DOCCHAT_FOLLOWUPS", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(1..=10))]
    followup_count: u8,

    /// Keep at most this many characters of each document.
    #[arg(long, global = true, env = "DOCCHAT_MAX_DOCUMENT_CHARS")]
    max_document_chars: Option<usize>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCHAT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCHAT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP proxy (`POST /api/chat`, `GET /health`).
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "PORT", default_value_t = 4000)]
        port: u16,

        /// Address to bind.
        #[arg(long, env = "DOCCHAT_BIND", default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Maximum accepted request-body size in bytes.
        #[arg(long, env = "DOCCHAT_MAX_BODY_BYTES",
              default_value_t = docchat::config::DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
    },

    /// Run one request against local PDF files.
    Ask {
        /// PDF files, in the order they should appear in the prompt.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Toolbar action, e.g. "Summarize" or "Clause Finder".
        #[arg(short, long, conflicts_with = "prompt", required_unless_present = "prompt")]
        tool: Option<String>,

        /// Clause term for the clause finder.
        #[arg(short, long, requires = "tool")]
        extra: Option<String>,

        /// Free-form question about the documents.
        #[arg(short, long)]
        prompt: Option<String>,

        /// Ask for follow-up questions and print them.
        #[arg(long)]
        followups: bool,

        /// Print the JSON envelope instead of plain text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is the normal case in production.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO lines would tear through the `ask` spinner; keep them
    // for `serve` and for --verbose.
    let spinner_active = !cli.common.quiet && matches!(cli.command, Command::Ask { .. });
    let filter = if cli.common.verbose {
        "debug"
    } else if cli.common.quiet || spinner_active {
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

    match cli.command {
        Command::Serve {
            port,
            bind,
            max_body_bytes,
        } => {
            let config = build_config(&cli.common, Some(max_body_bytes))?;
            if config.api_key.is_none() {
                tracing::warn!(
                    "OPENROUTER_API_KEY is not set; completion requests will be sent without credentials"
                );
            }
            docchat::serve(config, SocketAddr::new(bind, port))
                .await
                .context("Server failed")?;
        }
        Command::Ask {
            files,
            tool,
            extra,
            prompt,
            followups,
            json,
        } => {
            let mode = match (tool, prompt) {
                (Some(tool), _) => Mode::from_tool(&tool, extra.as_deref()),
                (None, Some(prompt)) if !prompt.trim().is_empty() => Mode::Instruction(prompt),
                _ => bail!("either --tool or a non-empty --prompt is required"),
            };
            let config = build_config(&cli.common, None)?;
            ask(config, files, mode, followups, json, cli.common.quiet).await?;
        }
    }

    Ok(())
}

/// Map CLI args to `ChatConfig`.
fn build_config(common: &CommonArgs, max_body_bytes: Option<usize>) -> Result<ChatConfig> {
    let mut builder = ChatConfig::builder()
        .base_url(&common.base_url)
        .model(&common.model)
        .api_timeout_secs(common.api_timeout)
        .followup_count(common.followup_count as usize);
    if let Some(ref key) = common.api_key {
        builder = builder.api_key(key);
    }
    if let Some(n) = max_body_bytes {
        builder = builder.max_body_bytes(n);
    }
    if let Some(n) = common.max_document_chars {
        builder = builder.max_document_chars(n);
    }
    builder.build().context("Invalid configuration")
}

async fn ask(
    config: ChatConfig,
    paths: Vec<PathBuf>,
    mode: Mode,
    followups: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push((name, bytes));
    }

    let pipeline = ChatPipeline::new(config).context("Failed to build pipeline")?;

    let spinner = (!quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(mode.label());
        bar.set_message(format!("{} document(s)", files.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let start = Instant::now();
    let result = pipeline.ask(files, mode, followups).await;

    if let Some(bar) = spinner {
        match &result {
            Ok(_) => bar.finish_with_message(green("done ✓")),
            Err(_) => bar.finish_with_message(red("failed ✗")),
        }
    }

    let output = match result {
        Ok(output) => output,
        Err(e) if json => {
            println!("{}", serde_json::to_string_pretty(&e.envelope())?);
            return Err(describe(e));
        }
        Err(e) => return Err(describe(e)),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        writeln!(handle, "{text}").context("Failed to write to stdout")?;
    } else {
        write_plain(&mut handle, &output)?;
    }

    if !quiet && !json {
        eprintln!(
            "{}",
            dim(&format!(
                "{} chars in {}ms",
                output.content.len(),
                start.elapsed().as_millis()
            ))
        );
    }

    Ok(())
}

/// Print the content, newline-terminated, then any follow-up questions.
fn write_plain(out: &mut impl Write, output: &ChatOutput) -> Result<()> {
    out.write_all(output.content.as_bytes())
        .context("Failed to write to stdout")?;
    if !output.content.ends_with('\n') {
        out.write_all(b"\n").context("Failed to write to stdout")?;
    }
    if let Some(ref questions) = output.followups {
        if !questions.is_empty() {
            writeln!(out, "\nFollow-up questions:").context("Failed to write to stdout")?;
            for (i, q) in questions.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, q).context("Failed to write to stdout")?;
            }
        }
    }
    Ok(())
}

/// Attach the envelope details to a pipeline error for terminal display.
fn describe(e: ChatError) -> anyhow::Error {
    let details = e.details();
    if details.is_null() {
        anyhow::Error::new(e)
    } else {
        let details = details
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| details.to_string());
        anyhow::Error::new(e).context(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `budget` bytes, then fails every write.
    struct ShortWriter {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.budget {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn output(content: &str, followups: Option<Vec<&str>>) -> ChatOutput {
        ChatOutput {
            content: content.to_string(),
            followups: followups.map(|v| v.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn plain_output_adds_newline_and_followups() {
        let mut out = Vec::new();
        write_plain(&mut out, &output("Summary", Some(vec!["Q1?", "Q2?"]))).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Summary\n\nFollow-up questions:\n  1. Q1?\n  2. Q2?\n"
        );
    }

    #[test]
    fn failed_trailing_newline_is_reported() {
        // The content fits, the newline after it does not.
        let mut out = ShortWriter {
            written: Vec::new(),
            budget: 7,
        };
        let err = write_plain(&mut out, &output("Summary", None)).unwrap_err();
        assert!(err.to_string().contains("Failed to write to stdout"), "{err:#}");
        assert_eq!(out.written, b"Summary");
    }
}
