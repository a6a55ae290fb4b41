use crate::logging::{self, LogTarget};
use crate::model::{ClientConfig, SubmitEvent};
use crate::orchestrator::{SubmissionController, SubmissionForm};
use crate::render::DashboardView;
use crate::transport::HttpTransport;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1/analyze";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "ahp-profiler",
    version,
    about = "Submit a transcript to the AHP profiling service and view the ranked profiles"
)]
pub struct Cli {
    /// Analysis endpoint (multipart POST)
    #[arg(long, env = "AHP_PROFILER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Transcript document to submit (PDF)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Foundation weight, sent as entered
    #[arg(long, default_value = "0.2", allow_hyphen_values = true)]
    pub w_foundation: String,

    /// Competency weight, sent as entered
    #[arg(long, default_value = "0.5", allow_hyphen_values = true)]
    pub w_competency: String,

    /// Density weight, sent as entered
    #[arg(long, default_value = "0.3", allow_hyphen_values = true)]
    pub w_density: String,

    /// Reject weights that do not sum to 1.0 (±0.01) before submitting
    #[arg(long)]
    pub check_weight_sum: bool,

    /// Print the analysis result as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors
    #[arg(long)]
    pub silent: bool,

    /// TCP/TLS connect timeout
    #[arg(long, default_value = "10s")]
    pub connect_timeout: humantime::Duration,

    /// Path to a custom TLS certificate file (PEM or DER format)
    #[arg(long)]
    pub certificate: Option<PathBuf>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, env = "AHP_PROFILER_LOG", default_value = "warn")]
    pub log_level: String,

    /// Write logs to this file instead of stderr (required for logs in TUI mode)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Submit the prefilled form as soon as the TUI starts
    #[arg(long)]
    pub submit_on_launch: bool,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !(self.silent || self.json || self.text)
    }

    /// Initial form contents taken from the command line.
    pub fn form(&self) -> SubmissionForm {
        SubmissionForm {
            document: self.file.clone(),
            w_foundation: self.w_foundation.clone(),
            w_competency: self.w_competency.clone(),
            w_density: self.w_density.clone(),
        }
    }
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        endpoint: args.endpoint.clone(),
        user_agent: format!("ahp-profiler-cli/{}", env!("CARGO_PKG_VERSION")),
        connect_timeout_ms: Duration::from(args.connect_timeout).as_millis() as u64,
        certificate_path: args.certificate.clone(),
        check_weight_sum: args.check_weight_sum,
    }
}

fn log_target(args: &Cli) -> LogTarget {
    match (&args.log_file, args.is_interactive()) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent can only be used with --json
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    logging::init(&args.log_level, &log_target(&args)).context("initialize logging")?;

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_once(args, OutputMode::Text).await;
        }
    }

    if args.json {
        let mode = if args.silent {
            OutputMode::Silent
        } else {
            OutputMode::Json
        };
        return run_once(args, mode).await;
    }

    run_once(args, OutputMode::Text).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
    Silent,
}

/// Run a single submission cycle and print the outcome.
async fn run_once(args: Cli, mode: OutputMode) -> Result<()> {
    if args.file.is_none() {
        return Err(anyhow::anyhow!("--file is required with --text or --json"));
    }
    let cfg = build_config(&args);
    let transport = HttpTransport::new(&cfg)?;

    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SubmitEvent>();
    let mut controller = SubmissionController::new(transport, cfg.check_weight_sum, evt_tx);
    let mut view = DashboardView::default();

    let result = controller.submit(&args.form(), &mut view).await?;

    let mut completed_at = None;
    while let Ok(ev) = evt_rx.try_recv() {
        if let SubmitEvent::Completed { completed_at: ts, .. } = ev {
            completed_at = Some(ts);
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Silent => {}
        OutputMode::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        }
        OutputMode::Text => {
            let summary =
                crate::text_summary::build_text_summary(&view, &result, completed_at.as_deref())?;
            for line in summary.lines {
                writeln!(out, "{line}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_defaults() {
        let args = Cli::parse_from(["ahp-profiler", "--file", "t.pdf", "--text"]);
        assert_eq!(args.endpoint, DEFAULT_ENDPOINT);
        let form = args.form();
        assert_eq!(form.w_foundation, "0.2");
        assert_eq!(form.w_competency, "0.5");
        assert_eq!(form.w_density, "0.3");
        assert_eq!(form.document, Some(PathBuf::from("t.pdf")));
        assert!(!args.is_interactive());
    }

    #[test]
    fn config_carries_timeout_and_user_agent() {
        let args = Cli::parse_from(["ahp-profiler", "--connect-timeout", "1500ms"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.connect_timeout_ms, 1500);
        assert!(cfg.user_agent.starts_with("ahp-profiler-cli/"));
        assert!(args.is_interactive());
    }

    #[test]
    fn tui_logs_nowhere_without_log_file() {
        let args = Cli::parse_from(["ahp-profiler"]);
        assert!(matches!(log_target(&args), LogTarget::Off));
        let args = Cli::parse_from(["ahp-profiler", "--json", "--log-file", "x.log"]);
        assert!(matches!(log_target(&args), LogTarget::File(_)));
    }

    #[tokio::test]
    async fn silent_requires_json() {
        let args = Cli::parse_from(["ahp-profiler", "--silent"]);
        let err = run(args).await.unwrap_err();
        assert!(err.to_string().contains("--silent can only be used with --json"));
    }
}
