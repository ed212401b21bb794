//! Claude Code CLI backend.
//!
//! Runs `claude -p` once per request and reads its buffered output. The CLI
//! has no token accounting, so the metrics line only gets timing and, when the
//! CLI prints one, a cost.

use crate::provider::CompletionProvider;
use crate::safety;
use crate::{CompletionRequest, Error, Response, StreamEvent, Usage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const DEFAULT_PROGRAM: &str = "claude";

const PROVIDER_NAME: &str = "Claude Code";

const INSTALL_HINT: &str =
    "Claude CLI not found. Install with: npm install -g @anthropic-ai/claude-code";

static COST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9]+(?:\.[0-9]+)?)").expect("cost pattern is valid"));

pub struct ClaudeCliProvider {
    program: PathBuf,
    timeout: Duration,
}

impl ClaudeCliProvider {
    /// Use a specific executable instead of `claude` from `PATH`.
    pub fn with_program(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn build_args(request: &CompletionRequest) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            "--model".to_string(),
            request.model.clone(),
        ];
        if let Some(system) = request.system_prompt() {
            args.push("--append-system-prompt".to_string());
            args.push(system);
        }
        args.push(request.user_prompt());
        args
    }

    /// First dollar amount on a stderr line that mentions a cost.
    fn parse_cost(stderr: &str) -> Option<f64> {
        stderr
            .lines()
            .filter(|line| line.contains("Cost") || line.contains('$'))
            .find_map(|line| COST_PATTERN.captures(line)?.get(1)?.as_str().parse().ok())
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::provider(PROVIDER_NAME, INSTALL_HINT)
        } else {
            Error::provider(
                PROVIDER_NAME,
                format!("failed to start {}: {err}", self.program.display()),
            )
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ClaudeCliProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Response, Error> {
        if request.stream {
            debug!("claude CLI output is buffered; streaming request served in one piece");
        }
        if request.provider_order.is_some() {
            debug!("provider order is not supported by the claude CLI and is ignored");
        }

        let args = Self::build_args(request);
        debug!(program = %self.program.display(), model = %request.model, "running claude CLI");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?
            .map_err(|e| Error::provider(PROVIDER_NAME, e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let message = match stderr.trim() {
                "" => format!("claude exited with {}", output.status),
                trimmed => trimmed.to_string(),
            };
            return Err(Error::provider(PROVIDER_NAME, message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = safety::flag_destructive(stdout.trim()).into_owned();

        let mut events = vec![
            StreamEvent::metadata(Some(request.model.clone()), Some(PROVIDER_NAME.to_string())),
            StreamEvent::delta(text),
        ];
        if let Some(cost) = Self::parse_cost(&stderr) {
            events.push(StreamEvent::Usage {
                usage: Usage::cost_only(cost),
            });
        }
        events.push(StreamEvent::Done);

        Ok(Response::from_events(events))
    }
}
