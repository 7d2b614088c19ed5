//! Date extraction boundary.
//!
//! The calendar never parses dates itself. A [`DateExtractor`] turns free
//! text into a [`DateRange`]; [`ProcessDateExtractor`] does so by running an
//! external program that prints
//!
//! ```json
//! {"start": "2024-05-01 10:00:00", "end": "2024-05-01 12:00:00", "error": ""}
//! ```
//!
//! on stdout. A non-empty `error` means the text held no date.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{errors::ExtractionError, models::DateRange};

/// Default extractor timeout
pub const DEFAULT_EXTRACTOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns free text into a start/end pair.
#[async_trait]
pub trait DateExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<DateRange, ExtractionError>;
}

/// Runs `program [args..] <text>` and parses its JSON output.
#[derive(Debug, Clone)]
pub struct ProcessDateExtractor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessDateExtractor {
    /// # Arguments
    ///
    /// * `program` - Executable to run, e.g. `python3`
    /// * `args` - Arguments placed before the text, e.g. `["./main.py"]`
    /// * `timeout` - How long to wait before killing the process
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl DateExtractor for ProcessDateExtractor {
    async fn extract(&self, text: &str) -> Result<DateRange, ExtractionError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ExtractionError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        log::debug!("Date extractor output: {} bytes", output.stdout.len());
        parse_output(&output.stdout)
    }
}

#[derive(Deserialize)]
struct ExtractorOutput {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    error: String,
}

/// Parse the JSON printed by an extractor process.
pub fn parse_output(stdout: &[u8]) -> Result<DateRange, ExtractionError> {
    let parsed: ExtractorOutput = serde_json::from_slice(stdout)?;

    if !parsed.error.is_empty() {
        return Err(ExtractionError::NoDate(parsed.error));
    }
    if parsed.start.is_empty() || parsed.end.is_empty() {
        return Err(ExtractionError::NoDate("extractor returned no dates".to_string()));
    }

    Ok(DateRange {
        start: parsed.start,
        end: parsed.end,
    })
}
