//! Subprocess-backed extractor.
//!
//! # Responsibility
//! - Spawn the configured extraction program for each request.
//! - Speak the stdin/stdout JSON protocol: `{"text": ...}` in,
//!   `{"result": [...]}` out.
//!
//! # Invariants
//! - One process per request; no process is reused or left running.
//! - Request text is never logged; only sizes and outcome are.

use super::{AnnotationExtractor, ExtractError, ExtractResult};
use crate::model::candidate::{coerce_candidates, ExtractionCandidate};
use log::{info, warn};
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
}

/// Runs an external program per extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessExtractor {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl SubprocessExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Runs the program from `dir`, for scripts that read their taxonomy
    /// relative to the working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, text: &str) -> ExtractResult<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let payload = serde_json::to_vec(&ExtractRequest { text })?;
        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload) {
                // The program stopped reading; its exit status decides.
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
                Ok(()) => {}
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ExtractError::ExitStatus {
                code: output.status.code(),
            });
        }
        Ok(output.stdout)
    }
}

impl AnnotationExtractor for SubprocessExtractor {
    fn extract(&self, text: &str) -> ExtractResult<Vec<ExtractionCandidate>> {
        let started_at = Instant::now();
        let stdout = match self.run(text) {
            Ok(stdout) => stdout,
            Err(err) => {
                warn!(
                    "event=extract module=extract status=error backend=subprocess duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let response: serde_json::Value = serde_json::from_slice(&stdout)?;
        let candidates = coerce_candidates(&response);
        info!(
            "event=extract module=extract status=ok backend=subprocess duration_ms={} text_chars={} candidates={}",
            started_at.elapsed().as_millis(),
            text.chars().count(),
            candidates.len()
        );
        Ok(candidates)
    }
}
