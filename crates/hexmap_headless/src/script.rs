//! Command scripts: JSON-lines files replayed against a fresh session.
//!
//! A script uses the same command objects as the interactive protocol, one per
//! line. Blank lines and `#` comments are skipped. Replaying a script with a
//! fixed dice seed must always end in the same state hash, which is what
//! [`verify_script`] checks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{HeadlessError, Result};
use crate::protocol::{Command, Response};
use crate::runner::{HeadlessConfig, HeadlessRunner};

/// A parsed command script.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Where the script was read from.
    pub path: PathBuf,
    /// Commands in file order.
    pub commands: Vec<Command>,
}

/// Outcome of one replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Combat round after the last command.
    pub final_round: u32,
    /// State hash after the last command.
    pub final_hash: u64,
    /// Every response, in order.
    pub responses: Vec<Response>,
}

impl ReplayOutcome {
    /// Number of commands the editor rejected.
    pub fn error_count(&self) -> usize {
        self.responses
            .iter()
            .filter(|r| matches!(r, Response::Error { .. }))
            .count()
    }
}

impl Script {
    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HeadlessError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parse script text. `path` is only used for error reporting.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut commands = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cmd = Command::from_json(line).map_err(|source| HeadlessError::Script {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            commands.push(cmd);
        }
        debug!(path = %path.display(), commands = commands.len(), "script parsed");
        Ok(Self {
            path: path.to_path_buf(),
            commands,
        })
    }

    /// Replay the script on `runner`, stopping early at `quit`.
    pub fn replay_on(&self, runner: &mut HeadlessRunner) -> ReplayOutcome {
        let mut responses = Vec::new();
        for cmd in &self.commands {
            responses.extend(runner.execute(cmd));
            if runner.is_finished() {
                break;
            }
        }
        ReplayOutcome {
            final_round: runner.editor().combat().session().round(),
            final_hash: runner.editor().state_hash(),
            responses,
        }
    }

    /// Replay the script on a fresh session.
    pub fn replay(&self, config: &HeadlessConfig) -> ReplayOutcome {
        let mut runner = HeadlessRunner::new(config.clone());
        let outcome = self.replay_on(&mut runner);
        info!(
            path = %self.path.display(),
            hash = outcome.final_hash,
            errors = outcome.error_count(),
            "script replayed"
        );
        outcome
    }
}

/// Replay `script` `runs` times and require identical final hashes.
///
/// The config should carry a seed. Without one every run rolls different dice.
pub fn verify_script(script: &Script, config: &HeadlessConfig, runs: usize) -> Result<u64> {
    let hashes: Vec<u64> = (0..runs.max(2))
        .map(|_| script.replay(config).final_hash)
        .collect();

    let first = hashes[0];
    if hashes.iter().all(|&h| h == first) {
        info!(hash = first, runs = hashes.len(), "replay is deterministic");
        Ok(first)
    } else {
        Err(HeadlessError::NonDeterministic(hashes))
    }
}
