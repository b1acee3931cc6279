use anyhow::{bail, Result};
use std::path::PathBuf;

const DEFAULT_AGENT_CMD: &str = "claude -p";
const DEFAULT_RESUME_FLAG: &str = "--resume";
const DEFAULT_MAX_JUDGE_RETRIES: u32 = 2;
const MAX_JUDGE_RETRIES_CEILING: u32 = 10;
const HISTORY_FILE_NAME: &str = ".roundtable_history";

/// Tool configuration, loaded from environment variables.
///
/// Each workflow role shells out to an external AI-assistant CLI. A role
/// command is a whitespace-split command line (no shell quoting); the prompt
/// is written to the subprocess's stdin.
#[derive(Debug, Clone)]
pub struct Config {
    pub planner_cmd: String,
    pub reviewer_cmd: String,
    pub judge_cmd: String,
    pub coder_cmd: String,
    /// Flag appended (with a session id) to resume an agent's session.
    pub resume_flag: String,
    /// Times a rejected stage is retried before the round gives up.
    pub max_judge_retries: u32,
    pub history_path: PathBuf,
    pub working_dir: PathBuf,
}

fn env_or(var: &str, default_value: &str) -> String {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default_value.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        let default_cmd = env_or("ROUNDTABLE_AGENT_CMD", DEFAULT_AGENT_CMD);
        let resume_flag = env_or("ROUNDTABLE_RESUME_FLAG", DEFAULT_RESUME_FLAG);

        let max_judge_retries = match std::env::var("ROUNDTABLE_MAX_JUDGE_RETRIES") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("ROUNDTABLE_MAX_JUDGE_RETRIES must be an integer"))?,
            Err(_) => DEFAULT_MAX_JUDGE_RETRIES,
        };

        let history_path = match std::env::var("ROUNDTABLE_HISTORY_FILE") {
            Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
            _ => match std::env::var("HOME") {
                Ok(home) if !home.trim().is_empty() => {
                    PathBuf::from(home.trim()).join(HISTORY_FILE_NAME)
                }
                _ => PathBuf::from(HISTORY_FILE_NAME),
            },
        };

        Ok(Self {
            planner_cmd: env_or("ROUNDTABLE_PLANNER_CMD", &default_cmd),
            reviewer_cmd: env_or("ROUNDTABLE_REVIEWER_CMD", &default_cmd),
            judge_cmd: env_or("ROUNDTABLE_JUDGE_CMD", &default_cmd),
            coder_cmd: env_or("ROUNDTABLE_CODER_CMD", &default_cmd),
            resume_flag,
            max_judge_retries,
            history_path,
            working_dir: std::env::current_dir()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        for (name, cmd) in [
            ("planner", &self.planner_cmd),
            ("reviewer", &self.reviewer_cmd),
            ("judge", &self.judge_cmd),
            ("coder", &self.coder_cmd),
        ] {
            if cmd.split_whitespace().next().is_none() {
                bail!("Empty command line for {name} agent");
            }
        }

        if self.max_judge_retries > MAX_JUDGE_RETRIES_CEILING {
            bail!(
                "ROUNDTABLE_MAX_JUDGE_RETRIES {} exceeds the ceiling of {}",
                self.max_judge_retries,
                MAX_JUDGE_RETRIES_CEILING
            );
        }

        if !self.resume_flag.starts_with('-') {
            bail!(
                "Invalid resume flag '{}': expected a flag starting with '-'",
                self.resume_flag
            );
        }

        Ok(())
    }
}
