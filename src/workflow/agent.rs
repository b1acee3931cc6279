use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::stream::{AgentEvent, EventParser};
use crate::logging;

/// One external AI-assistant CLI, invoked once per workflow stage.
///
/// The prompt goes to the subprocess's stdin; stdout is parsed incrementally
/// as agent events. When the agent reports a session id, later invocations
/// pass it back via the configured resume flag so the agent keeps its
/// context across stages.
pub struct Agent {
    program: String,
    args: Vec<String>,
    resume_flag: String,
    working_dir: PathBuf,
    session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub session_id: Option<String>,
}

impl Agent {
    pub fn from_command_line(cmd: &str, resume_flag: &str, working_dir: &PathBuf) -> Result<Self> {
        let mut parts = cmd.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("empty agent command line");
        };
        Ok(Self {
            program,
            args: parts.collect(),
            resume_flag: resume_flag.to_string(),
            working_dir: working_dir.clone(),
            session_id: None,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Run the agent once with `prompt` on stdin, returning its final text.
    ///
    /// Cancellation kills the subprocess and surfaces as an error; the caller
    /// reports it, never the editor.
    pub async fn run(&mut self, prompt: &str, cancel: &CancellationToken) -> Result<AgentReply> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(id) = &self.session_id {
            command.arg(&self.resume_flag).arg(id);
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn agent '{}'", self.program))?;

        // The write runs concurrently with the stdout loop below: an agent
        // that streams output while still reading its prompt would otherwise
        // fill the stdout pipe and deadlock against our blocked write once
        // the prompt outgrows the stdin pipe. An agent that ignores stdin
        // may close the pipe early; that is not an error. Dropping stdin
        // gives the agent EOF.
        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                let _ = stdin.write_all(prompt.as_bytes()).await;
                let _ = stdin.shutdown().await;
            });
        }

        let mut stdout = child
            .stdout
            .take()
            .context("agent stdout was not captured")?;
        let mut parser = EventParser::new();
        let mut streamed = String::new();
        let mut result: Option<String> = None;
        let mut buf = [0u8; 4096];

        loop {
            let read = tokio::select! {
                read = stdout.read(&mut buf) => read?,
                _ = cancel.cancelled() => {
                    let _ = child.start_kill();
                    bail!("agent '{}' canceled", self.program);
                }
            };
            if read == 0 {
                break;
            }
            for event in parser.process(&buf[..read])? {
                self.consume(event, &mut streamed, &mut result);
            }
        }
        if let Some(event) = parser.flush() {
            self.consume(event, &mut streamed, &mut result);
        }

        // Drain stderr before waiting so a chatty agent cannot deadlock on a
        // full pipe.
        let mut stderr_tail = String::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_string(&mut stderr_tail).await;
        }
        let status = child.wait().await?;
        if !status.success() {
            logging::debug(&format!(
                "ROUNDTABLE agent_failed program={} status={status}\nstderr:\n{stderr_tail}",
                self.program
            ));
            bail!(
                "agent '{}' exited with {status}: {}",
                self.program,
                stderr_tail.lines().last().unwrap_or("<no stderr>")
            );
        }

        let text = result.unwrap_or(streamed);
        if text.trim().is_empty() {
            bail!("agent '{}' produced no output", self.program);
        }
        Ok(AgentReply {
            text,
            session_id: self.session_id.clone(),
        })
    }

    fn consume(&mut self, event: AgentEvent, streamed: &mut String, result: &mut Option<String>) {
        match event {
            AgentEvent::Text { text } => {
                if !streamed.is_empty() {
                    streamed.push('\n');
                }
                streamed.push_str(&text);
            }
            AgentEvent::Session { id } => self.session_id = Some(id),
            AgentEvent::Result { text } => *result = Some(text),
        }
    }
}
