use anyhow::{anyhow, Result};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::editor::{EditorConfig, ReadOutcome, Terminal};
use crate::history_file;
use crate::logging;
use crate::workflow::{CodeKind, RoundReport, Verdict, Workflow};

const PRIMARY_PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "… ";

/// Interactive prompt loop: read a task with the line editor, drive one
/// workflow round per submission, repeat until end-of-input.
pub struct App {
    config: Config,
    terminal: Terminal,
    workflow: Workflow,
    history: Vec<String>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let workflow = Workflow::new(&config)?;
        let history = history_file::load(&config.history_path)?;
        Ok(Self {
            config,
            terminal: Terminal::new(),
            workflow,
            history,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("roundtable: plan, review, judge, code. /help for commands.");

        loop {
            let editor_config = EditorConfig {
                prompt: PRIMARY_PROMPT.to_string(),
                continuation_prompt: CONTINUATION_PROMPT.to_string(),
                history: self.history.clone(),
            };
            match self.terminal.read_line(&editor_config).await {
                ReadOutcome::Cancel => {
                    println!("^C");
                }
                ReadOutcome::EndOfInput => break,
                ReadOutcome::Input(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    self.remember(&text);
                    if let Some(command) = text.strip_prefix('/') {
                        if !self.handle_command(command) {
                            break;
                        }
                    } else {
                        self.run_task(&text).await;
                    }
                }
            }
        }

        Ok(())
    }

    fn remember(&mut self, entry: &str) {
        if self.history.first().map(String::as_str) == Some(entry) {
            return;
        }
        self.history.insert(0, entry.to_string());
        if let Err(err) = history_file::append(&self.config.history_path, entry) {
            logging::debug(&format!("ROUNDTABLE history_append_failed error={err:#}"));
        }
    }

    /// Returns false when the loop should exit.
    fn handle_command(&mut self, command: &str) -> bool {
        match command.trim() {
            "quit" | "exit" => return false,
            "help" => {
                println!("/help      show this help");
                println!("/history   show past prompts");
                println!("/quit      exit");
                println!("anything else runs a plan/review/judge/code round");
            }
            "history" => {
                for (idx, entry) in self.history.iter().enumerate() {
                    println!("{:>3}  {}", idx + 1, entry.replace('\n', "⏎"));
                }
            }
            other => println!("unknown command: /{other}"),
        }
        true
    }

    async fn run_task(&mut self, task: &str) {
        let cancel = CancellationToken::new();
        let round = tokio::select! {
            round = self.workflow.run_round(task, &cancel) => round,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                Err(anyhow!("round interrupted"))
            }
        };

        match round {
            Ok(report) => print_report(&report),
            Err(err) => println!("round failed: {err:#}"),
        }
    }
}

fn print_report(report: &RoundReport) {
    let verdict = |v: Verdict| match v {
        Verdict::Approve => "approved",
        Verdict::Reject => "rejected after retries",
    };
    println!();
    println!(
        "── plan ({}, {} attempt(s)) ──",
        verdict(report.plan.verdict),
        report.plan.attempts
    );
    println!("{}", report.plan.output.trim_end());
    let kind = match report.code_kind {
        CodeKind::Diff => "diff",
        CodeKind::FullText => "full text",
    };
    println!(
        "── code [{kind}] ({}, {} attempt(s)) ──",
        verdict(report.code.verdict),
        report.code.attempts
    );
    println!("{}", report.code.output.trim_end());
    println!();
}
