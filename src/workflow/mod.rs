pub mod agent;
pub mod stream;

use aho_corasick::AhoCorasick;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use agent::Agent;

const DIFF_MARKERS: [&str; 4] = ["--- ", "+++ ", "@@ ", "diff --git"];

/// Multi-round "plan → review → judge → code → review → judge" driver.
///
/// Each stage shells out to its configured agent CLI. The judge's verdict
/// gates progress: a rejected stage is retried with the reviewer's feedback
/// folded into the prompt, up to `max_judge_retries` times, after which the
/// round proceeds with the best effort so far.
pub struct Workflow {
    planner: Agent,
    reviewer: Agent,
    judge: Agent,
    coder: Agent,
    max_judge_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

/// Whether coder output looks like a unified diff or full file text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Diff,
    FullText,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub output: String,
    pub verdict: Verdict,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct RoundReport {
    pub plan: StageReport,
    pub code: StageReport,
    pub code_kind: CodeKind,
}

/// Parse the judge's verdict from the final non-empty line of its reply.
/// Anything that is not a clear APPROVE reads as a rejection.
pub fn parse_verdict(reply: &str) -> Verdict {
    let last = reply
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let last = last.trim().to_ascii_uppercase();
    if last.contains("APPROVE") && !last.contains("REJECT") {
        Verdict::Approve
    } else {
        Verdict::Reject
    }
}

/// Classify coder output by scanning for unified-diff markers.
pub fn classify_code(output: &str) -> CodeKind {
    let ac = AhoCorasick::new(DIFF_MARKERS).expect("static patterns");
    if ac.is_match(output) {
        CodeKind::Diff
    } else {
        CodeKind::FullText
    }
}

fn plan_prompt(task: &str, feedback: Option<&str>) -> String {
    match feedback {
        None => format!(
            "Produce a concise implementation plan for the following task. \
             Number the steps.\n\nTask:\n{task}\n"
        ),
        Some(feedback) => format!(
            "Revise your implementation plan for the task below. A reviewer \
             raised the following objections; address every one.\n\nTask:\n{task}\n\n\
             Reviewer feedback:\n{feedback}\n"
        ),
    }
}

fn review_prompt(subject: &str, artifact: &str) -> String {
    format!(
        "Review the following {subject}. List concrete problems, or state \
         that it is sound.\n\n{artifact}\n"
    )
}

fn judge_prompt(subject: &str, artifact: &str, review: &str) -> String {
    format!(
        "You are the judge. Given the {subject} and its review below, decide \
         whether to accept it. Respond with APPROVE or REJECT on the final \
         line.\n\n{subject}:\n{artifact}\n\nReview:\n{review}\n"
    )
}

fn code_prompt(task: &str, plan: &str, feedback: Option<&str>) -> String {
    let base = format!(
        "Implement the task below following the approved plan. Reply with \
         either a unified diff or complete file contents.\n\nTask:\n{task}\n\n\
         Plan:\n{plan}\n"
    );
    match feedback {
        None => base,
        Some(feedback) => format!("{base}\nReviewer feedback to address:\n{feedback}\n"),
    }
}

impl Workflow {
    pub fn new(config: &Config) -> Result<Self> {
        let make = |cmd: &str| {
            Agent::from_command_line(cmd, &config.resume_flag, &config.working_dir)
        };
        Ok(Self {
            planner: make(&config.planner_cmd)?,
            reviewer: make(&config.reviewer_cmd)?,
            judge: make(&config.judge_cmd)?,
            coder: make(&config.coder_cmd)?,
            max_judge_retries: config.max_judge_retries,
        })
    }

    /// Run one full round for `task`. Errors from any agent invocation abort
    /// the round.
    pub async fn run_round(
        &mut self,
        task: &str,
        cancel: &CancellationToken,
    ) -> Result<RoundReport> {
        let plan = self.judged_stage(cancel, task, None).await?;
        let code = self
            .judged_stage(cancel, task, Some(&plan.output))
            .await?;
        let code_kind = classify_code(&code.output);
        Ok(RoundReport {
            plan,
            code,
            code_kind,
        })
    }

    /// One produce/review/judge loop. `plan` of `None` runs the planner,
    /// otherwise the coder against that plan.
    async fn judged_stage(
        &mut self,
        cancel: &CancellationToken,
        task: &str,
        plan: Option<&str>,
    ) -> Result<StageReport> {
        let subject = if plan.is_some() { "code change" } else { "plan" };
        let mut feedback: Option<String> = None;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let prompt = match plan {
                None => plan_prompt(task, feedback.as_deref()),
                Some(plan) => code_prompt(task, plan, feedback.as_deref()),
            };
            let produced = match plan {
                None => self.planner.run(&prompt, cancel).await?,
                Some(_) => self.coder.run(&prompt, cancel).await?,
            };

            let review = self
                .reviewer
                .run(&review_prompt(subject, &produced.text), cancel)
                .await?;
            let ruling = self
                .judge
                .run(&judge_prompt(subject, &produced.text, &review.text), cancel)
                .await?;
            let verdict = parse_verdict(&ruling.text);

            let report = StageReport {
                output: produced.text,
                verdict,
                attempts,
            };
            // Retries exhausted surfaces the last rejected attempt.
            if verdict == Verdict::Approve || attempts > self.max_judge_retries {
                return Ok(report);
            }
            feedback = Some(review.text);
        }
    }
}
