//! Scripted demo execution
//!
//! The sequencer owns the browser and narrator for the duration of a
//! run and walks the configured steps in order. Between steps it
//! listens on a bounded question channel, so audience questions get
//! answered at natural pauses instead of interrupting an action.
//! Stopping is cooperative through a cancellation token; the run
//! always finishes the step in flight and returns a report.

use crate::browser::locator::{self, Locator};
use crate::browser::session::{Browser, ElementHandle};
use crate::core::config::{config, RuntimeConfig};
use crate::core::error::{DocentError, Result};
use crate::demo::script::{DemoStep, ProductConfig, StepAction};
use crate::llm::qa::QaAnswerer;
use crate::speech::narrator::Narrator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How one step ended
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub name: String,
    pub ok: bool,
    pub message: String,
}

/// A question answered during the run
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    /// Index of the step that was showing when the question arrived
    pub step_index: usize,
    pub question: String,
    pub answer: String,
}

/// Everything that happened during one demo run
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub run_id: Uuid,
    pub product_name: String,
    pub steps: Vec<StepOutcome>,
    pub questions: Vec<AnsweredQuestion>,
    /// False when the run was stopped before the closing line
    pub completed: bool,
}

impl DemoReport {
    /// Human-readable report for the console
    pub fn summary(&self) -> String {
        let succeeded = self.steps.iter().filter(|s| s.ok).count();
        let mut out = format!(
            "Demo report for {} (run {})\n  status: {}\n  steps: {} ran, {} succeeded\n",
            self.product_name,
            self.run_id,
            if self.completed { "completed" } else { "stopped early" },
            self.steps.len(),
            succeeded,
        );
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!(
                "    {}. {} [{}] {}\n",
                i + 1,
                step.name,
                if step.ok { "ok" } else { "failed" },
                step.message
            ));
        }
        if !self.questions.is_empty() {
            out.push_str(&format!("  questions answered: {}\n", self.questions.len()));
            for q in &self.questions {
                out.push_str(&format!(
                    "    - \"{}\" (during step {})\n",
                    q.question,
                    q.step_index + 1
                ));
            }
        }
        out
    }
}

enum Wakeup {
    Cancelled,
    Question(String),
    ChannelClosed,
    TimedOut,
}

/// Runs one scripted demo over an owned browser session
pub struct DemoSequencer<B: Browser> {
    browser: B,
    narrator: Narrator,
    answerer: QaAnswerer,
    config: Arc<ProductConfig>,
    runtime: RuntimeConfig,
    questions: mpsc::Receiver<String>,
    cancel: CancellationToken,
    outcomes: Vec<StepOutcome>,
    answered: Vec<AnsweredQuestion>,
    current_step: usize,
}

impl<B: Browser> DemoSequencer<B> {
    /// Build a sequencer, returning the question sender and the stop
    /// token alongside it
    ///
    /// The question channel is bounded; when the audience outruns the
    /// answerer, sends fail fast instead of queueing a backlog.
    pub fn new(
        browser: B,
        narrator: Narrator,
        answerer: QaAnswerer,
        product: Arc<ProductConfig>,
    ) -> (Self, mpsc::Sender<String>, CancellationToken) {
        let runtime = config().clone();
        let (tx, rx) = mpsc::channel(runtime.question_capacity);
        let cancel = CancellationToken::new();

        let sequencer = Self {
            browser,
            narrator,
            answerer,
            config: product,
            runtime,
            questions: rx,
            cancel: cancel.clone(),
            outcomes: Vec::new(),
            answered: Vec::new(),
            current_step: 0,
        };

        (sequencer, tx, cancel)
    }

    /// Override timing for tests
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Run the demo to completion or cancellation
    ///
    /// Returns the browser and narrator so the caller gets them back
    /// for free-command mode, along with the run report.
    pub async fn run(mut self) -> (B, Narrator, DemoReport) {
        let run_id = Uuid::new_v4();
        tracing::info!(
            "demo run {} starting: {}",
            run_id,
            self.config.product_name
        );

        self.narrator.narrate(&self.config.welcome_message).await;

        let steps = self.config.demo_steps.clone();
        let mut cancelled = false;

        for (index, step) in steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            self.current_step = index;

            tracing::info!("step {}/{}: {}", index + 1, steps.len(), step.name);

            let narration = step
                .voice_script
                .clone()
                .unwrap_or_else(|| format!("Step {}: {}", index + 1, step.description));
            self.narrator.narrate(&narration).await;

            let (ok, message) = self.execute_step(step).await;
            if !ok {
                tracing::warn!("step '{}' did not complete: {}", step.name, message);
            }
            self.outcomes.push(StepOutcome {
                name: step.name.clone(),
                ok,
                message,
            });

            let mid_run = index + 1 < steps.len();
            if !self.hold_for_questions(step.wait_time, mid_run).await {
                cancelled = true;
                break;
            }
        }

        if !cancelled {
            self.narrator
                .narrate(&format!(
                    "That completes our demonstration of {}! Do you have any final questions?",
                    self.config.product_name
                ))
                .await;

            let window = self.runtime.final_question_window_secs;
            if self.hold_for_questions(window, false).await {
                let closing = self
                    .config
                    .closing_message
                    .clone()
                    .unwrap_or_else(|| "Thank you for your time!".to_string());
                self.narrator.narrate(&closing).await;
            } else {
                cancelled = true;
            }
        }

        let report = DemoReport {
            run_id,
            product_name: self.config.product_name.clone(),
            steps: self.outcomes,
            questions: self.answered,
            completed: !cancelled,
        };

        tracing::info!(
            "demo run {} {}",
            run_id,
            if report.completed { "completed" } else { "stopped" }
        );

        (self.browser, self.narrator, report)
    }

    /// Run one step, turning every failure into a report message
    async fn execute_step(&self, step: &DemoStep) -> (bool, String) {
        match step.action {
            StepAction::Navigate => match self.browser.goto(&step.url).await {
                Ok(()) => {
                    sleep(self.runtime.page_settle).await;
                    if let Ok(info) = self.browser.page_info().await {
                        tracing::debug!("on '{}' ({})", info.title, info.url);
                    }
                    (true, format!("Successfully navigated to {}", step.url))
                }
                Err(e) => (false, format!("Navigation failed: {}", e)),
            },

            StepAction::Login => self.login_step(step).await,

            StepAction::Click => {
                let Some(selector) = &step.element_selector else {
                    return (false, "No element selector provided".to_string());
                };
                match self.browser.find(&Locator::Css(selector.clone())).await {
                    Ok(Some(element)) => match self.browser.click(&element).await {
                        Ok(()) => {
                            sleep(self.runtime.element_settle).await;
                            (true, format!("Successfully clicked element: {}", selector))
                        }
                        Err(e) => (false, format!("Click failed: {}", e)),
                    },
                    Ok(None) => (
                        false,
                        format!("Element not found or not clickable: {}", selector),
                    ),
                    Err(e) => (false, format!("Click failed: {}", e)),
                }
            }

            StepAction::FormFill => match self.browser.goto(&step.url).await {
                Ok(()) => {
                    sleep(self.runtime.page_settle).await;
                    (true, format!("Form showcase completed for {}", step.name))
                }
                Err(e) => (false, format!("Form showcase failed: {}", e)),
            },

            StepAction::Showcase => match self.browser.goto(&step.url).await {
                Ok(()) => {
                    sleep(self.runtime.page_settle).await;
                    (true, format!("Page showcase completed: {}", step.name))
                }
                Err(e) => (false, format!("Page showcase failed: {}", e)),
            },
        }
    }

    async fn login_step(&self, step: &DemoStep) -> (bool, String) {
        let Some(creds) = &self.config.login_credentials else {
            return (false, "No login credentials configured".to_string());
        };

        let attempt = async {
            self.browser.goto(&step.url).await?;
            sleep(self.runtime.page_settle).await;

            if let Some(email) = self.first_match(&locator::email_chain()).await? {
                self.browser.clear(&email).await?;
                self.browser.send_keys(&email, &creds.email).await?;
            }
            if let Some(password) = self.first_match(&locator::password_chain()).await? {
                self.browser.clear(&password).await?;
                self.browser.send_keys(&password, &creds.password).await?;
            }
            if let Some(submit) = self.first_match(&locator::submit_chain()).await? {
                self.browser.click(&submit).await?;
                sleep(self.runtime.login_settle).await;
            }
            Ok::<(), DocentError>(())
        };

        match attempt.await {
            Ok(()) => (
                true,
                format!("Login attempt completed for {}", self.config.product_name),
            ),
            Err(e) => (false, format!("Login failed: {}", e)),
        }
    }

    async fn first_match(&self, chain: &[Locator]) -> Result<Option<ElementHandle>> {
        for locator in chain {
            if let Some(element) = self.browser.find(locator).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// Hold for a step's wait window, answering questions as they come
    ///
    /// Answering pauses the countdown, so a long answer never eats the
    /// next step's narration. Returns false when the run was stopped.
    async fn hold_for_questions(&mut self, seconds: f32, mid_run: bool) -> bool {
        // A malformed wait_time from a config file must not kill the run.
        let window = Duration::try_from_secs_f32(seconds)
            .unwrap_or_else(|_| Duration::from_secs_f32(self.runtime.default_step_wait_secs));
        let mut deadline = Instant::now() + window;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }

            let wakeup = tokio::select! {
                _ = self.cancel.cancelled() => Wakeup::Cancelled,
                received = self.questions.recv() => match received {
                    Some(question) => Wakeup::Question(question),
                    None => Wakeup::ChannelClosed,
                },
                _ = sleep(remaining) => Wakeup::TimedOut,
            };

            match wakeup {
                Wakeup::Cancelled => return false,
                Wakeup::TimedOut => return true,
                Wakeup::Question(question) => {
                    self.answer_question(question, mid_run).await;
                    deadline = Instant::now() + remaining;
                }
                Wakeup::ChannelClosed => {
                    sleep(remaining).await;
                    return true;
                }
            }
        }
    }

    async fn answer_question(&mut self, question: String, mid_run: bool) {
        tracing::info!("audience question: {}", question);

        let answer = self.answerer.answer(&question).await;
        self.narrator
            .narrate(&format!("Great question! {}", answer))
            .await;
        if mid_run {
            self.narrator.narrate("Let me continue the demo.").await;
        } else {
            self.narrator.narrate("Any other questions?").await;
        }

        self.answered.push(AnsweredQuestion {
            step_index: self.current_step,
            question,
            answer,
        });
    }
}
