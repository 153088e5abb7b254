use std::io::{self, Write};
use std::time::Duration;

use agent_store::ClaimInfo;
use async_trait::async_trait;
use moltbook_api::{AgentSession, ApiError, ClaimStatus};
use moltbook_tui::prompt::LinePrompt;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Check interval for the line-mode flow that proceeds after one manual check.
pub const SIMPLE_CLAIM_INTERVAL: Duration = Duration::from_millis(3000);
/// Check interval for the panel flow that waits until the agent is claimed.
pub const PANEL_CLAIM_INTERVAL: Duration = Duration::from_millis(5000);

const CONFIRM_WORDS: &[&str] = &["done", "yes", "y", "verified"];

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn check_status(&self) -> Result<ClaimStatus, ApiError>;
}

#[async_trait]
impl StatusSource for AgentSession {
    async fn check_status(&self) -> Result<ClaimStatus, ApiError> {
        self.claim_status().await
    }
}

/// What happens after an operator-triggered check reports "not claimed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualPolicy {
    ProceedAfterCheck,
    KeepWaiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimInput {
    Check,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    /// A manual check under [`ManualPolicy::ProceedAfterCheck`] found the
    /// agent unclaimed, or could not tell.
    Abandoned,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Timer,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimEvent {
    Checking,
    Claimed(CheckKind),
    Pending(CheckKind, ClaimStatus),
    CheckFailed(CheckKind, String),
    ContinuingUnclaimed { verified: bool },
}

/// Operator input that can interrupt the wait.
#[async_trait]
pub trait ManualTrigger: Send {
    /// `None` once the input source is closed; it is not polled again.
    async fn next_input(&mut self) -> Option<ClaimInput>;
}

/// Reads trigger lines from a [`LinePrompt`]. `q` or `quit` asks to quit,
/// any other line asks for a check.
pub struct PromptTrigger<'a> {
    prompt: &'a mut dyn LinePrompt,
}

impl<'a> PromptTrigger<'a> {
    pub fn new(prompt: &'a mut dyn LinePrompt) -> Self {
        Self { prompt }
    }
}

#[async_trait]
impl ManualTrigger for PromptTrigger<'_> {
    async fn next_input(&mut self) -> Option<ClaimInput> {
        match self.prompt.ask("").await {
            Ok(Some(line)) => Some(parse_claim_input(&line)),
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "claim input failed");
                None
            }
        }
    }
}

#[must_use]
pub fn parse_claim_input(line: &str) -> ClaimInput {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" => ClaimInput::Quit,
        _ => ClaimInput::Check,
    }
}

/// Trigger for unattended runs: closed from the start.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoManualTrigger;

#[async_trait]
impl ManualTrigger for NoManualTrigger {
    async fn next_input(&mut self) -> Option<ClaimInput> {
        None
    }
}

pub trait ClaimReporter: Send {
    fn report(&mut self, event: ClaimEvent);
}

/// Writes operator-facing lines for manual checks and the final verdict.
/// Timer results that change nothing stay in the log.
pub struct WriterReporter<'a> {
    out: &'a mut (dyn Write + Send),
}

impl<'a> WriterReporter<'a> {
    pub fn new(out: &'a mut (dyn Write + Send)) -> Self {
        Self { out }
    }

    fn line(event: &ClaimEvent) -> Option<String> {
        match event {
            ClaimEvent::Checking => Some("Checking claim status...".to_string()),
            ClaimEvent::Claimed(_) => Some("Agent claimed! Starting feed...".to_string()),
            ClaimEvent::Pending(CheckKind::Manual, status) => Some(format!(
                "Status: {status}. Still pending, complete the claim first."
            )),
            ClaimEvent::CheckFailed(CheckKind::Manual, _) => {
                Some("Error checking status.".to_string())
            }
            ClaimEvent::ContinuingUnclaimed { verified: true } => {
                Some("Still pending claim. Continuing anyway...".to_string())
            }
            ClaimEvent::ContinuingUnclaimed { verified: false } => {
                Some("Could not verify, but continuing...".to_string())
            }
            ClaimEvent::Pending(CheckKind::Timer, _) | ClaimEvent::CheckFailed(CheckKind::Timer, _) => {
                None
            }
        }
    }
}

impl ClaimReporter for WriterReporter<'_> {
    fn report(&mut self, event: ClaimEvent) {
        if let Some(line) = Self::line(&event) {
            if let Err(error) = writeln!(self.out, "{line}") {
                warn!(%error, "failed to write claim status");
            }
        }
    }
}

enum CheckResult {
    Claimed,
    Pending,
    Failed,
}

/// Polls claim status on a fixed interval until the agent is claimed or
/// the operator intervenes.
///
/// The first timer check fires one interval after [`ClaimPoller::wait`]
/// starts; callers run [`initial_claim_check`] beforehand. Failed checks
/// count as "not claimed" and never end the wait on their own.
pub struct ClaimPoller<'a, S: ?Sized> {
    source: &'a S,
    interval: Duration,
    policy: ManualPolicy,
    checks: usize,
}

impl<'a, S: StatusSource + ?Sized> ClaimPoller<'a, S> {
    pub fn new(source: &'a S, interval: Duration, policy: ManualPolicy) -> Self {
        Self {
            source,
            interval,
            policy,
            checks: 0,
        }
    }

    /// Status checks performed so far.
    #[must_use]
    pub fn checks(&self) -> usize {
        self.checks
    }

    pub async fn wait(
        &mut self,
        trigger: &mut dyn ManualTrigger,
        reporter: &mut dyn ClaimReporter,
    ) -> ClaimOutcome {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let CheckResult::Claimed = self.check(CheckKind::Timer, reporter).await {
                        return ClaimOutcome::Claimed;
                    }
                }
                input = trigger.next_input(), if trigger_open => match input {
                    None => {
                        debug!("claim trigger closed, waiting on timer only");
                        trigger_open = false;
                    }
                    Some(ClaimInput::Quit) if self.policy == ManualPolicy::KeepWaiting => {
                        info!("operator quit while waiting for claim");
                        return ClaimOutcome::Quit;
                    }
                    Some(_) => {
                        reporter.report(ClaimEvent::Checking);
                        let result = self.check(CheckKind::Manual, reporter).await;
                        match (result, self.policy) {
                            (CheckResult::Claimed, _) => return ClaimOutcome::Claimed,
                            (CheckResult::Pending, ManualPolicy::ProceedAfterCheck) => {
                                reporter.report(ClaimEvent::ContinuingUnclaimed { verified: true });
                                return ClaimOutcome::Abandoned;
                            }
                            (CheckResult::Failed, ManualPolicy::ProceedAfterCheck) => {
                                reporter.report(ClaimEvent::ContinuingUnclaimed { verified: false });
                                return ClaimOutcome::Abandoned;
                            }
                            (_, ManualPolicy::KeepWaiting) => {}
                        }
                    }
                },
            }
        }
    }

    async fn check(&mut self, kind: CheckKind, reporter: &mut dyn ClaimReporter) -> CheckResult {
        self.checks += 1;
        match self.source.check_status().await {
            Ok(ClaimStatus::Claimed) => {
                info!(checks = self.checks, "agent claimed");
                reporter.report(ClaimEvent::Claimed(kind));
                CheckResult::Claimed
            }
            Ok(status) => {
                debug!(%status, ?kind, "agent not yet claimed");
                reporter.report(ClaimEvent::Pending(kind, status));
                CheckResult::Pending
            }
            Err(error) => {
                warn!(%error, ?kind, "claim status check failed");
                reporter.report(ClaimEvent::CheckFailed(kind, error.to_string()));
                CheckResult::Failed
            }
        }
    }
}

/// One check at startup. Anything but a confirmed claim, including an
/// error, reads as unclaimed.
pub async fn initial_claim_check<S: StatusSource + ?Sized>(source: &S) -> bool {
    match source.check_status().await {
        Ok(status) => status.is_claimed(),
        Err(error) => {
            warn!(%error, "initial claim check failed");
            false
        }
    }
}

/// Claim url and verification code, whichever are known.
#[must_use]
pub fn claim_details(claim: &ClaimInfo) -> Vec<String> {
    let mut lines = vec!["Agent not yet claimed.".to_string()];
    if let Some(url) = &claim.claim_url {
        lines.push("Claim URL:".to_string());
        lines.push(format!("   {url}"));
    }
    if let Some(code) = &claim.verification_code {
        lines.push("Verification code:".to_string());
        lines.push(format!("   {code}"));
    }
    lines.push("Visit the URL above and enter the verification code to claim your agent.".to_string());
    lines
}

/// [`claim_details`] plus how to interact with the poller.
#[must_use]
pub fn claim_banner(claim: &ClaimInfo, policy: ManualPolicy) -> Vec<String> {
    let mut lines = claim_details(claim);
    lines.push(match policy {
        ManualPolicy::ProceedAfterCheck => {
            "Press ENTER to check status or wait for the automatic check...".to_string()
        }
        ManualPolicy::KeepWaiting => "Press ENTER to check status now, or type q to quit.".to_string(),
    });
    lines
}

/// Blocks until the operator confirms the claim by typing one of
/// `done`, `yes`, `y` or `verified`.
///
/// Returns `Ok(true)` straight away when there is nothing to confirm, and
/// `Ok(false)` if input ends first.
pub async fn wait_for_confirmation(
    prompt: &mut dyn LinePrompt,
    out: &mut (dyn Write + Send),
    claim: &ClaimInfo,
) -> io::Result<bool> {
    if !claim.is_complete() {
        return Ok(true);
    }
    for line in claim_details(claim) {
        writeln!(out, "{line}")?;
    }

    loop {
        let Some(answer) = prompt.ask("Type 'done' once verified: ").await? else {
            return Ok(false);
        };
        let answer = answer.trim().to_ascii_lowercase();
        if CONFIRM_WORDS.contains(&answer.as_str()) {
            writeln!(out, "Verification confirmed.")?;
            return Ok(true);
        }
        writeln!(out, "Please type 'done' when you have verified the claim.")?;
    }
}
