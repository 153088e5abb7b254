use std::io::{self, Write};
use std::time::Duration;

use agent_store::{ClaimInfo, CredentialStore};
use clap::ValueEnum;
use moltbook_api::{AgentSession, MoltbookClient, DEFAULT_FEED_LIMIT};
use moltbook_tui::prompt::LinePrompt;
use moltbook_tui::terminal::FALLBACK_COLUMNS;
use thiserror::Error;
use tracing::info;

use crate::claim::{
    claim_banner, initial_claim_check, wait_for_confirmation, ClaimOutcome, ClaimPoller,
    ManualPolicy, PromptTrigger, WriterReporter, PANEL_CLAIM_INTERVAL, SIMPLE_CLAIM_INTERVAL,
};
use crate::feed::FeedLoop;
use crate::lifecycle::{ApiKeyResult, CredentialLifecycle, LifecycleError};
use crate::registration::PromptRegistrar;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// How an unclaimed agent waits before the feed opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClaimMode {
    /// Poll every few seconds; the first line typed checks once and moves on.
    Simple,
    /// Poll until claimed; ENTER checks now, `q` quits.
    Panel,
    /// Wait for the operator to type `done` after claiming.
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimFlow {
    mode: ClaimMode,
    interval: Duration,
}

impl ClaimFlow {
    #[must_use]
    pub fn new(mode: ClaimMode) -> Self {
        let interval = match mode {
            ClaimMode::Panel => PANEL_CLAIM_INTERVAL,
            ClaimMode::Simple | ClaimMode::Confirm => SIMPLE_CLAIM_INTERVAL,
        };
        Self { mode, interval }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ClaimMode {
        self.mode
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ClaimFlow {
    fn default() -> Self {
        Self::new(ClaimMode::Simple)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppExit {
    /// The feed loop ended normally.
    Finished,
    /// The operator quit while waiting for the claim.
    Quit,
}

/// Startup sequence: credentials, claim, then the feed.
pub struct App {
    client: MoltbookClient,
    flow: ClaimFlow,
    page_size: u32,
    width: usize,
}

impl App {
    #[must_use]
    pub fn new(client: MoltbookClient, flow: ClaimFlow) -> Self {
        Self {
            client,
            flow,
            page_size: DEFAULT_FEED_LIMIT,
            width: usize::from(FALLBACK_COLUMNS),
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    #[must_use]
    pub fn client(&self) -> &MoltbookClient {
        &self.client
    }

    pub async fn run(
        &self,
        prompt: &mut dyn LinePrompt,
        out: &mut (dyn Write + Send),
    ) -> Result<AppExit, AppError> {
        let resolved = self.resolve_credentials(prompt, out).await?;
        match &resolved.agent_name {
            Some(name) => writeln!(out, "Agent: {name}")?,
            None => writeln!(out, "Using stored API key.")?,
        }

        let session = self.client.with_api_key(resolved.api_key.clone());
        if initial_claim_check(&session).await {
            info!("agent already claimed");
        } else {
            let claim = resolved.claim_info();
            let outcome = self.wait_for_claim(&session, &claim, prompt, out).await?;
            info!(?outcome, "claim wait finished");
            if outcome == ClaimOutcome::Quit {
                return Ok(AppExit::Quit);
            }
        }

        FeedLoop::new(&session, self.page_size, self.width)
            .run(prompt, out)
            .await?;
        Ok(AppExit::Finished)
    }

    async fn resolve_credentials(
        &self,
        prompt: &mut dyn LinePrompt,
        out: &mut (dyn Write + Send),
    ) -> Result<ApiKeyResult, LifecycleError> {
        let credentials = CredentialStore::new(
            self.client.store().clone(),
            self.client.config().paths.clone(),
        );
        let mut registrar = PromptRegistrar::new(&self.client, prompt, out);
        CredentialLifecycle::new(credentials)
            .resolve(&mut registrar)
            .await
    }

    async fn wait_for_claim(
        &self,
        session: &AgentSession,
        claim: &ClaimInfo,
        prompt: &mut dyn LinePrompt,
        out: &mut (dyn Write + Send),
    ) -> io::Result<ClaimOutcome> {
        let policy = match self.flow.mode {
            ClaimMode::Confirm => {
                return Ok(if wait_for_confirmation(prompt, out, claim).await? {
                    ClaimOutcome::Abandoned
                } else {
                    ClaimOutcome::Quit
                });
            }
            ClaimMode::Simple => ManualPolicy::ProceedAfterCheck,
            ClaimMode::Panel => ManualPolicy::KeepWaiting,
        };

        if policy == ManualPolicy::KeepWaiting && !claim.is_complete() {
            writeln!(out, "No claim URL or verification code available.")?;
            return Ok(ClaimOutcome::Abandoned);
        }
        for line in claim_banner(claim, policy) {
            writeln!(out, "{line}")?;
        }

        let mut poller = ClaimPoller::new(session, self.flow.interval, policy);
        let mut trigger = PromptTrigger::new(prompt);
        let mut reporter = WriterReporter::new(out);
        Ok(poller.wait(&mut trigger, &mut reporter).await)
    }
}
