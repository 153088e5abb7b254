use std::io::{self, Write};

use async_trait::async_trait;
use moltbook_api::{AgentSession, ApiError, ClaimStatus, FeedPage};
use moltbook_tui::feed_view::FeedView;
use moltbook_tui::names::generate_agents;
use moltbook_tui::prompt::LinePrompt;
use moltbook_tui::text::truncate_to_width;
use serde_json::Value;
use tracing::{debug, warn};

const HELP: &[&str] = &[
    "Commands:",
    "  n        next page",
    "  p        previous page",
    "  r        reload",
    "  s        agent status",
    "  g / G    suggest one / three agent identities",
    "  q        quit",
    "  ?        this help",
    "Anything else is posted as a new text post.",
];

/// The calls the feed loop makes with an authenticated session.
#[async_trait]
pub trait FeedSession: Send + Sync {
    async fn get_feed(&self, page: u32, limit: u32) -> Result<FeedPage, ApiError>;
    async fn create_post(&self, text: &str) -> Result<Value, ApiError>;
    async fn get_agent_status(&self) -> Result<Value, ApiError>;
}

#[async_trait]
impl FeedSession for AgentSession {
    async fn get_feed(&self, page: u32, limit: u32) -> Result<FeedPage, ApiError> {
        AgentSession::get_feed(self, page, limit).await
    }

    async fn create_post(&self, text: &str) -> Result<Value, ApiError> {
        AgentSession::create_post(self, text).await
    }

    async fn get_agent_status(&self) -> Result<Value, ApiError> {
        AgentSession::get_agent_status(self).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    Next,
    Previous,
    Reload,
    Status,
    Suggest(usize),
    Help,
    Quit,
    Post(String),
    Empty,
}

impl FeedCommand {
    /// Single-letter commands are case sensitive (`g` and `G` differ).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "n" => Self::Next,
            "p" => Self::Previous,
            "r" => Self::Reload,
            "s" => Self::Status,
            "g" => Self::Suggest(1),
            "G" => Self::Suggest(3),
            "q" => Self::Quit,
            "?" => Self::Help,
            text => Self::Post(text.to_string()),
        }
    }
}

/// Interactive feed: a page of titles, one command per line.
pub struct FeedLoop<'a, S: ?Sized> {
    session: &'a S,
    view: FeedView,
    width: usize,
}

impl<'a, S: FeedSession + ?Sized> FeedLoop<'a, S> {
    pub fn new(session: &'a S, page_size: u32, width: usize) -> Self {
        Self {
            session,
            view: FeedView::new(page_size),
            width,
        }
    }

    #[must_use]
    pub fn view(&self) -> &FeedView {
        &self.view
    }

    /// Runs until `q` or end of input.
    pub async fn run(
        &mut self,
        prompt: &mut dyn LinePrompt,
        out: &mut (dyn Write + Send),
    ) -> io::Result<()> {
        self.load(1, out).await?;
        writeln!(out, "Type ? for commands.")?;

        while let Some(line) = prompt.ask("> ").await? {
            let command = FeedCommand::parse(&line);
            debug!(?command, "feed command");
            if command == FeedCommand::Quit {
                break;
            }
            self.apply(command, out).await?;
        }
        Ok(())
    }

    pub async fn apply(
        &mut self,
        command: FeedCommand,
        out: &mut (dyn Write + Send),
    ) -> io::Result<()> {
        let page = self.view.page();
        match command {
            FeedCommand::Next => self.load(page.saturating_add(1), out).await,
            FeedCommand::Previous => {
                let previous = page.saturating_sub(1).max(1);
                if previous == page {
                    return Ok(());
                }
                self.load(previous, out).await
            }
            FeedCommand::Reload => self.load(page, out).await,
            FeedCommand::Status => self.show_status(out).await,
            FeedCommand::Suggest(count) => {
                for suggestion in generate_agents(count) {
                    writeln!(out, "  {}", suggestion.name)?;
                    writeln!(
                        out,
                        "    {}",
                        truncate_to_width(&suggestion.description, self.width.saturating_sub(4))
                    )?;
                }
                Ok(())
            }
            FeedCommand::Help => {
                for line in HELP {
                    writeln!(out, "{line}")?;
                }
                Ok(())
            }
            FeedCommand::Post(text) => self.post(&text, out).await,
            FeedCommand::Quit | FeedCommand::Empty => Ok(()),
        }
    }

    /// The page number moves before the fetch, so a failed load still
    /// reports the page it tried.
    async fn load(&mut self, page: u32, out: &mut (dyn Write + Send)) -> io::Result<()> {
        self.view.set_page(page);
        match self
            .session
            .get_feed(self.view.page(), self.view.page_size())
            .await
        {
            Ok(feed) => self.view.show_titles(feed.titles()),
            Err(error) => {
                warn!(%error, page, "feed load failed");
                self.view.show_error(error.to_string());
            }
        }
        for line in self.view.render(self.width) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    async fn post(&mut self, text: &str, out: &mut (dyn Write + Send)) -> io::Result<()> {
        match self.session.create_post(text).await {
            Ok(_) => {
                writeln!(out, "Posted.")?;
                self.load(self.view.page(), out).await
            }
            Err(error) => {
                warn!(%error, "post failed");
                writeln!(out, "Post failed: {error}")
            }
        }
    }

    async fn show_status(&mut self, out: &mut (dyn Write + Send)) -> io::Result<()> {
        match self.session.get_agent_status().await {
            Ok(body) => writeln!(out, "Status: {}", ClaimStatus::from_response(&body)),
            Err(error) => writeln!(out, "Status check failed: {error}"),
        }
    }
}
