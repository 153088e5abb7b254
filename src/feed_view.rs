//! Text rendering of one feed page.

use crate::text::{single_line, truncate_to_width};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FeedState {
    Loaded(Vec<String>),
    Failed(String),
}

/// Current page number plus either its titles or the error that replaced
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    page: u32,
    page_size: u32,
    state: FeedState,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedView {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            state: FeedState::Loaded(Vec::new()),
        }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn show_titles<I, S>(&mut self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state = FeedState::Loaded(titles.into_iter().map(Into::into).collect());
    }

    /// Keeps the previous titles out of view; only the error is shown.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.state = FeedState::Failed(message.into());
    }

    #[must_use]
    pub fn titles(&self) -> &[String] {
        match &self.state {
            FeedState::Loaded(titles) => titles,
            FeedState::Failed(_) => &[],
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match &self.state {
            FeedState::Loaded(_) => format!("Feed (Page {})", self.page),
            FeedState::Failed(message) => format!("Feed (Error: {message})"),
        }
    }

    /// Label line followed by one numbered, width-limited line per title.
    #[must_use]
    pub fn render(&self, width: usize) -> Vec<String> {
        let mut lines = vec![truncate_to_width(&format!("== {} ==", self.label()), width)];

        let titles = self.titles();
        if titles.is_empty() && matches!(self.state, FeedState::Loaded(_)) {
            lines.push(truncate_to_width("  (no posts)", width));
        }

        let first = (self.page - 1).saturating_mul(self.page_size) as usize + 1;
        for (offset, title) in titles.iter().enumerate() {
            let title = if title.trim().is_empty() {
                "(untitled)".to_string()
            } else {
                single_line(title)
            };
            lines.push(truncate_to_width(
                &format!("{:>3}. {title}", first + offset),
                width,
            ));
        }
        lines
    }
}
