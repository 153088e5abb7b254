//! Line-oriented operator input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Asks a question and waits for one line of input.
#[async_trait]
pub trait LinePrompt: Send {
    /// The answer without its line terminator, or `None` once input is
    /// exhausted. An empty `question` prints nothing.
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
}

/// Forwards stdin lines into a channel from a dedicated thread.
///
/// Blocking reads stay off the async runtime; the channel closes at EOF or
/// on a read error.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(error) => {
                    warn!(%error, "stdin read failed");
                    break;
                }
            };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}

/// [`LinePrompt`] over a line channel, echoing questions to a writer.
pub struct ChannelPrompt<W> {
    lines: mpsc::UnboundedReceiver<String>,
    out: W,
}

impl ChannelPrompt<io::Stdout> {
    /// Prompt reading from stdin and writing to stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(spawn_stdin_reader(), io::stdout())
    }
}

impl<W: Write + Send> ChannelPrompt<W> {
    #[must_use]
    pub fn new(lines: mpsc::UnboundedReceiver<String>, out: W) -> Self {
        Self { lines, out }
    }
}

#[async_trait]
impl<W: Write + Send> LinePrompt for ChannelPrompt<W> {
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        if !question.is_empty() {
            self.out.write_all(question.as_bytes())?;
            self.out.flush()?;
        }
        Ok(self
            .lines
            .recv()
            .await
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays canned answers and records every question asked.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl LinePrompt for ScriptedPrompt {
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_prompt_echoes_question_and_strips_terminator() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut prompt = ChannelPrompt::new(rx, Vec::new());
        tx.send("done\r".to_string()).expect("send");
        drop(tx);

        let answer = prompt.ask("Type 'done': ").await.expect("ask");
        assert_eq!(answer.as_deref(), Some("done"));
        assert_eq!(prompt.ask("again? ").await.expect("ask"), None);
        assert_eq!(
            String::from_utf8(prompt.out.clone()).expect("utf8"),
            "Type 'done': again? "
        );
    }

    #[tokio::test]
    async fn scripted_prompt_records_questions_until_exhausted() {
        let mut prompt = ScriptedPrompt::new(["a"]);

        assert_eq!(prompt.ask("first").await.expect("ask").as_deref(), Some("a"));
        assert_eq!(prompt.ask("second").await.expect("ask"), None);
        assert_eq!(prompt.questions(), ["first", "second"]);
    }
}
