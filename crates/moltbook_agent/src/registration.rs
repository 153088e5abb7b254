use std::io::Write;

use async_trait::async_trait;
use moltbook_api::{ApiError, MoltbookClient, RegisteredAgent};
use moltbook_tui::names::{generate_agents, AgentSuggestion};
use moltbook_tui::prompt::LinePrompt;
use tracing::warn;

use crate::lifecycle::{LifecycleError, NewAgent, Registrar};

pub const SUGGESTION_COUNT: usize = 3;

/// The registration endpoint, separated from the client so the prompt flow
/// can run against a fake.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    async fn register_agent(
        &self,
        name: &str,
        description: &str,
    ) -> Result<RegisteredAgent, ApiError>;
}

#[async_trait]
impl RegistrationApi for MoltbookClient {
    async fn register_agent(
        &self,
        name: &str,
        description: &str,
    ) -> Result<RegisteredAgent, ApiError> {
        MoltbookClient::register_agent(self, name, description).await
    }
}

/// Interactive [`Registrar`]: offers suggestions, collects a name and a
/// description, and retries until the platform accepts them or input ends.
pub struct PromptRegistrar<'a> {
    api: &'a dyn RegistrationApi,
    prompt: &'a mut dyn LinePrompt,
    out: &'a mut (dyn Write + Send),
    suggestions: Vec<AgentSuggestion>,
}

impl<'a> PromptRegistrar<'a> {
    pub fn new(
        api: &'a dyn RegistrationApi,
        prompt: &'a mut dyn LinePrompt,
        out: &'a mut (dyn Write + Send),
    ) -> Self {
        Self::with_suggestions(api, prompt, out, generate_agents(SUGGESTION_COUNT))
    }

    pub fn with_suggestions(
        api: &'a dyn RegistrationApi,
        prompt: &'a mut dyn LinePrompt,
        out: &'a mut (dyn Write + Send),
        suggestions: Vec<AgentSuggestion>,
    ) -> Self {
        Self {
            api,
            prompt,
            out,
            suggestions,
        }
    }

    fn show_suggestions(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "No API key found. Register a new agent.")?;
        if self.suggestions.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "Suggestions:")?;
        for (index, suggestion) in self.suggestions.iter().enumerate() {
            writeln!(
                self.out,
                "  {}. {} - {}",
                index + 1,
                suggestion.name,
                suggestion.description
            )?;
        }
        Ok(())
    }

    /// A number picks a suggestion and makes its description the default.
    fn pick(&self, answer: &str) -> (String, Option<String>) {
        let chosen = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| self.suggestions.get(index));
        match chosen {
            Some(suggestion) => (
                suggestion.name.clone(),
                Some(suggestion.description.clone()),
            ),
            None => (answer.to_string(), None),
        }
    }

    async fn ask(&mut self, question: &str) -> Result<String, LifecycleError> {
        match self.prompt.ask(question).await? {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(LifecycleError::Aborted),
        }
    }

    async fn ask_name(&mut self) -> Result<(String, Option<String>), LifecycleError> {
        loop {
            let answer = self.ask("Agent name (or suggestion number): ").await?;
            let (name, default_description) = self.pick(&answer);
            if !name.is_empty() {
                return Ok((name, default_description));
            }
            writeln!(self.out, "Agent name is required.")?;
        }
    }

    async fn ask_description(&mut self, default: Option<&str>) -> Result<String, LifecycleError> {
        let question = match default {
            Some(default) => format!("Description [{default}]: "),
            None => "Description: ".to_string(),
        };
        loop {
            let answer = self.ask(&question).await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(default) = default {
                return Ok(default.to_string());
            }
            writeln!(self.out, "Description is required.")?;
        }
    }
}

#[async_trait]
impl Registrar for PromptRegistrar<'_> {
    async fn register(&mut self) -> Result<NewAgent, LifecycleError> {
        self.show_suggestions()?;
        loop {
            let (name, default_description) = self.ask_name().await?;
            let description = self
                .ask_description(default_description.as_deref())
                .await?;

            writeln!(self.out, "Registering {name}...")?;
            match self.api.register_agent(&name, &description).await {
                Ok(agent) => {
                    writeln!(self.out, "Registered {name}.")?;
                    return Ok(NewAgent { name, agent });
                }
                Err(error) => {
                    warn!(%error, "agent registration rejected");
                    writeln!(self.out, "Registration failed: {error}")?;
                    writeln!(self.out, "Try again with a different name.")?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moltbook_api::StatusCode;
    use moltbook_tui::prompt::ScriptedPrompt;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RegistrationSpy {
        calls: Mutex<Vec<(String, String)>>,
        reject_first: bool,
    }

    #[async_trait]
    impl RegistrationApi for RegistrationSpy {
        async fn register_agent(
            &self,
            name: &str,
            description: &str,
        ) -> Result<RegisteredAgent, ApiError> {
            let mut calls = self.calls.lock().expect("calls");
            calls.push((name.to_string(), description.to_string()));
            if self.reject_first && calls.len() == 1 {
                return Err(ApiError::RegistrationFailed {
                    status: StatusCode::CONFLICT,
                    message: "Name already taken".to_string(),
                });
            }
            Ok(RegisteredAgent {
                api_key: format!("moltbook_sk_{}", calls.len()),
                claim_url: String::new(),
                verification_code: String::new(),
            })
        }
    }

    fn suggestions() -> Vec<AgentSuggestion> {
        vec![
            AgentSuggestion {
                name: "Iris Quill".to_string(),
                description: "Curious agent cataloguing sea shells.".to_string(),
            },
            AgentSuggestion {
                name: "Finn Thorne".to_string(),
                description: "Quiet optimist.".to_string(),
            },
        ]
    }

    async fn register(
        api: &RegistrationSpy,
        answers: &[&str],
    ) -> (Result<NewAgent, LifecycleError>, String, ScriptedPrompt) {
        let mut prompt = ScriptedPrompt::new(answers.iter().copied());
        let mut out = Vec::new();
        let result = PromptRegistrar::with_suggestions(api, &mut prompt, &mut out, suggestions())
            .register()
            .await;
        (result, String::from_utf8(out).expect("utf8"), prompt)
    }

    #[tokio::test]
    async fn number_picks_suggestion_and_blank_keeps_its_description() {
        let api = RegistrationSpy::default();

        let (result, out, prompt) = register(&api, &["2", ""]).await;

        let agent = result.expect("registered");
        assert_eq!(agent.name, "Finn Thorne");
        assert_eq!(
            *api.calls.lock().expect("calls"),
            vec![("Finn Thorne".to_string(), "Quiet optimist.".to_string())]
        );
        assert!(out.contains("  1. Iris Quill - Curious agent cataloguing sea shells."));
        assert_eq!(prompt.questions()[1], "Description [Quiet optimist.]: ");
    }

    #[tokio::test]
    async fn empty_fields_are_asked_again() {
        let api = RegistrationSpy::default();

        let (result, out, _) = register(&api, &["", "  Reef Bot ", "", "Watches reefs."]).await;

        assert_eq!(result.expect("registered").name, "Reef Bot");
        assert!(out.contains("Agent name is required."));
        assert!(out.contains("Description is required."));
        assert_eq!(api.calls.lock().expect("calls").len(), 1);
    }

    #[tokio::test]
    async fn rejection_is_shown_and_operator_retries() {
        let api = RegistrationSpy {
            reject_first: true,
            ..RegistrationSpy::default()
        };

        let (result, out, _) = register(&api, &["Taken", "d", "Fresh", "d"]).await;

        let agent = result.expect("registered on retry");
        assert_eq!(agent.name, "Fresh");
        assert_eq!(agent.agent.api_key, "moltbook_sk_2");
        assert!(out.contains("Registration failed: Name already taken"));
    }

    #[tokio::test]
    async fn end_of_input_aborts() {
        let api = RegistrationSpy::default();

        let (result, _, _) = register(&api, &["Half"]).await;

        assert!(matches!(result, Err(LifecycleError::Aborted)));
        assert!(api.calls.lock().expect("calls").is_empty());
    }
}
