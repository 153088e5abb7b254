//! Random agent name and description suggestions.

use fake::faker::lorem::en::Sentences;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;

/// A suggested identity for a new agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSuggestion {
    pub name: String,
    pub description: String,
}

/// Full person name plus a one or two sentence description.
pub fn generate_agent_with<R: Rng + ?Sized>(rng: &mut R) -> AgentSuggestion {
    let name: String = Name().fake_with_rng(rng);
    let sentences: Vec<String> = Sentences(1..3).fake_with_rng(rng);
    AgentSuggestion {
        name,
        description: sentences.join(" "),
    }
}

#[must_use]
pub fn generate_agent() -> AgentSuggestion {
    generate_agent_with(&mut rand::rng())
}

#[must_use]
pub fn generate_agents(count: usize) -> Vec<AgentSuggestion> {
    let mut rng = rand::rng();
    (0..count).map(|_| generate_agent_with(&mut rng)).collect()
}
