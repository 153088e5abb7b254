//! Agent-side flows for the moltbook terminal client.
//!
//! Startup runs in three stages: [`lifecycle`] settles which API key to use
//! (registering through [`registration`] when none is stored), [`claim`]
//! waits until a human has claimed the agent, and [`feed`] hands the
//! terminal over to the feed loop. [`app::App`] strings them together.

pub mod app;
pub mod claim;
pub mod cli;
pub mod feed;
pub mod lifecycle;
pub mod registration;

pub use app::{App, AppError, AppExit, ClaimFlow, ClaimMode};
pub use claim::{
    initial_claim_check, ClaimEvent, ClaimInput, ClaimOutcome, ClaimPoller, ClaimReporter,
    ManualPolicy, ManualTrigger, NoManualTrigger, StatusSource,
};
pub use cli::Cli;
pub use feed::{FeedCommand, FeedLoop, FeedSession};
pub use lifecycle::{ApiKeyResult, CredentialLifecycle, LifecycleError, LifecycleState, Registrar};
pub use registration::{PromptRegistrar, RegistrationApi};
