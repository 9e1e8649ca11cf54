pub mod replay;

pub use replay::{CompletedSession, EventOutcome, OutcomeStatus, ScenarioRunner, SessionReport};
