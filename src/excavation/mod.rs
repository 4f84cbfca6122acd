//! Excavation: the seven-question talent wizard.
//!
//! A session walks Welcome → Excavating → Analyzing → Results. The seventh
//! answer hands the collected answers to the `AnalysisClient`, which asks an
//! LLM for a structured `TalentResult`. Any analysis failure resets the
//! session to Welcome.

pub mod analysis;
pub mod manager;
pub mod model;
pub mod prompts;
pub mod questions;
pub mod routes;
pub mod state;

pub use analysis::AnalysisClient;
pub use manager::{ExcavationManager, SessionStatus, WizardEvent};
pub use model::{AtomicAbility, FutureCareer, TalentResult};
pub use questions::{QUESTION_COUNT, QUESTIONS, Question};
pub use routes::{ExcavationRouteState, excavation_routes};
pub use state::{Session, Submission, WizardPhase};
