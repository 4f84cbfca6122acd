//! Wizard state machine: tracks the phase, the current question, and the
//! answers collected so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AnalysisError, ValidationError, WizardError};

use super::model::TalentResult;
use super::questions::{self, LAST_QUESTION_INDEX, Question};

/// Minimum trimmed length, in characters, of an accepted answer.
pub const MIN_ANSWER_CHARS: usize = 3;

/// The phases of a session.
///
/// Welcome → Excavating → Analyzing → Results, with reset returning to Welcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Welcome,
    Excavating,
    Analyzing,
    Results,
}

impl WizardPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardPhase) -> bool {
        use WizardPhase::*;
        matches!(
            (self, target),
            (Welcome, Excavating)
                | (Excavating, Excavating)
                | (Excavating, Analyzing)
                | (Excavating, Welcome)
                | (Analyzing, Results)
                | (Analyzing, Welcome)
                | (Results, Welcome)
        )
    }
}

impl Default for WizardPhase {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Excavating => "excavating",
            Self::Analyzing => "analyzing",
            Self::Results => "results",
        };
        write!(f, "{s}")
    }
}

/// Check an answer against the minimum-length rule.
pub fn validate_answer(text: &str) -> Result<(), ValidationError> {
    let actual = text.trim().chars().count();
    if actual < MIN_ANSWER_CHARS {
        return Err(ValidationError::AnswerTooShort {
            min: MIN_ANSWER_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Everything the analysis task needs, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub answers: Vec<String>,
}

/// Outcome of an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Moved on to the question at `index`.
    Advanced { index: usize },
    /// The last answer was stored and the session entered `Analyzing`.
    Analyze(AnalysisTicket),
}

/// Outcome of applying an analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Completed,
    /// The session was reset; the message should be shown to the user.
    Failed(AnalysisError),
    /// The result belongs to an abandoned generation and was dropped.
    Stale,
}

/// One live quiz instance.
///
/// `answers.len() == current_question_index` holds whenever the phase is
/// `Excavating`; every method updates both together.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: Uuid,
    phase: WizardPhase,
    current_question_index: usize,
    answers: Vec<String>,
    result: Option<TalentResult>,
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: WizardPhase::default(),
            current_question_index: 0,
            answers: Vec::new(),
            result: None,
            generation: 0,
            started_at: None,
            completed_at: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn result(&self) -> Option<&TalentResult> {
        self.result.as_ref()
    }

    /// Monotonic counter bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The question being asked, while excavating.
    pub fn current_question(&self) -> Option<&'static Question> {
        match self.phase {
            WizardPhase::Excavating => questions::question(self.current_question_index),
            _ => None,
        }
    }

    /// Welcome → Excavating.
    pub fn start(&mut self) -> Result<(), WizardError> {
        self.ensure(WizardPhase::Excavating, "start")?;
        self.phase = WizardPhase::Excavating;
        self.current_question_index = 0;
        self.answers.clear();
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Store an answer and advance, or enter `Analyzing` after the last one.
    ///
    /// A too-short answer leaves the session untouched.
    pub fn submit_answer(&mut self, text: &str) -> Result<Submission, WizardError> {
        if self.phase != WizardPhase::Excavating {
            return Err(self.invalid("submit an answer"));
        }
        validate_answer(text)?;

        self.answers.push(text.to_string());
        if self.current_question_index >= LAST_QUESTION_INDEX {
            self.phase = WizardPhase::Analyzing;
            return Ok(Submission::Analyze(AnalysisTicket {
                generation: self.generation,
                answers: self.answers.clone(),
            }));
        }

        self.current_question_index += 1;
        Ok(Submission::Advanced {
            index: self.current_question_index,
        })
    }

    /// Step back one question, or leave for Welcome from the first one.
    ///
    /// A no-op in Welcome.
    pub fn go_back(&mut self) -> Result<WizardPhase, WizardError> {
        match self.phase {
            WizardPhase::Welcome => Ok(self.phase),
            WizardPhase::Excavating if self.current_question_index == 0 => {
                self.phase = WizardPhase::Welcome;
                self.answers.clear();
                self.started_at = None;
                Ok(self.phase)
            }
            WizardPhase::Excavating => {
                self.answers.pop();
                self.current_question_index -= 1;
                Ok(self.phase)
            }
            _ => Err(self.invalid("go back")),
        }
    }

    /// Apply the outcome of the analysis started for `generation`.
    pub fn resolve_analysis(
        &mut self,
        generation: u64,
        outcome: Result<TalentResult, AnalysisError>,
    ) -> Resolution {
        if generation != self.generation || self.phase != WizardPhase::Analyzing {
            return Resolution::Stale;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = WizardPhase::Results;
                self.completed_at = Some(Utc::now());
                Resolution::Completed
            }
            Err(err) => {
                self.reset();
                Resolution::Failed(err)
            }
        }
    }

    /// Return to a fresh Welcome session from any phase.
    ///
    /// Bumps the generation so an in-flight analysis can no longer land.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    fn ensure(&self, target: WizardPhase, action: &str) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Welcome && self.phase.can_transition_to(target) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> WizardError {
        WizardError::InvalidTransition {
            phase: self.phase.to_string(),
            action: action.to_string(),
        }
    }
}
