//! ExcavationManager: owns the session, runs the analysis task, and
//! discards results that arrive after a reset.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AnalysisError, WizardError};

use super::analysis::AnalysisClient;
use super::model::TalentResult;
use super::questions::{QUESTION_COUNT, Question};
use super::state::{AnalysisTicket, Resolution, Session, Submission, WizardPhase};

/// Default broadcast channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Notifications for whatever is rendering the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    PhaseChanged { phase: WizardPhase },
    AnalysisCompleted { generation: u64 },
    /// The session has already been reset when this is sent.
    AnalysisFailed { generation: u64, message: String },
    AnalysisDiscarded { generation: u64 },
}

/// Snapshot of the session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub phase: WizardPhase,
    pub question_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TalentResult>,
    /// Message of the last failed analysis, until the next start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<String>,
}

/// Coordinates one session: user actions, the analysis task, and events.
pub struct ExcavationManager {
    session: RwLock<Session>,
    analyst: Arc<AnalysisClient>,
    last_failure: RwLock<Option<String>>,
    events: broadcast::Sender<WizardEvent>,
}

impl ExcavationManager {
    pub fn new(analyst: AnalysisClient) -> Arc<Self> {
        let (events, _rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Arc::new(Self {
            session: RwLock::new(Session::new()),
            analyst: Arc::new(analyst),
            last_failure: RwLock::new(None),
            events,
        })
    }

    /// Subscribe to wizard events.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> WizardPhase {
        self.session.read().await.phase()
    }

    /// Current session snapshot.
    pub async fn status(&self) -> SessionStatus {
        let session = self.session.read().await;
        let last_failure = self.last_failure.read().await.clone();
        let question = session.current_question().copied();

        SessionStatus {
            session_id: session.id(),
            phase: session.phase(),
            question_index: session.current_question_index(),
            total_questions: QUESTION_COUNT,
            answered: session.answers().len(),
            progress_label: question.map(|q| q.progress_label()),
            action_label: question.map(|q| q.action_label()),
            question,
            result: session.result().cloned(),
            last_failure,
        }
    }

    /// Take the pending failure message, clearing it.
    pub async fn take_failure_notice(&self) -> Option<String> {
        self.last_failure.write().await.take()
    }

    /// Welcome → Excavating.
    pub async fn start(&self) -> Result<(), WizardError> {
        let mut session = self.session.write().await;
        session.start()?;
        self.last_failure.write().await.take();
        info!(session_id = %session.id(), generation = session.generation(), "Excavation started");
        self.emit(WizardEvent::PhaseChanged {
            phase: WizardPhase::Excavating,
        });
        Ok(())
    }

    /// Submit the answer for the current question.
    ///
    /// The seventh accepted answer spawns the analysis task.
    pub async fn submit_answer(self: &Arc<Self>, text: &str) -> Result<Submission, WizardError> {
        let submission = {
            let mut session = self.session.write().await;
            match session.submit_answer(text) {
                Ok(submission) => submission,
                Err(e) => {
                    debug!(error = %e, "Answer rejected");
                    return Err(e);
                }
            }
        };

        match &submission {
            Submission::Advanced { index } => {
                debug!(index, "Answer accepted");
            }
            Submission::Analyze(ticket) => {
                info!(
                    generation = ticket.generation,
                    answers = ticket.answers.len(),
                    model = %self.analyst.model_name(),
                    "All answers collected, starting analysis"
                );
                self.emit(WizardEvent::PhaseChanged {
                    phase: WizardPhase::Analyzing,
                });
                self.spawn_analysis(ticket.clone());
            }
        }

        Ok(submission)
    }

    /// Go back one question (or to Welcome from the first).
    pub async fn go_back(&self) -> Result<WizardPhase, WizardError> {
        let mut session = self.session.write().await;
        let before = session.phase();
        let phase = session.go_back()?;
        if phase != before {
            self.emit(WizardEvent::PhaseChanged { phase });
        }
        Ok(phase)
    }

    /// Full reset to Welcome. An in-flight analysis is abandoned.
    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        let abandoned = session.phase() == WizardPhase::Analyzing;
        session.reset();
        if abandoned {
            info!(generation = session.generation(), "Session reset during analysis, result will be discarded");
        } else {
            debug!(generation = session.generation(), "Session reset");
        }
        self.emit(WizardEvent::PhaseChanged {
            phase: WizardPhase::Welcome,
        });
    }

    fn spawn_analysis(self: &Arc<Self>, ticket: AnalysisTicket) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = this.analyst.analyze(&ticket.answers).await;
            this.resolve(ticket.generation, outcome).await;
        });
    }

    async fn resolve(&self, generation: u64, outcome: Result<TalentResult, AnalysisError>) {
        let mut session = self.session.write().await;
        match session.resolve_analysis(generation, outcome) {
            Resolution::Completed => {
                info!(generation, "Talent analysis complete");
                self.emit(WizardEvent::AnalysisCompleted { generation });
                self.emit(WizardEvent::PhaseChanged {
                    phase: WizardPhase::Results,
                });
            }
            Resolution::Failed(err) => {
                warn!(generation, error = %err, "Talent analysis failed, session reset");
                let message = failure_message(&err);
                *self.last_failure.write().await = Some(message.clone());
                self.emit(WizardEvent::AnalysisFailed { generation, message });
                self.emit(WizardEvent::PhaseChanged {
                    phase: WizardPhase::Welcome,
                });
            }
            Resolution::Stale => {
                info!(
                    generation,
                    current = session.generation(),
                    "Discarding analysis result from an abandoned session"
                );
                self.emit(WizardEvent::AnalysisDiscarded { generation });
            }
        }
    }

    fn emit(&self, event: WizardEvent) {
        // Ok if nobody is listening
        let _ = self.events.send(event);
    }
}

/// User-facing text for a failed analysis.
pub fn failure_message(err: &AnalysisError) -> String {
    format!("Excavation interrupted: {err}")
}
