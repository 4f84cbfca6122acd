//! CLI channel: drives a session from stdin/stdout.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::error::WizardError;
use crate::excavation::{ExcavationManager, SessionStatus, WizardPhase};

/// Width of the progress bar, in cells.
const PROGRESS_WIDTH: usize = 14;

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Back,
    Reset,
    Text(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Self::Quit,
            "/back" => Self::Back,
            "/reset" => Self::Reset,
            _ => Self::Text(line.to_string()),
        }
    }
}

/// Terminal front end for one `ExcavationManager`.
pub struct CliChannel {
    manager: Arc<ExcavationManager>,
}

impl CliChannel {
    pub fn new(manager: Arc<ExcavationManager>) -> Self {
        Self { manager }
    }

    /// Run on stdin/stdout until `/quit` or EOF.
    pub async fn run(&self) -> io::Result<()> {
        let lines = spawn_stdin_reader();
        self.drive(lines, &mut io::stdout()).await
    }

    /// Run against any line source and writer until `/quit` or the source closes.
    pub async fn drive<W: Write>(
        &self,
        mut lines: mpsc::UnboundedReceiver<String>,
        out: &mut W,
    ) -> io::Result<()> {
        // Subscribe before the first render so no resolution can slip
        // between what was drawn and what is awaited.
        let mut events = self.manager.subscribe();

        let Some(mut shown) = self.render(out, &mut lines).await? else {
            return Ok(());
        };

        loop {
            if shown == WizardPhase::Analyzing {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(_) | Err(RecvError::Lagged(_)) => {
                            if self.manager.phase().await == WizardPhase::Analyzing {
                                continue;
                            }
                        }
                        Err(RecvError::Closed) => break,
                    },
                    line = lines.recv() => match line.map(|l| Command::parse(&l)) {
                        None | Some(Command::Quit) => break,
                        Some(Command::Reset) => self.manager.reset().await,
                        Some(_) => {
                            writeln!(out, "   Still digging... (/reset to abandon)")?;
                            out.flush()?;
                            continue;
                        }
                    },
                }
            } else {
                let Some(line) = lines.recv().await else {
                    break;
                };

                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Reset => self.manager.reset().await,
                    Command::Back => {
                        if let Err(e) = self.manager.go_back().await {
                            tracing::debug!(error = %e, "Back ignored");
                        }
                    }
                    Command::Text(text) => self.handle_text(&text).await,
                }
            }

            match self.render(out, &mut lines).await? {
                Some(phase) => shown = phase,
                None => break,
            }
        }

        Ok(())
    }

    async fn handle_text(&self, text: &str) {
        match self.manager.phase().await {
            WizardPhase::Welcome => {
                if let Err(e) = self.manager.start().await {
                    tracing::warn!(error = %e, "Could not start excavation");
                }
            }
            WizardPhase::Results => {
                self.manager.reset().await;
            }
            WizardPhase::Excavating => match self.manager.submit_answer(text).await {
                Ok(_) => {}
                // Too short: stay on the same question.
                Err(WizardError::Validation(_)) => {}
                Err(e) => tracing::warn!(error = %e, "Answer not accepted"),
            },
            WizardPhase::Analyzing => {}
        }
    }

    /// Draw the current view and return the phase it shows.
    ///
    /// A pending failure notice is printed first and held until the user
    /// presses Enter. `None` means the line source closed while waiting.
    async fn render<W: Write>(
        &self,
        out: &mut W,
        lines: &mut mpsc::UnboundedReceiver<String>,
    ) -> io::Result<Option<WizardPhase>> {
        if let Some(notice) = self.manager.take_failure_notice().await {
            writeln!(out, "\n⚠️  {}\n", notice)?;
            write!(out, "Press Enter to continue. ")?;
            out.flush()?;
            if lines.recv().await.is_none() {
                return Ok(None);
            }
        }

        let status = self.manager.status().await;
        writeln!(out, "\n{}\n", render_view(&status))?;
        if status.phase != WizardPhase::Analyzing {
            write!(out, "> ")?;
        }
        out.flush()?;
        Ok(Some(status.phase))
    }
}

/// Read stdin lines on a background task.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Render the view for a session snapshot.
pub fn render_view(status: &SessionStatus) -> String {
    match status.phase {
        WizardPhase::Welcome => [
            "TALENT",
            "ARCHAEOLOGIST",
            "",
            "Reject the mediocre templates of socialization. Here we use first",
            "principles to excavate your buried \"specific knowledge\".",
            "",
            "Press Enter to start the excavation. (/quit to exit)",
        ]
        .join("\n"),
        WizardPhase::Excavating => match status.question {
            Some(q) => {
                let filled = (q.progress() * PROGRESS_WIDTH as f32).round() as usize;
                let bar = format!(
                    "{}{}",
                    "█".repeat(filled),
                    "░".repeat(PROGRESS_WIDTH.saturating_sub(filled))
                );
                [
                    format!("{}  {}", q.progress_label(), bar),
                    String::new(),
                    q.prompt.to_string(),
                    q.helper_text.to_string(),
                    format!("  hint: {}", q.placeholder_text),
                    String::new(),
                    format!("[Enter] {}   /back Back   /reset Restart", q.action_label()),
                ]
                .join("\n")
            }
            None => String::new(),
        },
        WizardPhase::Analyzing => {
            "Penetrating the strata, extracting atomic genes...".to_string()
        }
        WizardPhase::Results => match status.result {
            Some(ref result) => format!(
                "{}\n\nPress Enter to begin the next excavation. (/quit to exit)",
                result.to_report_text()
            ),
            None => String::new(),
        },
    }
}
