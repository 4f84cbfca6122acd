//! The structured talent report returned by analysis.

use serde::{Deserialize, Serialize};

/// Number of entries kept in each list section of the report.
pub const SECTION_LEN: usize = 3;

/// One innate ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicAbility {
    pub name: String,
    pub description: String,
}

/// A career that leverages the user's abilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureCareer {
    pub title: String,
    pub description: String,
    /// The point of leverage this career exploits.
    pub leverage: String,
}

/// The parsed analysis output.
///
/// Field names on the wire are camelCase, matching the requested schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentResult {
    pub manifesto: String,
    pub atomic_abilities: Vec<AtomicAbility>,
    pub specific_knowledge: String,
    pub future_careers: Vec<FutureCareer>,
    pub roadmap: Vec<String>,
}

impl TalentResult {
    /// Enforce the report shape.
    ///
    /// Every text field must be non-blank and every list must hold at least
    /// `SECTION_LEN` entries; longer lists are cut to `SECTION_LEN`.
    pub fn normalize(mut self) -> Result<Self, String> {
        require_text("manifesto", &self.manifesto)?;
        require_text("specificKnowledge", &self.specific_knowledge)?;

        require_len("atomicAbilities", self.atomic_abilities.len())?;
        require_len("futureCareers", self.future_careers.len())?;
        require_len("roadmap", self.roadmap.len())?;

        self.atomic_abilities.truncate(SECTION_LEN);
        self.future_careers.truncate(SECTION_LEN);
        self.roadmap.truncate(SECTION_LEN);

        for (i, a) in self.atomic_abilities.iter().enumerate() {
            require_text(&format!("atomicAbilities[{i}].name"), &a.name)?;
            require_text(&format!("atomicAbilities[{i}].description"), &a.description)?;
        }
        for (i, c) in self.future_careers.iter().enumerate() {
            require_text(&format!("futureCareers[{i}].title"), &c.title)?;
            require_text(&format!("futureCareers[{i}].description"), &c.description)?;
            require_text(&format!("futureCareers[{i}].leverage"), &c.leverage)?;
        }
        for (i, step) in self.roadmap.iter().enumerate() {
            require_text(&format!("roadmap[{i}]"), step)?;
        }

        Ok(self)
    }

    /// Render the report as plain text for a terminal.
    pub fn to_report_text(&self) -> String {
        let mut parts = vec![
            "# Excavation Report: Specific Knowledge".to_string(),
            String::new(),
            format!("\"{}\"", self.manifesto),
            String::new(),
            "## Atomic Abilities".to_string(),
        ];

        for (i, a) in self.atomic_abilities.iter().enumerate() {
            parts.push(format!("0{}  {}", i + 1, a.name));
            parts.push(format!("    {}", a.description));
        }

        parts.push(String::new());
        parts.push("## Roadmap".to_string());
        for (i, step) in self.roadmap.iter().enumerate() {
            parts.push(format!("[{}] {}", i + 1, step));
        }

        parts.push(String::new());
        parts.push("## Specific Knowledge".to_string());
        parts.push(format!("\"{}\"", self.specific_knowledge));

        parts.push(String::new());
        parts.push("## Career Leverage Map".to_string());
        for c in &self.future_careers {
            parts.push(format!("- {}", c.title));
            parts.push(format!("  {}", c.description));
            parts.push(format!("  Leverage: {}", c.leverage));
        }

        parts.join("\n")
    }
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("field `{field}` is empty"))
    } else {
        Ok(())
    }
}

fn require_len(field: &str, len: usize) -> Result<(), String> {
    if len < SECTION_LEN {
        Err(format!(
            "field `{field}` has {len} entries, expected {SECTION_LEN}"
        ))
    } else {
        Ok(())
    }
}
