//! The seven fixed excavation prompts.

use serde::Serialize;

/// Number of questions in every excavation.
pub const QUESTION_COUNT: usize = 7;

/// Index of the question whose answer triggers analysis.
pub const LAST_QUESTION_INDEX: usize = QUESTION_COUNT - 1;

/// One prompt shown during excavation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub index: usize,
    pub prompt: &'static str,
    pub helper_text: &'static str,
    pub placeholder_text: &'static str,
}

impl Question {
    /// "Fragment 3 / 7".
    pub fn progress_label(&self) -> String {
        format!("Fragment {} / {}", self.index + 1, QUESTION_COUNT)
    }

    /// Fraction of the excavation reached once this question is shown.
    pub fn progress(&self) -> f32 {
        (self.index + 1) as f32 / QUESTION_COUNT as f32
    }

    pub fn is_last(&self) -> bool {
        self.index == LAST_QUESTION_INDEX
    }

    /// Label of the button/command that submits this answer.
    pub fn action_label(&self) -> &'static str {
        if self.is_last() { "Analyze core" } else { "Next" }
    }
}

pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        index: 0,
        prompt: "Think back to when you were about ten. What kind of trouble were you best at solving?",
        helper_text: "This is your most primitive, undisturbed processing instinct.",
        placeholder_text: "e.g. smoothing things over between friends, taking apart complicated toys...",
    },
    Question {
        index: 1,
        prompt: "With no reward on offer, what have you pursued with an obsession that ignored the cost?",
        helper_text: "The things you play at while others call it work.",
        placeholder_text: "Describe the deep-focus moments that made you lose track of time...",
    },
    Question {
        index: 2,
        prompt: "What comes effortlessly to you but is painful for other people?",
        helper_text: "Talent is an innate, efficient path through information.",
        placeholder_text: "e.g. pulling patterns out of chaos, obsessive control over detail...",
    },
    Question {
        index: 3,
        prompt: "If you had a hundred million dollars in the bank, what would you still be doing a year from now?",
        helper_text: "The pure action that remains once survival pressure is gone.",
        placeholder_text: "What is the thing you have to express through doing it?",
    },
    Question {
        index: 4,
        prompt: "When you envy someone, which specific ability is it that you envy?",
        helper_text: "Envy is a compass pointing at potential you want to release.",
        placeholder_text: "Their logic? Their intuition? Their power to move a crowd?",
    },
    Question {
        index: 5,
        prompt: "If you wrote a book that changed the world, which field would you offer a unique view on?",
        helper_text: "This dissent is the seed of your specific knowledge.",
        placeholder_text: "Which established rule makes you deeply impatient?",
    },
    Question {
        index: 6,
        prompt: "What kind of complex problem do you want to earn respect for solving?",
        helper_text: "Talent ultimately needs recognition through a social contract.",
        placeholder_text: "e.g. reshaping aesthetics, building automated systems...",
    },
];

/// Look up a question by its 0-based index.
pub fn question(index: usize) -> Option<&'static Question> {
    QUESTIONS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_positions() {
        for (position, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.index, position);
            assert!(!q.prompt.is_empty());
            assert!(!q.helper_text.is_empty());
            assert!(!q.placeholder_text.is_empty());
        }
    }

    #[test]
    fn only_last_question_analyzes() {
        let last: Vec<usize> = QUESTIONS.iter().filter(|q| q.is_last()).map(|q| q.index).collect();
        assert_eq!(last, vec![6]);
        assert_eq!(QUESTIONS[6].action_label(), "Analyze core");
        assert_eq!(QUESTIONS[0].action_label(), "Next");
    }

    #[test]
    fn progress_label_is_one_based() {
        assert_eq!(QUESTIONS[0].progress_label(), "Fragment 1 / 7");
        assert_eq!(QUESTIONS[6].progress_label(), "Fragment 7 / 7");
        assert_eq!(QUESTIONS[6].progress(), 1.0);
    }

    #[test]
    fn lookup_out_of_range() {
        assert!(question(6).is_some());
        assert!(question(7).is_none());
    }
}
