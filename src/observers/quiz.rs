use crate::events::EventKind;
use std::time::Instant;

/// Element ids the quiz observer reacts to.
#[derive(Debug, Clone)]
pub struct QuizIds {
    pub start_button: String,
    pub lead_form: String,
}

impl Default for QuizIds {
    fn default() -> Self {
        Self {
            start_button: "start-quiz".to_string(),
            lead_form: "lead-capture-form".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct QuizTracker {
    ids: QuizIds,
    started_at: Option<Instant>,
    question_shown_at: Option<Instant>,
}

impl QuizTracker {
    pub fn new(ids: QuizIds) -> Self {
        Self {
            ids,
            started_at: None,
            question_shown_at: None,
        }
    }

    pub fn click_button(&mut self, button_id: &str, at: Instant) -> Option<EventKind> {
        if button_id != self.ids.start_button {
            return None;
        }
        self.started_at = Some(at);
        Some(EventKind::QuizStarted {
            button_id: button_id.to_string(),
        })
    }

    pub fn question_rendered(&mut self, at: Instant) {
        self.question_shown_at = Some(at);
    }

    /// Time to answer counts from the last rendered question, falling back to
    /// the quiz start.
    pub fn answer_selected(&mut self, question: &str, answer: &str, at: Instant) -> EventKind {
        let since = self.question_shown_at.or(self.started_at);
        let time_to_answer_ms =
            since.map(|shown| at.saturating_duration_since(shown).as_millis() as u64);
        EventKind::QuizAnswerSelected {
            question: question.to_string(),
            answer: answer.to_string(),
            time_to_answer_ms,
        }
    }

    pub fn form_submitted(&self, form_id: &str) -> Option<EventKind> {
        (form_id == self.ids.lead_form).then(|| EventKind::QuizCompleted {
            form_id: form_id.to_string(),
        })
    }
}
