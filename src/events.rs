use crate::context::PageType;
use crate::session::SessionContext;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One variant per tracked interaction, each with a fixed payload.
///
/// Serialises adjacently: `{"event_type": "scroll_depth", "event_data": {"depth": 25}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_data", rename_all = "snake_case")]
pub enum EventKind {
    PageView {},
    ScrollDepth {
        depth: u8,
    },
    MaxScrollDepth {
        max_depth: u8,
    },
    TimeOnPage {
        milestone_seconds: u64,
        elapsed_seconds: u64,
    },
    PageExit {
        seconds_on_page: u64,
    },
    FormFieldFocus {
        form_id: String,
        field_name: String,
        field_type: String,
    },
    FormFieldCompleted {
        form_id: String,
        field_name: String,
        field_type: String,
    },
    FormSubmitted {
        form_id: String,
        fields: Vec<String>,
    },
    QuizStarted {
        button_id: String,
    },
    QuizAnswerSelected {
        question: String,
        answer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        time_to_answer_ms: Option<u64>,
    },
    QuizCompleted {
        form_id: String,
    },
    ButtonClick {
        text: String,
        element_id: String,
        classes: Vec<String>,
        dom_path: String,
    },
    TrackedElementClick {
        tracking_id: String,
        tag: String,
        text: String,
    },
    LinkClick {
        href: String,
        text: String,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PageView {} => "page_view",
            Self::ScrollDepth { .. } => "scroll_depth",
            Self::MaxScrollDepth { .. } => "max_scroll_depth",
            Self::TimeOnPage { .. } => "time_on_page",
            Self::PageExit { .. } => "page_exit",
            Self::FormFieldFocus { .. } => "form_field_focus",
            Self::FormFieldCompleted { .. } => "form_field_completed",
            Self::FormSubmitted { .. } => "form_submitted",
            Self::QuizStarted { .. } => "quiz_started",
            Self::QuizAnswerSelected { .. } => "quiz_answer_selected",
            Self::QuizCompleted { .. } => "quiz_completed",
            Self::ButtonClick { .. } => "button_click",
            Self::TrackedElementClick { .. } => "tracked_element_click",
            Self::LinkClick { .. } => "link_click",
        }
    }
}

/// The flat, append-only row written to the behaviour table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub session_id: String,
    pub user_id: String,
    pub flow_hash: String,
    pub page_type: PageType,
    pub niche: String,
    pub bucket: String,
    pub variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub traffic_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub landing_page: String,
    pub entry_point: String,
    pub page_url: String,
    pub timestamp: String,
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl BehaviorEvent {
    pub fn new(kind: EventKind, session: &SessionContext, at: DateTime<Utc>) -> Self {
        let SessionContext {
            identity,
            attribution,
            profile,
            page,
            page_url,
            environment,
        } = session;

        Self {
            kind,
            session_id: identity.session_id.clone(),
            user_id: identity.user_id.clone(),
            flow_hash: identity.flow_hash.clone(),
            page_type: page.page_type,
            niche: page.niche.clone(),
            bucket: page.bucket.clone(),
            variant: page.variant.clone(),
            user_email: profile.email.clone(),
            user_name: profile.name.clone(),
            traffic_source: attribution.traffic_source.clone(),
            utm_medium: attribution.utm_medium.clone(),
            utm_campaign: attribution.utm_campaign.clone(),
            landing_page: attribution.landing_page.clone(),
            entry_point: attribution.entry_point.clone(),
            page_url: page_url.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: environment.user_agent.clone(),
            screen_width: environment.screen_width,
            screen_height: environment.screen_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryStore;
    use crate::session::{ClientEnvironment, PageLoad};
    use chrono::TimeZone;
    use reqwest::Url;

    fn session() -> SessionContext {
        let mut store = MemoryStore::new();
        let url = Url::parse("https://funnel.example/quiz.html?utm_source=fb").unwrap();
        let load = PageLoad::new(url);
        let env = ClientEnvironment {
            user_agent: "Mozilla/5.0".into(),
            screen_width: 1280,
            screen_height: 800,
        };
        SessionContext::establish(&mut store, &load, env)
    }

    #[test]
    fn event_serialises_as_flat_row() {
        let session = session();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let event = BehaviorEvent::new(EventKind::ScrollDepth { depth: 50 }, &session, at);
        let row = serde_json::to_value(&event).unwrap();

        assert_eq!(row["event_type"], "scroll_depth");
        assert_eq!(row["event_data"]["depth"], 50);
        assert_eq!(row["session_id"], session.identity.session_id.as_str());
        assert_eq!(row["page_type"], "quiz");
        assert_eq!(row["traffic_source"], "fb");
        assert_eq!(row["timestamp"], "2026-03-01T12:00:00.000Z");
        assert_eq!(row["screen_width"], 1280);
        assert!(row.get("user_email").is_none());
    }

    #[test]
    fn page_view_has_empty_payload() {
        let row = serde_json::to_value(EventKind::PageView {}).unwrap();
        assert_eq!(row, serde_json::json!({ "event_type": "page_view", "event_data": {} }));
    }

    #[test]
    fn names_match_serialised_tags() {
        let kinds = [
            EventKind::PageView {},
            EventKind::TimeOnPage { milestone_seconds: 10, elapsed_seconds: 11 },
            EventKind::QuizAnswerSelected {
                question: "q1".into(),
                answer: "yes".into(),
                time_to_answer_ms: None,
            },
            EventKind::LinkClick { href: "/next".into(), text: "Next".into() },
        ];
        for kind in kinds {
            let row = serde_json::to_value(&kind).unwrap();
            assert_eq!(row["event_type"], kind.name());
        }
    }
}
