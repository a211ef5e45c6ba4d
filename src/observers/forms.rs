use crate::events::EventKind;
use crate::session::SessionContext;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// The field names present in a form at submit time.
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub form_id: String,
    pub field_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    /// Hidden inputs to add; empty when the form already received them.
    pub hidden_fields: Vec<(&'static str, String)>,
    pub event: EventKind,
}

#[derive(Debug, Default)]
pub struct FormTracker {
    injected: HashSet<String>,
}

impl FormTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self, form_id: &str, field: &FieldInfo) -> EventKind {
        EventKind::FormFieldFocus {
            form_id: form_id.to_string(),
            field_name: field.name.clone(),
            field_type: field.field_type.clone(),
        }
    }

    pub fn blur(&self, form_id: &str, field: &FieldInfo, value: &str) -> Option<EventKind> {
        if value.trim().is_empty() {
            return None;
        }
        Some(EventKind::FormFieldCompleted {
            form_id: form_id.to_string(),
            field_name: field.name.clone(),
            field_type: field.field_type.clone(),
        })
    }

    pub fn submit(&mut self, form: &FormSnapshot, session: &SessionContext) -> FormSubmission {
        let hidden_fields = if self.injected.insert(form.form_id.clone()) {
            session.hidden_fields()
        } else {
            Vec::new()
        };

        let fields = form
            .field_names
            .iter()
            .filter(|name| !SessionContext::is_tracking_field(name))
            .cloned()
            .collect();

        FormSubmission {
            hidden_fields,
            event: EventKind::FormSubmitted {
                form_id: form.form_id.clone(),
                fields,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryStore;
    use crate::session::{ClientEnvironment, PageLoad};
    use reqwest::Url;

    fn session() -> SessionContext {
        let load = PageLoad::new(Url::parse("https://funnel.example/application.html").unwrap());
        SessionContext::establish(&mut MemoryStore::new(), &load, ClientEnvironment::default())
    }

    #[test]
    fn blur_only_reports_filled_fields() {
        let tracker = FormTracker::new();
        let email = FieldInfo::new("email", "email");

        assert!(tracker.blur("lead-form", &email, "   ").is_none());
        assert_eq!(
            tracker.blur("lead-form", &email, "a@b.example"),
            Some(EventKind::FormFieldCompleted {
                form_id: "lead-form".into(),
                field_name: "email".into(),
                field_type: "email".into(),
            })
        );
    }

    #[test]
    fn submit_injects_hidden_fields_once_and_lists_user_fields() {
        let session = session();
        let mut tracker = FormTracker::new();
        let form = FormSnapshot {
            form_id: "lead-form".into(),
            field_names: vec!["name".into(), "email".into(), "session_id".into()],
        };

        let first = tracker.submit(&form, &session);
        assert_eq!(first.hidden_fields.len(), 8);
        assert_eq!(
            first.event,
            EventKind::FormSubmitted {
                form_id: "lead-form".into(),
                fields: vec!["name".into(), "email".into()],
            }
        );

        let second = tracker.submit(&form, &session);
        assert!(second.hidden_fields.is_empty());
    }
}
