use crate::events::EventKind;
use std::collections::BTreeMap;

pub const TRACK_ATTRIBUTE: &str = "data-track";

/// What a click handler can see of one element.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: String,
    pub classes: Vec<String>,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    fn is_button_like(&self) -> bool {
        match self.tag.as_str() {
            "button" => true,
            "input" => self
                .attributes
                .get("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("submit")),
            "a" => self.classes.iter().any(|c| c == "btn"),
            _ => false,
        }
    }

    fn selector(&self) -> String {
        let mut out = self.tag.clone();
        if !self.id.is_empty() {
            out.push('#');
            out.push_str(&self.id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

/// `chain` runs from the clicked element up to the root.
pub fn classify(chain: &[Element]) -> Vec<EventKind> {
    let Some(target) = chain.first() else {
        return Vec::new();
    };
    let mut events = Vec::new();

    if target.is_button_like() {
        events.push(EventKind::ButtonClick {
            text: target.text.trim().to_string(),
            element_id: target.id.clone(),
            classes: target.classes.clone(),
            dom_path: dom_path(chain),
        });
    }

    if let Some((element, tracking_id)) = chain
        .iter()
        .find_map(|el| el.attributes.get(TRACK_ATTRIBUTE).map(|id| (el, id)))
    {
        events.push(EventKind::TrackedElementClick {
            tracking_id: tracking_id.clone(),
            tag: element.tag.clone(),
            text: element.text.trim().to_string(),
        });
    }

    events
}

/// Root-first selector path, e.g. `body > section#hero > button.cta`.
pub fn dom_path(chain: &[Element]) -> String {
    chain
        .iter()
        .rev()
        .map(Element::selector)
        .collect::<Vec<_>>()
        .join(" > ")
}
