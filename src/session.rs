use crate::attribution::Attribution;
use crate::context::PageContext;
use crate::identity::{keys, Identity, KeyValueStore};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Browser facts stamped onto every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEnvironment {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UserProfile {
    pub fn load(store: &impl KeyValueStore) -> Self {
        Self {
            email: store.get_present(keys::USER_EMAIL),
            name: store.get_present(keys::USER_NAME),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageLoad {
    pub url: Url,
    pub referrer: Option<String>,
}

impl PageLoad {
    pub fn new(url: Url) -> Self {
        Self { url, referrer: None }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }
}

/// Everything a tracking call needs, resolved once per page load.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub identity: Identity,
    pub attribution: Attribution,
    pub profile: UserProfile,
    pub page: PageContext,
    pub page_url: Url,
    pub environment: ClientEnvironment,
}

impl SessionContext {
    pub fn establish(
        store: &mut impl KeyValueStore,
        load: &PageLoad,
        environment: ClientEnvironment,
    ) -> Self {
        let identity = Identity::bootstrap(store);
        let attribution = Attribution::record(store, &load.url, load.referrer.as_deref());

        Self {
            identity,
            attribution,
            profile: UserProfile::load(&*store),
            page: PageContext::from_url(&load.url),
            page_url: load.url.clone(),
            environment,
        }
    }

    /// Remembers who the visitor is for this and later page loads.
    pub fn identify(
        &mut self,
        store: &mut impl KeyValueStore,
        email: Option<&str>,
        name: Option<&str>,
    ) {
        if let Some(email) = email.map(str::trim).filter(|v| !v.is_empty()) {
            store.set(keys::USER_EMAIL, email);
        }
        if let Some(name) = name.map(str::trim).filter(|v| !v.is_empty()) {
            store.set(keys::USER_NAME, name);
        }
        self.profile = UserProfile::load(&*store);
    }

    /// Name/value pairs injected as hidden inputs into submitted forms.
    pub fn hidden_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::SESSION_ID, self.identity.session_id.clone()),
            (keys::USER_ID, self.identity.user_id.clone()),
            (keys::FLOW_HASH, self.identity.flow_hash.clone()),
            (keys::TRAFFIC_SOURCE, self.attribution.traffic_source.clone()),
            (keys::UTM_MEDIUM, self.attribution.utm_medium.clone()),
            (keys::UTM_CAMPAIGN, self.attribution.utm_campaign.clone()),
            (keys::LANDING_PAGE, self.attribution.landing_page.clone()),
            (keys::ENTRY_POINT, self.attribution.entry_point.clone()),
        ]
    }

    pub fn is_tracking_field(name: &str) -> bool {
        [
            keys::SESSION_ID,
            keys::USER_ID,
            keys::FLOW_HASH,
            keys::TRAFFIC_SOURCE,
            keys::UTM_MEDIUM,
            keys::UTM_CAMPAIGN,
            keys::LANDING_PAGE,
            keys::ENTRY_POINT,
        ]
        .contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PageType;
    use crate::identity::MemoryStore;

    fn load(raw: &str) -> PageLoad {
        PageLoad::new(Url::parse(raw).unwrap())
    }

    #[test]
    fn establish_keeps_identity_across_page_loads() {
        let store = MemoryStore::new();
        let first = SessionContext::establish(
            &mut store.clone(),
            &load("https://funnel.example/?utm_source=fb"),
            ClientEnvironment::default(),
        );
        let second = SessionContext::establish(
            &mut store.clone(),
            &load("https://funnel.example/quiz-applications/hvac/index.html"),
            ClientEnvironment::default(),
        );

        assert_eq!(first.identity, second.identity);
        assert_eq!(second.attribution.traffic_source, "fb");
        assert_eq!(second.page.page_type, PageType::Application);
        assert_eq!(second.page.niche, "hvac");
    }

    #[test]
    fn referrer_feeds_first_touch_source() {
        let mut store = MemoryStore::new();
        let page = load("https://funnel.example/").with_referrer("https://l.facebook.com/");
        let session = SessionContext::establish(&mut store, &page, ClientEnvironment::default());
        assert_eq!(session.attribution.traffic_source, "l.facebook.com");
    }

    #[test]
    fn identify_persists_profile() {
        let mut store = MemoryStore::new();
        let page = load("https://funnel.example/");
        let mut session =
            SessionContext::establish(&mut store, &page, ClientEnvironment::default());
        assert_eq!(session.profile, UserProfile::default());

        session.identify(&mut store, Some(" dr.smith@clinic.example "), Some(""));
        assert_eq!(session.profile.email.as_deref(), Some("dr.smith@clinic.example"));
        assert_eq!(session.profile.name, None);

        let page = load("https://funnel.example/a");
        let next = SessionContext::establish(&mut store, &page, ClientEnvironment::default());
        assert_eq!(next.profile.email.as_deref(), Some("dr.smith@clinic.example"));
    }

    #[test]
    fn hidden_fields_are_tracking_fields() {
        let mut store = MemoryStore::new();
        let page = load("https://funnel.example/");
        let session = SessionContext::establish(&mut store, &page, ClientEnvironment::default());
        let fields = session.hidden_fields();
        assert_eq!(fields.len(), 8);
        assert!(fields.iter().all(|(name, _)| SessionContext::is_tracking_field(name)));
        assert!(!SessionContext::is_tracking_field("email"));
    }
}
