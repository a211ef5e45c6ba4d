use crate::identity::{keys, KeyValueStore};
use reqwest::Url;
use serde::{Deserialize, Serialize};

pub const ENTRY_POINT_LANDING: &str = "landing_page";
pub const DIRECT_SOURCE: &str = "direct";

/// First-touch attribution, frozen on the first page view of a browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub traffic_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub landing_page: String,
    pub entry_point: String,
}

impl Attribution {
    /// Persists attribution for one page load and returns the stored snapshot.
    ///
    /// A value present in the URL always replaces the stored one. Otherwise
    /// the stored value is kept, and only an empty store gets a fallback.
    pub fn record(store: &mut impl KeyValueStore, page_url: &Url, referrer: Option<&str>) -> Self {
        let source =
            query_value(page_url, "utm_source").or_else(|| query_value(page_url, "source"));
        let fallback_source = referrer_source(page_url, referrer);

        write_field(store, keys::TRAFFIC_SOURCE, source, Some(fallback_source));
        write_field(store, keys::UTM_MEDIUM, query_value(page_url, "utm_medium"), None);
        write_field(store, keys::UTM_CAMPAIGN, query_value(page_url, "utm_campaign"), None);

        if store.get_present(keys::LANDING_PAGE).is_none() {
            store.set(keys::LANDING_PAGE, page_url.as_str());
        }
        if store.get_present(keys::ENTRY_POINT).is_none() {
            store.set(keys::ENTRY_POINT, ENTRY_POINT_LANDING);
        }

        Self::load(&*store)
    }

    pub fn load(store: &impl KeyValueStore) -> Self {
        let read = |key: &str| store.get(key).unwrap_or_default();
        Self {
            traffic_source: read(keys::TRAFFIC_SOURCE),
            utm_medium: read(keys::UTM_MEDIUM),
            utm_campaign: read(keys::UTM_CAMPAIGN),
            landing_page: read(keys::LANDING_PAGE),
            entry_point: read(keys::ENTRY_POINT),
        }
    }
}

fn write_field(
    store: &mut impl KeyValueStore,
    key: &str,
    from_url: Option<String>,
    fallback: Option<String>,
) {
    if let Some(value) = from_url {
        store.set(key, &value);
    } else if store.get_present(key).is_none() {
        if let Some(value) = fallback {
            store.set(key, &value);
        }
    }
}

pub(crate) fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// External referrer host, or `direct` when there is none.
fn referrer_source(page_url: &Url, referrer: Option<&str>) -> String {
    referrer
        .and_then(|raw| Url::parse(raw).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| Some(host.as_str()) != page_url.host_str())
        .unwrap_or_else(|| DIRECT_SOURCE.to_string())
}
