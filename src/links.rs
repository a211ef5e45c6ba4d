use crate::identity::keys;
use crate::session::SessionContext;
use reqwest::Url;
use std::time::Duration;

/// How long after the page view anchors are rewritten.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Query parameter whose presence marks an already decorated link.
pub const CONTINUITY_MARKER: &str = keys::FLOW_HASH;

/// Carries identity and attribution to the next same-origin page.
///
/// Returns the rewritten href, or `None` when the link is left untouched
/// (other origin, non-http scheme, in-page fragment, or already marked).
pub fn decorate_href(href: &str, page_url: &Url, session: &SessionContext) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut target = page_url.join(href).ok()?;
    if !matches!(target.scheme(), "http" | "https") || target.origin() != page_url.origin() {
        return None;
    }
    if target.query_pairs().any(|(key, _)| key == CONTINUITY_MARKER) {
        return None;
    }

    let identity = &session.identity;
    let attribution = &session.attribution;
    let params = [
        (keys::FLOW_HASH, identity.flow_hash.as_str()),
        (keys::SESSION_ID, identity.session_id.as_str()),
        (keys::USER_ID, identity.user_id.as_str()),
        (keys::TRAFFIC_SOURCE, attribution.traffic_source.as_str()),
        (keys::UTM_MEDIUM, attribution.utm_medium.as_str()),
        (keys::UTM_CAMPAIGN, attribution.utm_campaign.as_str()),
        ("niche", session.page.niche.as_str()),
    ];

    {
        let mut query = target.query_pairs_mut();
        for (name, value) in params.iter().filter(|(_, value)| !value.is_empty()) {
            query.append_pair(name, value);
        }
    }
    Some(target.to_string())
}
