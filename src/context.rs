use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    Quiz,
    QuizResult,
    Application,
    Niche,
    #[default]
    Other,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Quiz => "quiz",
            Self::QuizResult => "quiz_result",
            Self::Application => "application",
            Self::Niche => "niche",
            Self::Other => "other",
        }
    }

    fn classify(path: &str, segments: &[&str]) -> Self {
        if segments.is_empty() || path == "/index.html" {
            return Self::Home;
        }
        if segments.iter().any(|s| s.contains("quiz-result")) {
            Self::QuizResult
        } else if segments.iter().any(|s| *s == "quiz-applications" || s.contains("application")) {
            Self::Application
        } else if segments.iter().any(|s| s.contains("quiz")) {
            Self::Quiz
        } else if segments.contains(&"niches") {
            Self::Niche
        } else {
            Self::Other
        }
    }
}

/// Classification of the current page, recomputed for every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub page_type: PageType,
    pub niche: String,
    pub bucket: String,
    pub variant: String,
}

impl PageContext {
    /// Query parameters take precedence; the path is only consulted for
    /// fields the query does not supply.
    pub fn extract<K, V>(path: &str, query: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let param = |name: &str| {
            query
                .iter()
                .find(|(key, value)| key.as_ref() == name && !value.as_ref().is_empty())
                .map(|(_, value)| value.as_ref().to_string())
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let niche = param("niche")
            .or_else(|| segment_after(&segments, "quiz-applications"))
            .or_else(|| segment_after(&segments, "niches"))
            .unwrap_or_default();
        let bucket = param("bucket")
            .or_else(|| prefixed_segment(&segments, "bucket-"))
            .unwrap_or_default();
        let variant = param("variant")
            .or_else(|| prefixed_segment(&segments, "variant-"))
            .unwrap_or_default();

        Self {
            page_type: PageType::classify(path, &segments),
            niche,
            bucket,
            variant,
        }
    }

    pub fn from_url(url: &Url) -> Self {
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        Self::extract(url.path(), query.as_slice())
    }
}

fn strip_html(segment: &str) -> &str {
    segment.strip_suffix(".html").unwrap_or(segment)
}

fn segment_after(segments: &[&str], marker: &str) -> Option<String> {
    segments
        .windows(2)
        .find(|pair| pair[0] == marker)
        .map(|pair| strip_html(pair[1]).to_string())
        .filter(|value| !value.is_empty())
}

fn prefixed_segment(segments: &[&str], prefix: &str) -> Option<String> {
    segments
        .iter()
        .find_map(|segment| strip_html(segment).strip_prefix(prefix))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
