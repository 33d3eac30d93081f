//! Page configuration, resolved once at startup.
//!
//! Sources, highest precedence first: `<meta name="portfolio:*">` tags in the page, data attributes
//! on the elements they configure, the query string, then build-time environment defaults.

use web_sys::Document;

use crate::dom::meta_content;
use crate::typing::TypingTiming;

pub const DEFAULT_THEME_KEY: &str = "portfolio-theme";
pub const DEFAULT_MESSAGES_KEY: &str = "portfolio-messages";
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.2;
pub const DEFAULT_PHRASES: [&str; 3] = [
    "Aspiring Data Engineer",
    "AI & Automation Enthusiast",
    "Building with Data & Code",
];

const BUILD_RELAY_ENDPOINT: Option<&str> = option_env!("PORTFOLIO_RELAY_ENDPOINT");
const BUILD_STORE_URL: Option<&str> = option_env!("PORTFOLIO_STORE_URL");
const BUILD_STORE_KEY: Option<&str> = option_env!("PORTFOLIO_STORE_KEY");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitBackend {
    /// Generic form relay accepting `{name, email, message}`.
    Relay { endpoint: String },
    /// Project data-store REST table accepting the full payload with key headers.
    DataStore { url: String, key: String },
    /// No remote configured; messages are kept in browser storage.
    Local,
}

impl SubmitBackend {
    /// A complete data-store pair wins over a relay endpoint; blank values count as absent.
    pub fn resolve(
        relay_endpoint: Option<String>,
        store_url: Option<String>,
        store_key: Option<String>,
    ) -> Self {
        match (non_blank(store_url), non_blank(store_key)) {
            (Some(url), Some(key)) => Self::DataStore { url, key },
            _ => match non_blank(relay_endpoint) {
                Some(endpoint) => Self::Relay { endpoint },
                None => Self::Local,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Relay { .. } => "relay",
            Self::DataStore { .. } => "data_store",
            Self::Local => "local",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub theme_key: String,
    pub messages_key: String,
    pub backend: SubmitBackend,
    pub phrases: Vec<String>,
    pub typing: TypingTiming,
    pub reveal_threshold: f64,
    pub background: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_key: DEFAULT_THEME_KEY.to_string(),
            messages_key: DEFAULT_MESSAGES_KEY.to_string(),
            backend: SubmitBackend::resolve(
                BUILD_RELAY_ENDPOINT.map(str::to_string),
                BUILD_STORE_URL.map(str::to_string),
                BUILD_STORE_KEY.map(str::to_string),
            ),
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            typing: TypingTiming::default(),
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            background: true,
        }
    }
}

impl Config {
    pub fn from_document(document: &Document, search: &str) -> Self {
        let mut config = Self::default();

        if let Some(key) = non_blank(meta_content(document, "portfolio:theme-key")) {
            config.theme_key = key;
        }
        if let Some(key) = non_blank(meta_content(document, "portfolio:messages-key")) {
            config.messages_key = key;
        }

        config.backend = SubmitBackend::resolve(
            page_or_build(
                meta_content(document, "portfolio:relay-endpoint"),
                BUILD_RELAY_ENDPOINT,
            ),
            page_or_build(meta_content(document, "portfolio:store-url"), BUILD_STORE_URL),
            page_or_build(meta_content(document, "portfolio:store-key"), BUILD_STORE_KEY),
        );

        let phrases = document
            .query_selector(".typing")
            .ok()
            .flatten()
            .and_then(|el| el.get_attribute("data-phrases"))
            .map(|raw| parse_phrases(&raw))
            .unwrap_or_default();
        if !phrases.is_empty() {
            config.phrases = phrases;
        }

        if let Some(threshold) = meta_content(document, "portfolio:reveal-threshold")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite())
        {
            config.reveal_threshold = threshold.clamp(0.0, 1.0);
        }

        config.background = background_enabled(
            search,
            meta_content(document, "portfolio:background").as_deref(),
        );

        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A blank page value falls through to the build-time one.
fn page_or_build(page: Option<String>, build: Option<&str>) -> Option<String> {
    non_blank(page).or_else(|| non_blank(build.map(str::to_string)))
}

/// `|`-separated phrase list; empty segments are dropped.
pub fn parse_phrases(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn query_param<'a>(search: &'a str, name: &str) -> Option<&'a str> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn background_enabled(search: &str, meta: Option<&str>) -> bool {
    if query_param(search, "nobg") == Some("1") {
        return false;
    }
    !matches!(
        meta.map(|m| m.trim().to_ascii_lowercase()).as_deref(),
        Some("off" | "false" | "0")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_store_pair_beats_relay() {
        let backend = SubmitBackend::resolve(
            Some("https://relay.example/f/abc".to_string()),
            Some("https://project.example/rest/v1/messages".to_string()),
            Some("anon-key".to_string()),
        );
        assert_eq!(
            backend,
            SubmitBackend::DataStore {
                url: "https://project.example/rest/v1/messages".to_string(),
                key: "anon-key".to_string(),
            }
        );
    }

    #[test]
    fn incomplete_data_store_falls_back_to_relay() {
        let backend = SubmitBackend::resolve(
            Some("https://relay.example/f/abc".to_string()),
            Some("https://project.example/rest/v1/messages".to_string()),
            Some("   ".to_string()),
        );
        assert_eq!(backend.name(), "relay");
    }

    #[test]
    fn nothing_configured_is_local() {
        assert_eq!(
            SubmitBackend::resolve(Some(String::new()), None, None),
            SubmitBackend::Local
        );
    }

    #[test]
    fn blank_meta_keeps_build_endpoint() {
        let backend = SubmitBackend::resolve(
            page_or_build(Some("  ".to_string()), Some("https://relay.example/f/abc")),
            page_or_build(Some(String::new()), None),
            page_or_build(None, None),
        );
        assert_eq!(
            backend,
            SubmitBackend::Relay {
                endpoint: "https://relay.example/f/abc".to_string(),
            }
        );
    }

    #[test]
    fn page_value_beats_build_value() {
        assert_eq!(
            page_or_build(Some("https://page.example".to_string()), Some("https://build.example")),
            Some("https://page.example".to_string())
        );
        assert_eq!(page_or_build(None, Some("   ")), None);
    }

    #[test]
    fn phrases_drop_empty_segments() {
        assert_eq!(
            parse_phrases(" Rustacean | | Data Engineer|"),
            vec!["Rustacean".to_string(), "Data Engineer".to_string()]
        );
        assert!(parse_phrases("||").is_empty());
    }

    #[test]
    fn background_flags() {
        assert!(background_enabled("", None));
        assert!(background_enabled("?lang=en&nobg=0", None));
        assert!(!background_enabled("?lang=en&nobg=1", None));
        assert!(!background_enabled("", Some("Off")));
        assert!(background_enabled("?nobg", Some("on")));
    }

    #[test]
    fn default_config_keys() {
        let config = Config::default();
        assert_eq!(config.theme_key, "portfolio-theme");
        assert_eq!(config.messages_key, "portfolio-messages");
        assert_eq!(config.phrases.len(), 3);
        assert_eq!(config.reveal_threshold, 0.2);
    }
}
