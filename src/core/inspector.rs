//! Security signals for a single page: HTTPS, mixed content, insecure
//! forms, tracking scripts and an external threat-list lookup.

use crate::core::relay::RelayChannel;
use crate::domain::model::{Payload, RelayRequest};
use crate::domain::ports::ThreatLookup;
use crate::utils::error::{Result, ViewerError};
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

pub const DEFAULT_TRACKER_PATTERNS: &[&str] = &["google-analytics", "facebook.com/tr"];

/// Counts computed from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSignals {
    pub https: bool,
    pub mixed_content: usize,
    pub insecure_forms: usize,
    pub tracking_scripts: usize,
}

impl PageSignals {
    pub fn has_mixed_content(&self) -> bool {
        self.mixed_content > 0
    }

    pub fn has_insecure_form(&self) -> bool {
        self.insecure_forms > 0
    }

    pub fn has_tracking_scripts(&self) -> bool {
        self.tracking_scripts > 0
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Secure,
    Tracking,
    Warning,
    Alert,
    Insecure,
    Danger,
}

impl StatusLevel {
    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Secure => "#28a745",
            StatusLevel::Tracking => "#ff6600",
            StatusLevel::Warning => "#ff9900",
            StatusLevel::Alert => "#ff3300",
            StatusLevel::Insecure => "#dc3545",
            StatusLevel::Danger => "#ff0000",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityStatus {
    pub messages: Vec<String>,
    pub level: StatusLevel,
}

impl SecurityStatus {
    /// Appends one line per present signal in a fixed order. The level is
    /// the most severe one seen, not the last one applied.
    pub fn evaluate(signals: &PageSignals, flagged: bool) -> Self {
        let mut status = if signals.https {
            Self {
                messages: vec!["This page is secure (HTTPS).".to_string()],
                level: StatusLevel::Secure,
            }
        } else {
            Self {
                messages: vec!["This page is not secure (HTTP).".to_string()],
                level: StatusLevel::Insecure,
            }
        };

        if signals.has_mixed_content() {
            status.push("This page has mixed content!", StatusLevel::Warning);
        }
        if signals.has_insecure_form() {
            status.push("Warning: Insecure login form detected!", StatusLevel::Alert);
        }
        if flagged {
            status.push("Warning: This page is flagged as unsafe!", StatusLevel::Danger);
        }
        if signals.has_tracking_scripts() {
            status.push("This page contains tracking scripts!", StatusLevel::Tracking);
        }

        status
    }

    fn push(&mut self, message: &str, level: StatusLevel) {
        self.messages.push(message.to_string());
        self.level = self.level.max(level);
    }

    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub url: String,
    pub signals: PageSignals,
    pub flagged: bool,
    pub status: SecurityStatus,
}

/// Inspection selectors, parsed once and reused for every page.
#[derive(Debug)]
pub struct PageInspector {
    mixed_content: Selector,
    forms: Selector,
    scripts: Selector,
    tracker_patterns: Vec<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ViewerError::parse(format!("invalid selector {}: {:?}", css, e)))
}

impl PageInspector {
    pub fn new(tracker_patterns: Vec<String>) -> Result<Self> {
        Ok(Self {
            mixed_content: selector("img[src^='http:'], script[src^='http:'], link[href^='http:']")?,
            forms: selector("form")?,
            scripts: selector("script[src]")?,
            tracker_patterns,
        })
    }

    pub fn with_default_trackers() -> Result<Self> {
        Self::new(DEFAULT_TRACKER_PATTERNS.iter().map(|p| p.to_string()).collect())
    }

    pub fn inspect(&self, page_url: &Url, html: &str) -> PageSignals {
        let document = Html::parse_document(html);
        let https = page_url.scheme() == "https";

        let mixed_content = if https {
            document.select(&self.mixed_content).count()
        } else {
            0
        };

        // A form without an action submits to the page itself.
        let insecure_forms = document
            .select(&self.forms)
            .filter(|form| {
                let target = match form.value().attr("action").map(str::trim) {
                    Some(action) if !action.is_empty() => page_url.join(action).ok(),
                    _ => Some(page_url.clone()),
                };
                target.map(|t| t.scheme() != "https").unwrap_or(false)
            })
            .count();

        let tracking_scripts = document
            .select(&self.scripts)
            .filter(|script| {
                script
                    .value()
                    .attr("src")
                    .map(|src| self.tracker_patterns.iter().any(|p| src.contains(p.as_str())))
                    .unwrap_or(false)
            })
            .count();

        PageSignals {
            https,
            mixed_content,
            insecure_forms,
            tracking_scripts,
        }
    }

    /// Fetches the page through the relay, inspects it and consults the
    /// threat list. A failed lookup counts as not flagged.
    pub async fn inspect_url(
        &self,
        relay: &RelayChannel,
        threats: Option<&dyn ThreatLookup>,
        url: &str,
    ) -> Result<InspectionReport> {
        let page_url = Url::parse(url).map_err(|e| ViewerError::ValidationError {
            message: format!("Invalid page URL '{}': {}", url, e),
        })?;

        let html = match relay.fetch(RelayRequest::fetch(page_url.as_str())).await? {
            Payload::Text(html) => html,
            Payload::Json(_) => {
                tracing::debug!("{} returned JSON, nothing to inspect", url);
                String::new()
            }
        };
        let signals = self.inspect(&page_url, &html);

        let flagged = match threats {
            Some(lookup) => match lookup.is_flagged(page_url.as_str()).await {
                Ok(flagged) => flagged,
                Err(e) => {
                    tracing::warn!("Threat lookup failed, treating as clean: {}", e);
                    false
                }
            },
            None => false,
        };

        let status = SecurityStatus::evaluate(&signals, flagged);
        Ok(InspectionReport {
            url: page_url.to_string(),
            signals,
            flagged,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspector() -> PageInspector {
        PageInspector::with_default_trackers().unwrap()
    }

    fn https_page() -> Url {
        Url::parse("https://shop.example.com/login").unwrap()
    }

    #[test]
    fn test_http_form_action_is_insecure() {
        let html = r#"<html><body><form action="http://shop.example.com/submit"></form></body></html>"#;
        let signals = inspector().inspect(&https_page(), html);
        assert!(signals.has_insecure_form());
    }

    #[test]
    fn test_https_form_action_is_secure() {
        let html = r#"<html><body><form action="https://shop.example.com/submit"></form></body></html>"#;
        let signals = inspector().inspect(&https_page(), html);
        assert!(!signals.has_insecure_form());
    }

    #[test]
    fn test_relative_and_missing_actions_follow_page_scheme() {
        let html = r#"<form action="/submit"></form><form></form>"#;
        assert_eq!(inspector().inspect(&https_page(), html).insecure_forms, 0);

        let http_page = Url::parse("http://shop.example.com/login").unwrap();
        assert_eq!(inspector().inspect(&http_page, html).insecure_forms, 2);
    }

    #[test]
    fn test_mixed_content_only_counts_on_https() {
        let html = r#"
            <img src="http://cdn.example.com/a.png">
            <script src="http://cdn.example.com/a.js"></script>
            <link rel="stylesheet" href="http://cdn.example.com/a.css">
            <img src="https://cdn.example.com/b.png">
        "#;
        assert_eq!(inspector().inspect(&https_page(), html).mixed_content, 3);

        let http_page = Url::parse("http://shop.example.com/").unwrap();
        assert_eq!(inspector().inspect(&http_page, html).mixed_content, 0);
    }

    #[test]
    fn test_tracking_scripts_detected() {
        let html = r#"
            <script src="https://www.google-analytics.com/analytics.js"></script>
            <script src="https://www.facebook.com/tr?id=1"></script>
            <script src="https://cdn.example.com/app.js"></script>
            <script>var inline = 1;</script>
        "#;
        assert_eq!(inspector().inspect(&https_page(), html).tracking_scripts, 2);
    }

    #[test]
    fn test_status_accumulates_and_keeps_worst_level() {
        let signals = PageSignals {
            https: true,
            mixed_content: 1,
            insecure_forms: 1,
            tracking_scripts: 1,
        };

        let status = SecurityStatus::evaluate(&signals, true);
        assert_eq!(
            status.messages,
            vec![
                "This page is secure (HTTPS).",
                "This page has mixed content!",
                "Warning: Insecure login form detected!",
                "Warning: This page is flagged as unsafe!",
                "This page contains tracking scripts!",
            ]
        );
        assert_eq!(status.level, StatusLevel::Danger);
    }

    #[test]
    fn test_clean_https_page_is_secure() {
        let status = SecurityStatus::evaluate(
            &PageSignals {
                https: true,
                ..PageSignals::default()
            },
            false,
        );
        assert_eq!(status.level, StatusLevel::Secure);
        assert_eq!(status.message(), "This page is secure (HTTPS).");
        assert_eq!(status.level.color(), "#28a745");
    }
}
