//! Sharing the invitation link.
//!
//! Strategies are tried in a fixed order and the first one that reports
//! itself available runs: the native share command, then the Kakao sharer,
//! then a plain clipboard copy of the link.

pub mod clipboard;

use serde::Serialize;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::launcher::{LaunchError, UrlLauncher};
use crate::maps::encode_component;
use clipboard::{Clipboard, ClipboardError};

/// What gets shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Handed to a share sheet or messenger
    Shared(&'static str),
    /// The link was copied instead
    CopiedToClipboard,
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error("share command failed: {0}")]
    Command(String),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("failed to build share template: {0}")]
    Template(#[from] serde_json::Error),
}

pub trait ShareStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capability check, evaluated on every share request
    fn is_available(&self) -> bool;

    fn attempt_share(&self, payload: &SharePayload) -> Result<ShareOutcome, ShareError>;
}

/// Platform share sheet reached through a configured helper command, invoked
/// as `<command> <args..> <title> <url> <description>`.
pub struct NativeShare {
    command: Option<Vec<String>>,
}

impl NativeShare {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
        }
    }
}

impl ShareStrategy for NativeShare {
    fn name(&self) -> &'static str {
        "share sheet"
    }

    fn is_available(&self) -> bool {
        self.command.is_some()
    }

    fn attempt_share(&self, payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
        let Some((program, args)) = self.command.as_deref().and_then(|c| c.split_first()) else {
            return Err(ShareError::Unavailable(self.name()));
        };

        let status = Command::new(program)
            .args(args)
            .arg(&payload.title)
            .arg(&payload.url)
            .arg(&payload.description)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ShareError::Command(format!("{}: {}", program, e)))?;

        if status.success() {
            Ok(ShareOutcome::Shared(self.name()))
        } else {
            Err(ShareError::Command(format!("{} exited with {}", program, status)))
        }
    }
}

#[derive(Debug, Serialize)]
struct FeedLink<'a> {
    #[serde(rename = "mobileWebUrl")]
    mobile_web_url: &'a str,
    #[serde(rename = "webUrl")]
    web_url: &'a str,
}

#[derive(Debug, Serialize)]
struct FeedContent<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(rename = "imageUrl")]
    image_url: &'a str,
    link: FeedLink<'a>,
}

#[derive(Debug, Serialize)]
struct FeedButton<'a> {
    title: &'a str,
    link: FeedLink<'a>,
}

#[derive(Debug, Serialize)]
struct FeedTemplate<'a> {
    #[serde(rename = "objectType")]
    object_type: &'a str,
    content: FeedContent<'a>,
    buttons: Vec<FeedButton<'a>>,
}

/// Kakao feed template with "view on mobile" and "view on web" buttons.
pub fn kakao_feed_template(payload: &SharePayload) -> Result<String, serde_json::Error> {
    let link = || FeedLink {
        mobile_web_url: &payload.url,
        web_url: &payload.url,
    };
    let template = FeedTemplate {
        object_type: "feed",
        content: FeedContent {
            title: &payload.title,
            description: &payload.description,
            image_url: &payload.image_url,
            link: link(),
        },
        buttons: vec![
            FeedButton {
                title: "모바일에서 보기",
                link: link(),
            },
            FeedButton {
                title: "웹에서 보기",
                link: link(),
            },
        ],
    };
    serde_json::to_string(&template)
}

/// Kakao messenger share, available once an app key is configured.
pub struct KakaoShare {
    app_key: Option<String>,
    launcher: Arc<dyn UrlLauncher>,
}

impl KakaoShare {
    pub fn new(app_key: Option<String>, launcher: Arc<dyn UrlLauncher>) -> Self {
        Self {
            app_key: app_key.filter(|k| !k.trim().is_empty()),
            launcher,
        }
    }

    pub fn sharer_url(app_key: &str, template_json: &str) -> String {
        format!(
            "https://sharer.kakao.com/talk/friends/picker/link?app_key={}&validation_action=default&validation_params={}",
            encode_component(app_key),
            encode_component(template_json)
        )
    }
}

impl ShareStrategy for KakaoShare {
    fn name(&self) -> &'static str {
        "Kakao"
    }

    fn is_available(&self) -> bool {
        self.app_key.is_some()
    }

    fn attempt_share(&self, payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
        let app_key = self
            .app_key
            .as_deref()
            .ok_or(ShareError::Unavailable(self.name()))?;
        let template = kakao_feed_template(payload)?;
        self.launcher
            .launch(&Self::sharer_url(app_key, &template), Duration::from_millis(1000))?;
        Ok(ShareOutcome::Shared(self.name()))
    }
}

/// Last resort: put the link on the clipboard.
pub struct ClipboardShare {
    clipboard: Clipboard,
}

impl ClipboardShare {
    pub fn new(clipboard: Clipboard) -> Self {
        Self { clipboard }
    }
}

impl ShareStrategy for ClipboardShare {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn attempt_share(&self, payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
        self.clipboard.copy(&payload.url)?;
        Ok(ShareOutcome::CopiedToClipboard)
    }
}

/// Ordered share strategies. The last one is the fallback used when the
/// selected strategy fails.
pub struct ShareChain {
    strategies: Vec<Box<dyn ShareStrategy>>,
}

impl ShareChain {
    pub fn new(strategies: Vec<Box<dyn ShareStrategy>>) -> Self {
        Self { strategies }
    }

    /// Native share sheet, then Kakao, then clipboard.
    pub fn standard(
        share_command: Option<Vec<String>>,
        kakao_app_key: Option<String>,
        launcher: Arc<dyn UrlLauncher>,
        clipboard: Clipboard,
    ) -> Self {
        Self::new(vec![
            Box::new(NativeShare::new(share_command)),
            Box::new(KakaoShare::new(kakao_app_key, launcher)),
            Box::new(ClipboardShare::new(clipboard)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
        let Some((index, strategy)) = self
            .strategies
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_available())
        else {
            return Err(ShareError::Unavailable("sharing"));
        };

        match strategy.attempt_share(payload) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!("Sharing via {} failed: {}", strategy.name(), e);
                match self.strategies.last() {
                    Some(fallback) if index + 1 < self.strategies.len() => fallback.attempt_share(payload),
                    _ => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStrategy {
        name: &'static str,
        available: bool,
        fails: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeStrategy {
        fn boxed(name: &'static str, available: bool, fails: bool) -> (Box<dyn ShareStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Self {
                name,
                available,
                fails,
                calls: calls.clone(),
            };
            (Box::new(strategy), calls)
        }
    }

    impl ShareStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn attempt_share(&self, _payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(ShareError::Command("boom".to_string()))
            } else if self.name == "clipboard" {
                Ok(ShareOutcome::CopiedToClipboard)
            } else {
                Ok(ShareOutcome::Shared(self.name))
            }
        }
    }

    fn payload() -> SharePayload {
        SharePayload {
            url: "https://example.com/invite".to_string(),
            title: "승환♥경희의 결혼식에 초대합니다".to_string(),
            description: "승환♥경희의 결혼식에 초대합니다".to_string(),
            image_url: "https://example.com/invite/images/og-image.jpg".to_string(),
        }
    }

    #[test]
    fn test_first_available_strategy_runs_alone() {
        let (native, native_calls) = FakeStrategy::boxed("native", false, false);
        let (kakao, kakao_calls) = FakeStrategy::boxed("kakao", true, false);
        let (clip, clip_calls) = FakeStrategy::boxed("clipboard", true, false);
        let chain = ShareChain::new(vec![native, kakao, clip]);

        assert_eq!(chain.share(&payload()).unwrap(), ShareOutcome::Shared("kakao"));
        assert_eq!(native_calls.load(Ordering::SeqCst), 0);
        assert_eq!(kakao_calls.load(Ordering::SeqCst), 1);
        assert_eq!(clip_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_native_preferred_over_kakao() {
        let (native, _) = FakeStrategy::boxed("native", true, false);
        let (kakao, kakao_calls) = FakeStrategy::boxed("kakao", true, false);
        let (clip, _) = FakeStrategy::boxed("clipboard", true, false);
        let chain = ShareChain::new(vec![native, kakao, clip]);

        assert_eq!(chain.share(&payload()).unwrap(), ShareOutcome::Shared("native"));
        assert_eq!(kakao_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_falls_back_to_clipboard() {
        let (native, _) = FakeStrategy::boxed("native", true, true);
        let (kakao, kakao_calls) = FakeStrategy::boxed("kakao", true, false);
        let (clip, clip_calls) = FakeStrategy::boxed("clipboard", true, false);
        let chain = ShareChain::new(vec![native, kakao, clip]);

        assert_eq!(chain.share(&payload()).unwrap(), ShareOutcome::CopiedToClipboard);
        assert_eq!(kakao_calls.load(Ordering::SeqCst), 0);
        assert_eq!(clip_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_only_clipboard_available() {
        let (native, _) = FakeStrategy::boxed("native", false, false);
        let (kakao, _) = FakeStrategy::boxed("kakao", false, false);
        let (clip, clip_calls) = FakeStrategy::boxed("clipboard", true, false);
        let chain = ShareChain::new(vec![native, kakao, clip]);

        assert_eq!(chain.share(&payload()).unwrap(), ShareOutcome::CopiedToClipboard);
        assert_eq!(clip_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_standard_chain_order_and_availability() {
        let launcher: Arc<dyn UrlLauncher> = Arc::new(crate::launcher::SystemLauncher::default());
        let chain = ShareChain::standard(None, Some("  ".to_string()), launcher.clone(), Clipboard::default());
        assert_eq!(chain.strategy_names(), vec!["share sheet", "Kakao", "clipboard"]);

        assert!(!NativeShare::new(Some(vec![])).is_available());
        assert!(!KakaoShare::new(Some(String::new()), launcher.clone()).is_available());
        assert!(KakaoShare::new(Some("abc".to_string()), launcher).is_available());
    }

    #[test]
    fn test_kakao_feed_template() {
        let json = kakao_feed_template(&payload()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["objectType"], "feed");
        assert_eq!(value["content"]["imageUrl"], "https://example.com/invite/images/og-image.jpg");
        assert_eq!(value["content"]["link"]["webUrl"], "https://example.com/invite");
        assert_eq!(value["buttons"].as_array().unwrap().len(), 2);
        assert_eq!(value["buttons"][1]["title"], "웹에서 보기");

        let url = KakaoShare::sharer_url("key", &json);
        assert!(url.starts_with("https://sharer.kakao.com/talk/friends/picker/link?app_key=key&"));
        assert!(!url.contains('{'));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_share_command() {
        let ok = NativeShare::new(Some(vec!["true".to_string()]));
        assert_eq!(ok.attempt_share(&payload()).unwrap(), ShareOutcome::Shared("share sheet"));

        // Title, URL and description arrive as positional arguments
        let script = r#"[ "$#" -eq 3 ] && [ "$2" = "https://example.com/invite" ] && [ "$3" = "$1" ]"#;
        let checked = NativeShare::new(Some(vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "share".to_string(),
        ]));
        assert!(checked.attempt_share(&payload()).is_ok());

        let failing = NativeShare::new(Some(vec!["false".to_string()]));
        assert!(matches!(failing.attempt_share(&payload()), Err(ShareError::Command(_))));
    }
}
