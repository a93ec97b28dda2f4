//! Map application deep links with a timed fallback to the web map.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::time::Duration;

use crate::launcher::{LaunchOutcome, UrlLauncher};

/// How long an app link gets to take over before the web map is opened.
pub const DEFAULT_FALLBACK_AFTER: Duration = Duration::from_millis(1000);

/// Unreserved characters stay as-is, matching `encodeURIComponent`.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapProvider {
    Kakao,
    Naver,
    TMap,
}

impl MapProvider {
    pub const ALL: [MapProvider; 3] = [MapProvider::Kakao, MapProvider::Naver, MapProvider::TMap];

    pub fn label(&self) -> &'static str {
        match self {
            MapProvider::Kakao => "카카오맵",
            MapProvider::Naver => "네이버지도",
            MapProvider::TMap => "티맵",
        }
    }

    /// Link handled by the provider's installed app
    pub fn app_link(&self, place: &str, app_name: &str) -> String {
        let q = encode_component(place);
        match self {
            MapProvider::Kakao => format!("kakaomap://search?q={}", q),
            MapProvider::Naver => format!(
                "nmap://search?query={}&appname={}",
                q,
                encode_component(app_name)
            ),
            MapProvider::TMap => format!("tmap://search?name={}", q),
        }
    }

    /// Browser fallback. TMap has no web search, so it falls back to Google Maps.
    pub fn web_link(&self, place: &str) -> String {
        let q = encode_component(place);
        match self {
            MapProvider::Kakao => format!("https://map.kakao.com/link/search/{}", q),
            MapProvider::Naver => format!("https://map.naver.com/v5/search/{}", q),
            MapProvider::TMap => format!("https://www.google.com/maps/search/?api=1&query={}", q),
        }
    }
}

/// Which link ended up handling the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOpened {
    App(String),
    Web(String),
}

/// Try the provider app first; open the web map if the app link did not
/// take over within `fallback_after`.
pub fn open_in_map(
    provider: MapProvider,
    place: &str,
    app_name: &str,
    launcher: &dyn UrlLauncher,
    fallback_after: Duration,
) -> anyhow::Result<MapOpened> {
    let app_link = provider.app_link(place, app_name);
    match launcher.launch(&app_link, fallback_after) {
        Ok(LaunchOutcome::Opened) | Ok(LaunchOutcome::Pending) => {
            tracing::info!(provider = provider.label(), "Opened map app");
            Ok(MapOpened::App(app_link))
        }
        Err(e) => {
            tracing::info!(provider = provider.label(), "Map app unavailable ({}), using web map", e);
            let web_link = provider.web_link(place);
            launcher.launch(&web_link, fallback_after)?;
            Ok(MapOpened::Web(web_link))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::LaunchError;
    use std::sync::Mutex;

    struct FakeLauncher {
        fail_schemes: Vec<&'static str>,
        launched: Mutex<Vec<String>>,
    }

    impl FakeLauncher {
        fn new(fail_schemes: Vec<&'static str>) -> Self {
            Self {
                fail_schemes,
                launched: Mutex::new(Vec::new()),
            }
        }
    }

    impl UrlLauncher for FakeLauncher {
        fn launch(&self, target: &str, _wait: Duration) -> Result<LaunchOutcome, LaunchError> {
            self.launched.lock().unwrap().push(target.to_string());
            if self.fail_schemes.iter().any(|s| target.starts_with(s)) {
                Err(LaunchError::Exit {
                    program: "fake".to_string(),
                    status: "exit status: 4".to_string(),
                })
            } else {
                Ok(LaunchOutcome::Opened)
            }
        }
    }

    #[test]
    fn test_encode_component_matches_browser() {
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_component("천안"), "%EC%B2%9C%EC%95%88");
        assert_eq!(encode_component("com.wedding.invitation"), "com.wedding.invitation");
    }

    #[test]
    fn test_links() {
        let place = "천안 비렌티웨딩홀";
        let q = encode_component(place);
        assert_eq!(
            MapProvider::Kakao.app_link(place, "x"),
            format!("kakaomap://search?q={}", q)
        );
        assert_eq!(
            MapProvider::Naver.app_link(place, "com.wedding.invitation"),
            format!("nmap://search?query={}&appname=com.wedding.invitation", q)
        );
        assert_eq!(MapProvider::TMap.app_link(place, "x"), format!("tmap://search?name={}", q));
        assert_eq!(
            MapProvider::Naver.web_link(place),
            format!("https://map.naver.com/v5/search/{}", q)
        );
        assert!(MapProvider::TMap.web_link(place).starts_with("https://www.google.com/maps/search/?api=1&query="));
    }

    #[test]
    fn test_app_link_success_skips_web() {
        let launcher = FakeLauncher::new(vec![]);
        let opened = open_in_map(MapProvider::Kakao, "venue", "app", &launcher, DEFAULT_FALLBACK_AFTER).unwrap();
        assert_eq!(opened, MapOpened::App("kakaomap://search?q=venue".to_string()));
        assert_eq!(launcher.launched.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_app_link_falls_back_to_web() {
        let launcher = FakeLauncher::new(vec!["tmap://"]);
        let opened = open_in_map(MapProvider::TMap, "venue", "app", &launcher, DEFAULT_FALLBACK_AFTER).unwrap();
        assert_eq!(
            opened,
            MapOpened::Web("https://www.google.com/maps/search/?api=1&query=venue".to_string())
        );
        assert_eq!(
            *launcher.launched.lock().unwrap(),
            vec![
                "tmap://search?name=venue".to_string(),
                "https://www.google.com/maps/search/?api=1&query=venue".to_string(),
            ]
        );
    }

    #[test]
    fn test_web_failure_is_reported() {
        let launcher = FakeLauncher::new(vec!["nmap://", "https://"]);
        assert!(open_in_map(MapProvider::Naver, "venue", "app", &launcher, DEFAULT_FALLBACK_AFTER).is_err());
    }
}
