//! Integration tests for the sign-in flow

use proptest::prelude::*;
use url::Url;

use vkdata::auth::{authorize_url, capture_redirect, Capture, Session, ACCESS_TOKEN_KEY};
use vkdata::config::{ApiConfig, AppConfig};
use vkdata::host::{FileSettings, SettingsStore};

#[test]
fn test_authorize_url_matches_the_registered_app() {
    let url = authorize_url(&AppConfig::default(), &ApiConfig::default()).unwrap();
    assert_eq!(url.as_str().split('?').next(), Some("https://oauth.vk.com/authorize"));

    let query = url.query().unwrap();
    for expected in [
        "client_id=6742961",
        "display=page",
        "response_type=token",
        "v=5.90",
    ] {
        assert!(query.contains(expected), "missing {expected} in {query}");
    }
}

#[test]
fn test_capture_persists_across_store_reopens() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.json");
    let settings = FileSettings::at(path.clone()).unwrap();

    let url = Url::parse(
        "https://oauth.vk.com/blank.html#access_token=tok123&expires_in=0&user_id=42",
    )
    .unwrap();
    let capture = capture_redirect(&url).unwrap();
    Session::store(&settings, &capture, &AppConfig::default().scope).unwrap();

    // A fresh handle on the same file still yields the session
    let reopened = FileSettings::at(path).unwrap();
    let session = Session::load(&reopened, &AppConfig::default()).unwrap();
    assert_eq!(session.access_token, "tok123");
    assert_eq!(session.user_id, "42");
}

#[test]
fn test_denied_grant_leaves_no_session() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = FileSettings::at(tmp.path().join("settings.json")).unwrap();

    let denied = Url::parse(
        "https://oauth.vk.com/blank.html#error=access_denied&error_description=User+denied+access",
    )
    .unwrap();
    assert!(capture_redirect(&denied).is_none());
    assert!(Session::load(&settings, &AppConfig::default()).is_none());
}

#[test]
fn test_widening_the_scope_invalidates_a_stored_session() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = FileSettings::at(tmp.path().join("settings.json")).unwrap();

    let capture = Capture {
        access_token: "tok".into(),
        user_id: "7".into(),
    };
    // Token granted under a narrower scope than the app now asks for
    Session::store(&settings, &capture, "offline,friends").unwrap();

    assert!(Session::load(&settings, &AppConfig::default()).is_none());
    // The raw token is still stored; only the session view rejects it
    assert!(settings.get(ACCESS_TOKEN_KEY).is_some());
}

#[test]
fn test_clear_signs_out_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.json");
    let settings = FileSettings::at(path.clone()).unwrap();

    let capture = Capture {
        access_token: "tok".into(),
        user_id: "7".into(),
    };
    Session::store(&settings, &capture, &AppConfig::default().scope).unwrap();
    Session::clear(&settings).unwrap();

    let reopened = FileSettings::at(path).unwrap();
    assert!(Session::load(&reopened, &AppConfig::default()).is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any printable token/user-id pair survives the fragment encode and
    /// capture round trip.
    #[test]
    fn prop_fragment_round_trip(token in "[ -~]{1,64}", user_id in "[0-9]{1,12}") {
        let mut fragment = url::form_urlencoded::Serializer::new(String::new());
        fragment.append_pair("access_token", &token);
        fragment.append_pair("expires_in", "0");
        fragment.append_pair("user_id", &user_id);
        let fragment = fragment.finish();

        let url = Url::parse(&format!("https://oauth.vk.com/blank.html#{fragment}")).unwrap();
        let capture = capture_redirect(&url).unwrap();
        prop_assert_eq!(capture.access_token, token);
        prop_assert_eq!(capture.user_id, user_id);
    }
}
