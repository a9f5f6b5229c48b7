// tests/transport_request.rs
//
// Request shape per source, built but never sent.

use std::time::Duration;

use admission_thresholds::config::{Registry, BUILTIN_SOURCES};
use admission_thresholds::transport::{BROWSER_ACCEPT_LANGUAGE, BROWSER_USER_AGENT};
use admission_thresholds::{HttpTransport, SourceId};

fn registry() -> Registry {
    Registry::parse(BUILTIN_SOURCES, 2026).unwrap()
}

#[test]
fn html_sources_send_browser_headers_and_referer() {
    let reg = registry();
    let huji = reg.get(SourceId::Huji).unwrap();
    let http = HttpTransport::new(Duration::from_secs(7)).unwrap();

    let req = http.request(huji).unwrap().build().unwrap();
    assert_eq!(req.method(), reqwest::Method::GET);
    assert_eq!(req.url().as_str(), huji.url);
    let h = req.headers();
    assert_eq!(h["user-agent"], BROWSER_USER_AGENT);
    assert_eq!(h["accept-language"], BROWSER_ACCEPT_LANGUAGE);
    assert_eq!(h["referer"], huji.url.as_str());
    assert_eq!(req.timeout(), Some(&Duration::from_secs(7)));
}

#[test]
fn api_sources_post_json_payload() {
    let reg = registry();
    let bgu = reg.get(SourceId::Bgu).unwrap();
    let http = HttpTransport::new(Duration::from_secs(30)).unwrap();

    let req = http.request(bgu).unwrap().build().unwrap();
    assert_eq!(req.method(), reqwest::Method::POST);
    assert_eq!(req.headers()["content-type"], "application/json");
    assert!(req.headers().get("referer").is_none());

    let body = req.body().and_then(|b| b.as_bytes()).unwrap();
    let sent: serde_json::Value = serde_json::from_slice(body).unwrap();
    assert_eq!(sent["year"], "2027");
    assert_eq!(sent["departmentId"], 471);
}

#[test]
fn tau_keeps_configured_host_header() {
    let reg = registry();
    let tau = reg.get(SourceId::Tau).unwrap();
    let http = HttpTransport::new(Duration::from_secs(30)).unwrap();

    let req = http.request(tau).unwrap().build().unwrap();
    assert_eq!(req.headers()["host"], "go.tau.ac.il");
    assert_eq!(req.headers()["user-agent"], BROWSER_USER_AGENT);
}
