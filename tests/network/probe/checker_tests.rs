/*!
Tests for the reachability checker.

Covers status-code classification, scheme handling between the resolution
pre-check and the HTTP request, and the "never fail, only answer false"
contract.
*/

use crate::common::{stub_probe, StubHttpClient, StubResolver};
use netreach::core::network::probe::{is_reachable_status, ReachabilityProbe, REACHABLE_STATUS_CODES};

#[test]
fn test_reachable_status_codes() {
    for code in [200, 202, 400, 401, 403, 405] {
        assert!(is_reachable_status(code), "{} should count as reachable", code);
    }
    for code in [0, 201, 204, 301, 404, 429, 500, 503] {
        assert!(!is_reachable_status(code), "{} should not count as reachable", code);
    }
    assert_eq!(REACHABLE_STATUS_CODES.len(), 6);
}

#[tokio::test]
async fn test_probe_accepts_live_server_statuses() {
    for code in [200, 202, 400, 401, 403, 405] {
        let (client, _) = StubHttpClient::status(code);
        let (resolver, _) = StubResolver::resolving("93.184.216.34");
        let probe = stub_probe(client, resolver);

        assert!(probe.probe("example.com").await, "status {}", code);
    }
}

#[tokio::test]
async fn test_probe_rejects_missing_or_failing_server_statuses() {
    for code in [404, 500, 503] {
        let (client, _) = StubHttpClient::status(code);
        let (resolver, _) = StubResolver::resolving("93.184.216.34");
        let probe = stub_probe(client, resolver);

        assert!(!probe.probe("example.com").await, "status {}", code);
    }
}

#[tokio::test]
async fn test_probe_io_error_is_unreachable() {
    let (client, _) = StubHttpClient::failing("connection refused");
    let (resolver, _) = StubResolver::resolving("93.184.216.34");
    let probe = stub_probe(client, resolver);

    let report = probe.probe_report("example.com").await;
    assert!(!report.reachable);
    assert_eq!(report.status_code, None);
    assert_eq!(report.error.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn test_scheme_stripped_for_resolution_and_kept_for_http() {
    let (client, urls) = StubHttpClient::status(200);
    let (resolver, hosts) = StubResolver::resolving("93.184.216.34");
    let probe = stub_probe(client, resolver);

    assert!(probe.probe("https://example.com/path").await);
    assert!(probe.probe("example.com").await);

    let hosts = hosts.lock().unwrap().clone();
    assert_eq!(hosts[0].0, "example.com");
    assert_eq!(hosts[1].0, "example.com");
    assert_eq!(hosts[0].1, 443);
    assert_eq!(hosts[1].1, 80);

    let urls = urls.lock().unwrap().clone();
    assert_eq!(urls, vec!["https://example.com/path", "http://example.com"]);
    assert!(urls.iter().all(|u| u.contains("://")));
}

#[tokio::test]
async fn test_resolution_failure_falls_back_to_http() {
    let (client, urls) = StubHttpClient::status(200);
    let (resolver, _) = StubResolver::failing();
    let probe = stub_probe(client, resolver);

    let report = probe.probe_report("intranet.local").await;
    assert!(report.reachable);
    assert_eq!(report.resolved, None);
    assert_eq!(urls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_records_resolution() {
    let (client, _) = StubHttpClient::status(401);
    let (resolver, _) = StubResolver::resolving("10.0.0.7");
    let probe = stub_probe(client, resolver);

    let report = probe.probe_report("https://api.example.com").await;
    assert!(report.reachable);
    assert_eq!(report.host.as_deref(), Some("api.example.com"));
    assert_eq!(report.resolved, Some("10.0.0.7".parse().unwrap()));
    assert_eq!(report.status_code, Some(401));
    assert_eq!(report.url.as_deref(), Some("https://api.example.com"));
}

#[tokio::test]
async fn test_malformed_host_is_unreachable_without_request() {
    let (client, urls) = StubHttpClient::status(200);
    let (resolver, hosts) = StubResolver::resolving("10.0.0.7");
    let probe = stub_probe(client, resolver);

    let report = probe.probe_report("http://").await;
    assert!(!report.reachable);
    assert!(report.error.is_some());
    assert!(urls.lock().unwrap().is_empty());
    assert!(hosts.lock().unwrap().is_empty());
}
