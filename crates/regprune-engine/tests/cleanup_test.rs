//! End-to-end cleanup tests against a mock Docker registry.

use regprune_core::RetentionPolicy;
use regprune_engine::{RetentionEngine, Runner, TagOutcome};
use regprune_registry::{RegistryClient, RegistryConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

fn digest(n: u32) -> String {
    format!("sha256:{n:064x}")
}

fn manifest(n: u32) -> serde_json::Value {
    json!({
        "schemaVersion": 2,
        "mediaType": MANIFEST_V2,
        "config": {
            "mediaType": "application/vnd.docker.container.image.v1+json",
            "size": 1024,
            "digest": digest(n)
        },
        "layers": []
    })
}

fn runner_for(server: &MockServer) -> Runner<RegistryClient> {
    let client = RegistryClient::new(RegistryConfig::new(format!("{}/v2/", server.uri())))
        .expect("client");
    Runner::new(RetentionEngine::new(client)).with_concurrency(2)
}

async fn mount_tags(server: &MockServer, repository: &str, tags: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{repository}/tags/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": repository, "tags": tags})))
        .mount(server)
        .await;
}

async fn mount_manifest(server: &MockServer, repository: &str, tag: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{repository}/manifests/{tag}")))
        .and(header("Accept", MANIFEST_V2))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest(tag)))
        .expect(1)
        .mount(server)
        .await;
}

fn manifest_lookups(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path().contains("/manifests/"))
        .map(|r| r.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_deletes_oldest_and_survives_missing_manifest() {
    let server = MockServer::start().await;
    mount_tags(&server, "apps/web", &["5", "3", "1", "4", "2", "latest"]).await;

    Mock::given(method("GET"))
        .and(path("/v2/apps/web/manifests/1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_manifest(&server, "apps/web", 2).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v2/apps/web/manifests/{}", digest(2))))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let policy = RetentionPolicy::parse("apps/web = 3\n");
    let report = runner_for(&server).run(&policy).await;

    let web = report.repository("apps/web").unwrap();
    assert_eq!(web.tags_found, 6);
    assert_eq!(web.attempted, 2);
    assert_eq!(web.unresolved, 1);
    assert_eq!(web.deleted, 1);
    assert_eq!(web.skipped_non_numeric, 1);
    assert_eq!(web.tags[0].tag, "1");
    assert!(matches!(web.tags[0].outcome, TagOutcome::Unresolved { status: Some(404), .. }));
    assert_eq!(web.tags[1].outcome, TagOutcome::Deleted { digest: digest(2) });

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        manifest_lookups(&requests),
        vec!["/v2/apps/web/manifests/1", "/v2/apps/web/manifests/2"]
    );
}

#[tokio::test]
async fn test_garbage_collected_registry_retains_manifest() {
    let server = MockServer::start().await;
    mount_tags(&server, "apps/api", &["1", "2"]).await;
    mount_manifest(&server, "apps/api", 1).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v2/apps/api/manifests/{}", digest(1))))
        .respond_with(ResponseTemplate::new(405).set_body_json(json!({
            "errors": [{"code": "UNSUPPORTED", "message": "The operation is unsupported."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let policy = RetentionPolicy::parse("apps/api = 1\n");
    let report = runner_for(&server).run(&policy).await;

    assert_eq!(report.totals.retained, 1);
    assert_eq!(report.totals.deleted, 0);
    let api = report.repository("apps/api").unwrap();
    assert!(matches!(
        &api.tags[0].outcome,
        TagOutcome::Retained { status: Some(405), digest: d, .. } if *d == digest(1)
    ));
}

#[tokio::test]
async fn test_failed_listing_does_not_stop_other_repositories() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apps/broken/tags/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    mount_tags(&server, "apps/ok", &["10", "20"]).await;
    mount_manifest(&server, "apps/ok", 10).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/apps/ok/manifests/{}", digest(10))))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let policy = RetentionPolicy::parse("apps/broken = 1\napps/ok = 1\napps/bad = x\n");
    let report = runner_for(&server).run(&policy).await;

    assert_eq!(report.totals.repositories, 2);
    assert_eq!(report.totals.failed_repositories, 1);
    assert_eq!(report.totals.deleted, 1);
    assert_eq!(report.rejected_rules.len(), 1);

    let broken = report.repository("apps/broken").unwrap();
    assert!(broken.error.as_deref().unwrap().contains("503"));
}

#[tokio::test]
async fn test_policy_already_satisfied_sends_no_manifest_requests() {
    let server = MockServer::start().await;
    mount_tags(&server, "apps/web", &["1", "2"]).await;

    let policy = RetentionPolicy::parse("apps/web = 5\n");
    let report = runner_for(&server).run(&policy).await;

    assert_eq!(report.totals.attempted, 0);
    let requests = server.received_requests().await.unwrap();
    assert!(manifest_lookups(&requests).is_empty());
    assert_eq!(requests.len(), 1);
}
