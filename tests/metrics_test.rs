//! Tests for metrics emitted by the greeting caches.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use realm_greetings::telemetry;
use realm_greetings::{
    Greetings, GreetingsConfig, Realm, StaticSecretStore, StaticServiceRegistry,
};

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum counter values for `name`, optionally restricted to one label value.
fn counter_total(snapshot: &SnapshotVec, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| match label {
            Some((k, v)) => key.key().labels().any(|l| l.key() == k && l.value() == v),
            None => true,
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn greetings(registry: StaticServiceRegistry, secrets: StaticSecretStore) -> Greetings {
    Greetings::new(
        reqwest::Client::new(),
        Arc::new(registry),
        Arc::new(secrets),
        GreetingsConfig::default(),
    )
}

/// Runs async code within a local recorder scope on the multi-thread runtime.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn hit_and_miss_are_counted_per_layer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let registry = StaticServiceRegistry::new().with_realm("acme", server.uri());
                let secrets =
                    StaticSecretStore::new().with_secret("acme", "greetings.api", "k-acme");
                let greetings = greetings(registry, secrets);
                let realm = Realm::new("acme");
                greetings.get_greeting(&realm, "alice").await.unwrap();
                greetings.get_greeting(&realm, "alice").await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::LOOKUPS_TOTAL, Some(("status", "ok"))),
        2
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, Some(("cache", "realm"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, Some(("cache", "realm"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, Some(("cache", "greeting"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, Some(("cache", "greeting"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL, None),
        1
    );
    assert!(has_histogram(
        &snapshot,
        telemetry::REMOTE_REQUEST_DURATION_SECONDS
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_lookup_records_error() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let greetings = greetings(StaticServiceRegistry::new(), StaticSecretStore::new());
                greetings.get_greeting(&Realm::new("acme"), "alice").await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(&snapshot, telemetry::LOOKUPS_TOTAL, Some(("status", "error"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::REMOTE_REQUESTS_TOTAL, None),
        0
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    let greetings = greetings(StaticServiceRegistry::new(), StaticSecretStore::new());
    let _ = greetings.get_greeting(&Realm::new("acme"), "alice").await;
}
