//! End-to-end session tests

use chrono::{TimeZone, Utc};
use snowmap_client::{ClientConfig, IdentityGate, MapRenderer, Session};
use snowmap_sync::testing::ScriptedSource;
use snowmap_sync::SyncError;
use snowmap_types::{
    Contribution, ContributionId, FeatureData, GeoPoint, IssueTypeId, LayerDescriptor, Segment,
    SegmentId, UpdateBatch,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct ChannelRenderer {
    tx: mpsc::UnboundedSender<Vec<LayerDescriptor>>,
}

impl MapRenderer for ChannelRenderer {
    fn render(&self, layers: &[LayerDescriptor]) {
        let _ = self.tx.send(layers.to_vec());
    }
}

fn renderer() -> (Arc<ChannelRenderer>, mpsc::UnboundedReceiver<Vec<LayerDescriptor>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelRenderer { tx }), rx)
}

fn layer<'a>(layers: &'a [LayerDescriptor], key: &str) -> &'a LayerDescriptor {
    layers
        .iter()
        .find(|l| l.key() == key)
        .unwrap_or_else(|| panic!("missing layer {key}"))
}

fn segment(id: u64, side_one: Option<i32>, side_two: Option<i32>) -> Segment {
    Segment {
        id: SegmentId::new(id),
        geometry: vec![GeoPoint::new(-73.6, 45.5), GeoPoint::new(-73.61, 45.51)],
        side_one_state: side_one,
        side_two_state: side_two,
        winter: true,
        winter_protected: false,
        name: None,
        length: None,
        updated_at: Utc::now(),
        deleted: false,
    }
}

fn contribution(id: u64, issue_type: u32, quality: Option<i32>) -> Contribution {
    Contribution {
        id: ContributionId::new(id),
        issue_type_id: IssueTypeId::new(issue_type),
        quality,
        coords: Some(GeoPoint::new(-73.6, 45.5)),
        comment: None,
        name: None,
        score: 0,
        replies: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted: false,
    }
}

fn http_config(endpoint: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.sync.endpoint = endpoint.to_string();
    config.sync.request_timeout_secs = 5;
    config
}

#[tokio::test]
async fn test_full_fetch_then_incremental_update_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/update"))
        .and(query_param_is_missing("from"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "troncons": [
                {
                    "id": 1,
                    "geometry": [[-73.6, 45.5], [-73.61, 45.51]],
                    "sideOneState": 1,
                    "sideTwoState": 1,
                    "winter": true,
                    "updatedAt": "2026-01-10T07:00:00Z"
                },
                {
                    "id": 2,
                    "geometry": [[-73.62, 45.5], [-73.63, 45.51]],
                    "sideOneState": 0,
                    "updatedAt": "2026-01-10T07:00:00Z"
                }
            ],
            "contributions": [
                {
                    "id": 7,
                    "issueTypeId": 1,
                    "quality": 0,
                    "coords": [-73.6, 45.5],
                    "score": 0,
                    "createdAt": "2026-01-10T07:30:00Z",
                    "updatedAt": "2026-01-10T07:30:00Z"
                },
                {
                    "id": 8,
                    "issueTypeId": 2,
                    "coords": [-73.61, 45.5],
                    "score": 1,
                    "createdAt": "2026-01-10T07:45:00Z",
                    "updatedAt": "2026-01-10T07:45:00Z"
                }
            ],
            "asOf": "2026-01-10T08:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/update"))
        .and(query_param("from", "2026-01-10T08:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "troncons": [],
            "contributions": [
                {
                    "id": 7,
                    "issueTypeId": 1,
                    "quality": 0,
                    "coords": [-73.6, 45.5],
                    "score": 5,
                    "createdAt": "2026-01-10T07:30:00Z",
                    "updatedAt": "2026-01-10T08:02:00Z"
                },
                {
                    "id": 9,
                    "issueTypeId": 3,
                    "coords": [-73.62, 45.5],
                    "createdAt": "2026-01-10T08:03:00Z",
                    "updatedAt": "2026-01-10T08:03:00Z"
                }
            ],
            "asOf": "2026-01-10T08:05:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::connect(http_config(&server.uri())).unwrap();
    session.start(&mut IdentityGate::ready()).await.unwrap();

    let loaded = session.dataset();
    assert_eq!(loaded.segments.len(), 2);
    assert_eq!(loaded.contributions.len(), 2);
    assert_eq!(
        loaded.as_of,
        Some(Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap())
    );

    session.reconciler().refresh().await.unwrap();

    let refreshed = session.dataset();
    let ids: Vec<u64> = refreshed.contributions.iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, vec![7, 8, 9]);
    assert_eq!(refreshed.contributions[0].score, 5);
    assert_eq!(refreshed.segments.len(), 2);
    assert_eq!(
        refreshed.as_of,
        Some(Utc.with_ymd_and_hms(2026, 1, 10, 8, 5, 0).unwrap())
    );

    // The first snapshot is untouched by the merge
    assert_eq!(loaded.contributions[0].score, 0);

    let layers = session.layers();
    assert_eq!(layer(&layers, "line:cleared").len(), 1);
    assert_eq!(layer(&layers, "line:snowy").len(), 1);
    assert_eq!(layer(&layers, "marker:2").len(), 1);
    assert_eq!(layer(&layers, "marker:3").len(), 1);

    let LayerDescriptor::Markers(snow) = layer(&layers, "marker:1:0") else {
        panic!("expected marker layer");
    };
    assert_eq!(snow.features.len(), 1);
    assert!(matches!(
        snow.features[0].data,
        FeatureData::Contribution { score: 5, .. }
    ));

    session.shutdown().await;
}

#[tokio::test]
async fn test_failed_initial_fetch_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/update"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let session = Session::connect(http_config(&server.uri())).unwrap();
    let result = session.start(&mut IdentityGate::ready()).await;

    assert!(result.is_err());
    assert!(!session.dataset().is_loaded());
    let failure = session.last_error().expect("failure recorded");
    assert!(failure.message.contains("503"));
}

#[tokio::test]
async fn test_renderer_follows_data_and_filters() {
    let source = ScriptedSource::new();
    source
        .push(UpdateBatch {
            segments: vec![segment(1, Some(1), Some(1))],
            contributions: vec![contribution(7, 1, Some(0)), contribution(8, 2, None)],
            as_of: Utc::now(),
        })
        .await;

    let session = Session::new(ClientConfig::default(), source.clone()).unwrap();
    session.start(&mut IdentityGate::ready()).await.unwrap();

    let (renderer, mut rendered) = renderer();
    session.attach_renderer(renderer).await;

    let first = rendered.recv().await.unwrap();
    assert_eq!(layer(&first, "line:cleared").len(), 1);
    assert_eq!(layer(&first, "marker:1:0").len(), 1);
    assert_eq!(layer(&first, "marker:2").len(), 1);

    session.set_contribution_type(IssueTypeId::new(2), false);
    let filtered = rendered.recv().await.unwrap();
    assert!(layer(&filtered, "marker:2").is_empty());
    assert_eq!(layer(&filtered, "marker:1:0").len(), 1);

    source
        .push(UpdateBatch {
            segments: vec![segment(1, Some(0), Some(1))],
            contributions: vec![],
            as_of: Utc::now(),
        })
        .await;
    session.reconciler().refresh().await.unwrap();

    let refreshed = rendered.recv().await.unwrap();
    assert!(layer(&refreshed, "line:cleared").is_empty());
    assert_eq!(layer(&refreshed, "line:snowy").len(), 1);

    session.shutdown().await;

    // Render task gone, the renderer is dropped and the channel closes
    while rendered.recv().await.is_some() {}
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_shutdown() {
    let source = ScriptedSource::new();
    let session = Session::new(ClientConfig::default(), source.clone()).unwrap();
    session.start(&mut IdentityGate::ready()).await.unwrap();
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(source.calls(), 3);

    session.shutdown().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 3);

    assert!(matches!(
        session.reconciler().refresh().await,
        Err(SyncError::Closed)
    ));
}

#[tokio::test]
async fn test_identity_never_ready() {
    let source = ScriptedSource::new();
    let session = Session::new(ClientConfig::default(), source.clone()).unwrap();

    let (handle, mut gate) = IdentityGate::new();
    drop(handle);

    assert!(session.start(&mut gate).await.is_err());
    assert_eq!(source.calls(), 0);
}
