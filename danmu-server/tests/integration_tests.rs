//! Integration tests for the danmu aggregation pipeline.
//!
//! Resolution and comment providers are replaced by in-process mocks, so the
//! tests drive `DanmuService` and the axum router without touching the network.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

use danmaku::{ChainConfig, CommentEntry, CommentSource, DanmakuError, ProviderTier};
use danmu_server::api::{ApiServer, ApiServerConfig, AppState};
use danmu_server::config::CustomProviderSettings;
use danmu_server::danmu::{AggregateResponse, DanmuService};
use danmu_server::Error;
use platforms_resolver::{LinkResolver, MediaQuery, PlatformLink};

/// Resolver returning a fixed set of links.
struct FixedResolver {
    links: Vec<PlatformLink>,
    calls: AtomicUsize,
}

impl FixedResolver {
    fn new(links: Vec<PlatformLink>) -> Self {
        Self {
            links,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LinkResolver for FixedResolver {
    async fn resolve(&self, _query: &MediaQuery) -> Vec<PlatformLink> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.links.clone()
    }
}

struct PanickingResolver;

#[async_trait]
impl LinkResolver for PanickingResolver {
    async fn resolve(&self, _query: &MediaQuery) -> Vec<PlatformLink> {
        panic!("resolver bug");
    }
}

/// Provider answering from a per-platform table; unknown platforms fail.
struct TableSource {
    tier: ProviderTier,
    table: HashMap<&'static str, Vec<CommentEntry>>,
}

#[async_trait]
impl CommentSource for TableSource {
    fn name(&self) -> &str {
        "table"
    }

    fn tier(&self) -> ProviderTier {
        self.tier
    }

    async fn fetch(&self, platform: &str, _video_url: &str) -> danmaku::Result<Vec<CommentEntry>> {
        self.table
            .get(platform)
            .cloned()
            .ok_or_else(|| DanmakuError::other(format!("no comments for {platform}")))
    }
}

fn two_platform_links() -> Vec<PlatformLink> {
    vec![
        PlatformLink::new("tencent", "https://v.qq.com/x/cover/mzc00200abc/e0045xyz.html"),
        PlatformLink::new("iqiyi", "https://www.iqiyi.com/v_19rrok4nt0.html"),
    ]
}

fn shared_comment_source() -> TableSource {
    let mut table = HashMap::new();
    table.insert(
        "tencent",
        vec![
            CommentEntry::new("同一句弹幕", 12.341),
            CommentEntry::new("腾讯独有", 30.0),
        ],
    );
    table.insert(
        "iqiyi",
        vec![
            CommentEntry::new(" 同一句弹幕 ", 12.338),
            CommentEntry::new("爱奇艺独有", 5.0),
        ],
    );
    TableSource {
        tier: ProviderTier::Markup,
        table,
    }
}

fn service_with(resolver: Arc<dyn LinkResolver>, source: TableSource) -> DanmuService {
    let no_custom: Option<CustomProviderSettings> = None;
    DanmuService::new(
        resolver,
        Arc::new(no_custom),
        reqwest::Client::new(),
        ChainConfig::default(),
    )
    .with_source(Arc::new(source))
}

fn router_for(service: DanmuService) -> axum::Router {
    ApiServer::new(ApiServerConfig::default(), AppState::new(Arc::new(service))).router()
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_across_platforms_merges_to_one() {
        let service = service_with(
            Arc::new(FixedResolver::new(two_platform_links())),
            shared_comment_source(),
        );

        let response = service
            .aggregate(&MediaQuery::from_media_id("26797419"))
            .await
            .unwrap();

        let shared: Vec<_> = response
            .danmu
            .iter()
            .filter(|c| c.text.trim() == "同一句弹幕")
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(response.total, 3);
        assert_eq!(response.danmu.len(), response.total);

        let times: Vec<f64> = response.danmu.iter().map(|c| c.time_seconds).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(response.platforms.len(), 2);
        assert!(response.platforms.iter().all(|p| p.count == 2));
    }

    #[tokio::test]
    async fn test_failing_platform_does_not_fail_request() {
        let mut links = two_platform_links();
        links.push(PlatformLink::new("mgtv", "https://www.mgtv.com/b/1/2.html"));
        let service = service_with(Arc::new(FixedResolver::new(links)), shared_comment_source());

        let response = service
            .aggregate(&MediaQuery::from_title("庆余年").with_episode("1"))
            .await
            .unwrap();

        assert_eq!(response.platforms.len(), 3);
        let mgtv = response
            .platforms
            .iter()
            .find(|p| p.platform == "mgtv")
            .unwrap();
        assert_eq!(mgtv.count, 0);
        assert_eq!(response.total, 3);
    }

    #[tokio::test]
    async fn test_missing_identity_skips_resolution() {
        let resolver = Arc::new(FixedResolver::new(two_platform_links()));
        let service = service_with(resolver.clone(), shared_comment_source());

        let err = service.aggregate(&MediaQuery::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_links_returns_empty_feed() {
        let service = service_with(Arc::new(FixedResolver::new(Vec::new())), shared_comment_source());
        let response = service
            .aggregate(&MediaQuery::from_media_id("1"))
            .await
            .unwrap();
        assert_eq!(response, AggregateResponse::empty());
    }
}

mod api_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_params_is_400() {
        let router = router_for(service_with(
            Arc::new(FixedResolver::new(two_platform_links())),
            shared_comment_source(),
        ));

        let (status, _, body) = get(router, "/api/danmu").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "mediaId or title is required");
    }

    #[tokio::test]
    async fn test_json_response() {
        let router = router_for(service_with(
            Arc::new(FixedResolver::new(two_platform_links())),
            shared_comment_source(),
        ));

        let (status, content_type, body) =
            get(router, "/api/danmu?mediaId=26797419&episode=3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("application/json"));

        let response: AggregateResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(response.platforms.len(), 2);
    }

    #[tokio::test]
    async fn test_xml_response() {
        let router = router_for(service_with(
            Arc::new(FixedResolver::new(two_platform_links())),
            shared_comment_source(),
        ));

        let (status, content_type, body) =
            get(router, "/api/danmu?title=%E5%BA%86%E4%BD%99%E5%B9%B4&format=xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("application/xml"));

        let xml = String::from_utf8(body).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert_eq!(xml.matches("<d p=").count(), 3);
        assert_eq!(danmaku::parse_markup(&xml).len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_format_is_400() {
        let router = router_for(service_with(
            Arc::new(FixedResolver::new(two_platform_links())),
            shared_comment_source(),
        ));

        let (status, _, body) = get(router, "/api/danmu?mediaId=1&format=ass").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("ass"));
    }

    #[tokio::test]
    async fn test_panic_is_generic_500() {
        let router = router_for(service_with(
            Arc::new(PanickingResolver),
            shared_comment_source(),
        ));

        let (status, _, body) = get(router, "/api/danmu?mediaId=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_health_routes() {
        let service = service_with(
            Arc::new(FixedResolver::new(Vec::new())),
            shared_comment_source(),
        );
        let router = router_for(service);

        let (status, _, body) = get(router.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["providers"], 1);

        let (status, _, body) = get(router, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "alive");
    }
}
