use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::StatusCode,
};
use chrono::{TimeDelta, TimeZone, Utc};
use serde_json::Value;
use tower::util::ServiceExt;

use tintuc::{
    api,
    error::{Error, Result},
    search::SearchPlan,
    state::AppState,
    storage::{
        Article, ArticleStatus, CATEGORY_FALLBACK_NAME, CATEGORY_FALLBACK_SLUG, Category, Fixture,
        MemoryStore, Querier, SearchHits, Store,
    },
};

const DEMO: &str = include_str!("../fixtures/demo.json");

struct TestApp {
    router: Router,
}

impl TestApp {
    fn with_querier<Q: Querier + Clone + 'static>(querier: Q) -> Self {
        Self {
            router: api::setup_route(AppState::new(querier)),
        }
    }

    async fn demo() -> Self {
        let store = MemoryStore::new();
        Fixture::from_json(DEMO)
            .expect("解析初始数据失败")
            .load(store.writer(), true)
            .await
            .expect("写入初始数据失败");
        Self::with_querier(store)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri).body(Body::empty()).expect("请求失败");
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot fail");
        let status = resp.status();
        let data = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("读取数据失败");
        let json = serde_json::from_slice(&data).expect("反序列化失败");
        (status, json)
    }

    async fn search_ok(&self, query: &str) -> Value {
        let (status, json) = self.get(&format!("/api/search?{query}")).await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["success"], true);
        json["data"].clone()
    }
}

fn ids(data: &Value) -> Vec<String> {
    data["articles"]
        .as_array()
        .expect("articles 应为数组")
        .iter()
        .map(|a| a["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// 关键词 `kinh tế`（URL 编码）
const KINH_TE: &str = "kinh%20t%E1%BA%BF";

#[tokio::test]
async fn missing_query_and_category_is_bad_request() {
    let app = TestApp::demo().await;

    for uri in [
        "/api/search",
        "/api/search?q=&category=all",
        "/api/search?q=%20%20&category=",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(json.get("data").is_none());
    }
}

#[tokio::test]
async fn keyword_search_ranks_by_relevance() {
    let app = TestApp::demo().await;
    let data = app
        .search_ok(&format!("q={KINH_TE}&category=all&sortBy=relevance&page=1&limit=12"))
        .await;

    assert_eq!(ids(&data), ["a01", "a07", "a02", "a03", "a04"]);

    let relevance: Vec<i64> = data["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["relevance"].as_i64().unwrap())
        .collect();
    assert_eq!(relevance, [17, 10, 5, 2, 0]);

    assert_eq!(data["pagination"]["totalItems"], 5);
    assert_eq!(data["pagination"]["totalPages"], 1);
    assert_eq!(data["searchInfo"]["query"], "kinh tế");
    assert_eq!(data["searchInfo"]["category"], "all");
    assert_eq!(data["searchInfo"]["sortBy"], "relevance");
    assert_eq!(data["searchInfo"]["totalResults"], 5);
}

#[tokio::test]
async fn drafts_are_never_returned() {
    let app = TestApp::demo().await;
    let data = app.search_ok(&format!("q={KINH_TE}&limit=100")).await;
    assert!(!ids(&data).contains(&"a06".to_string()));

    let data = app.search_ok("category=kinh-te&limit=100").await;
    assert_eq!(ids(&data), ["a02", "a01"]);
}

#[tokio::test]
async fn category_only_sorted_by_newest() {
    let app = TestApp::demo().await;
    let data = app.search_ok("q=&category=cong-nghe&sortBy=newest").await;

    assert_eq!(ids(&data), ["a08", "a04", "a03"]);
    for article in data["articles"].as_array().unwrap() {
        assert_eq!(article["relevance"], 1);
        assert_eq!(article["category"], "Công nghệ");
        assert_eq!(article["categorySlug"], "cong-nghe");
    }
    assert_eq!(data["searchInfo"]["sortBy"], "newest");
}

#[tokio::test]
async fn category_name_works_like_slug() {
    let app = TestApp::demo().await;
    let by_slug = app.search_ok("category=cong-nghe&sortBy=oldest").await;
    let by_name = app
        .search_ok("category=C%C3%B4ng%20ngh%E1%BB%87&sortBy=oldest")
        .await;

    assert_eq!(ids(&by_slug), ["a03", "a04", "a08"]);
    assert_eq!(ids(&by_slug), ids(&by_name));
}

#[tokio::test]
async fn no_match_is_empty_success() {
    let app = TestApp::demo().await;
    let data = app.search_ok("q=zzzznotfound&category=all").await;

    assert_eq!(data["articles"], serde_json::json!([]));
    assert_eq!(data["searchInfo"]["totalResults"], 0);
    assert_eq!(data["pagination"]["totalPages"], 0);
    assert_eq!(data["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn unknown_category_is_ignored() {
    let app = TestApp::demo().await;
    let query = "q=&category=nonexistent-slug&limit=100";
    let data = app.search_ok(query).await;

    assert_eq!(data["pagination"]["totalItems"], 7);
    assert_eq!(data["searchInfo"]["category"], "nonexistent-slug");
}

#[tokio::test]
async fn most_viewed_sort() {
    let app = TestApp::demo().await;
    let data = app
        .search_ok("category=nonexistent-slug&sortBy=most-viewed&limit=3")
        .await;
    assert_eq!(ids(&data), ["a05", "a02", "a01"]);
}

#[tokio::test]
async fn dangling_references_use_fallback_labels() {
    let app = TestApp::demo().await;
    let data = app.search_ok("q=kh%E1%BB%9Fi%20nghi%E1%BB%87p").await;

    let article = &data["articles"][0];
    assert_eq!(article["id"], "a07");
    assert_eq!(article["category"], CATEGORY_FALLBACK_NAME);
    assert_eq!(article["categorySlug"], CATEGORY_FALLBACK_SLUG);
    assert_eq!(article["slug"], "khởi-nghiệp-công-nghệ-và-kinh-tế-số");
    assert_eq!(article["excerpt"], "");
    assert_eq!(article["imageUrl"], "/placeholder.jpg");
    assert_eq!(article["tags"], serde_json::json!([]));

    let data = app.search_ok("q=ng%C3%A2n%20h%C3%A0ng").await;
    let article = &data["articles"][0];
    assert_eq!(article["id"], "a04");
    assert_eq!(article["author"], "Không rõ");

    let data = app.search_ok("q=v%C3%A0ng").await;
    assert_eq!(data["articles"][0]["author"], "Trần Thị Bình");
}

#[tokio::test]
async fn identical_requests_are_idempotent() {
    let app = TestApp::demo().await;
    let uri = format!("q={KINH_TE}&sortBy=relevance&page=1&limit=2");

    let first = app.search_ok(&uri).await;
    let second = app.search_ok(&uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_page_is_bad_request() {
    let app = TestApp::demo().await;
    for uri in [
        "/api/search?q=tin&page=abc",
        "/api/search?q=tin&page=0",
        "/api/search?q=tin&limit=-5",
        "/api/search?q=tin&limit=101",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn repeated_parameters_use_failure_envelope() {
    let app = TestApp::with_querier(BrokenStore);
    for uri in [
        "/api/search?q=kinh&q=te",
        "/api/search?q=tin&page=1&page=2",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Tham số tìm kiếm không hợp lệ");
    }
}

/// 生成 `count` 篇同一分类下已发布的文章
async fn bulk_store(count: u32) -> MemoryStore {
    let store = MemoryStore::new();
    let mut writer = store.writer();
    writer.upsert_category(&Category {
        id: "c-thoi-su".into(),
        name: "Thời sự".into(),
        slug: "thoi-su".into(),
    });
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    for i in 0..count {
        writer.upsert_article(&Article {
            id: format!("n{i:03}"),
            title: format!("Bản tin thời sự số {i}"),
            slug: Some(format!("ban-tin-{i}")),
            short_description: (i % 2 == 0).then(|| "Tin thời sự trong ngày".to_string()),
            content: String::new(),
            cover_image_url: None,
            status: ArticleStatus::Published,
            category_id: Some("c-thoi-su".into()),
            author_id: None,
            tags: vec![],
            views: i64::from(i % 4),
            publication_date: Some(base + TimeDelta::hours(i64::from(i % 5))),
            updated_at: base,
        });
    }
    writer.commit().await.expect("写入失败");
    store
}

#[tokio::test]
async fn page_beyond_total_is_empty() {
    let app = TestApp::with_querier(bulk_store(20).await);
    let data = app.search_ok("category=thoi-su&page=999&limit=12").await;

    assert_eq!(data["articles"], serde_json::json!([]));
    assert_eq!(data["pagination"]["totalItems"], 20);
    assert_eq!(data["pagination"]["totalPages"], 2);
    assert_eq!(data["pagination"]["currentPage"], 999);
    assert_eq!(data["pagination"]["hasNextPage"], false);
    assert_eq!(data["pagination"]["hasPrevPage"], true);
}

#[tokio::test]
async fn pages_reproduce_full_result() {
    let app = TestApp::with_querier(bulk_store(20).await);

    for sort in ["relevance", "newest", "oldest", "most-viewed"] {
        let query = format!("q=th%E1%BB%9Di%20s%E1%BB%B1&sortBy={sort}");
        let full = app.search_ok(&format!("{query}&limit=100")).await;
        assert_eq!(full["pagination"]["totalItems"], 20);

        let mut paged = Vec::new();
        for page in 1..=3 {
            let data = app.search_ok(&format!("{query}&page={page}&limit=7")).await;
            assert_eq!(data["pagination"]["totalItems"], 20);
            paged.extend(ids(&data));
        }
        assert_eq!(paged, ids(&full), "sortBy={sort}");
    }
}

#[tokio::test]
async fn relevance_order_is_monotonic() {
    let app = TestApp::with_querier(bulk_store(20).await);
    let query = "q=th%E1%BB%9Di%20s%E1%BB%B1&limit=100";
    let data = app.search_ok(query).await;

    let articles = data["articles"].as_array().unwrap();
    for pair in articles.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (ra, rb) = (a["relevance"].as_i64().unwrap(), b["relevance"].as_i64().unwrap());
        assert!(ra >= rb);
        if ra == rb {
            assert!(a["publishedDate"].as_str() >= b["publishedDate"].as_str());
        }
    }
    assert_eq!(articles[0]["relevance"], 15);
}

#[tokio::test]
async fn categories_listed_by_name() {
    let app = TestApp::demo().await;
    let (status, json) = app.get("/api/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let slugs: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, ["cong-nghe", "kinh-te", "the-thao"]);
}

/// 所有读取都失败的存储
#[derive(Clone)]
struct BrokenStore;

impl Querier for BrokenStore {
    async fn find_category(&self, _key: &str) -> Result<Option<Category>> {
        Err(Error::StoreUnavailable("connection refused".into()))
    }

    async fn search(&self, _plan: &SearchPlan) -> Result<SearchHits> {
        Err(Error::StoreUnavailable("connection refused".into()))
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Err(Error::StoreUnavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn store_failure_is_generic_server_error() {
    let app = TestApp::with_querier(BrokenStore);

    for uri in [
        "/api/search?q=tin",
        "/api/search?category=kinh-te",
        "/api/categories",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(json["success"], false);
        let message = json["error"].as_str().unwrap();
        assert!(!message.contains("connection refused"));
    }
}

#[tokio::test]
async fn validation_happens_before_store_access() {
    let app = TestApp::with_querier(BrokenStore);
    let (status, _) = app.get("/api/search?q=&category=all").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "API测试 依赖真实数据库"]
async fn test_postgres_search() {
    use tintuc::{
        config::Config,
        storage::{SCHEMA_FILE, SqlxStore, migrate, new_db_pool},
    };

    let config = Config::from_env().expect("缺少 DATABASE_URL");
    let pool = new_db_pool(&config.database_url)
        .await
        .expect("连接数据库失败");
    migrate(&pool, SCHEMA_FILE).await.expect("初始化sql失败");
    Fixture::from_json(DEMO)
        .expect("解析初始数据失败")
        .load(SqlxStore::new(pool.clone()), true)
        .await
        .expect("写入初始数据失败");

    let app = TestApp::with_querier(pool);

    let data = app.search_ok(&format!("q={KINH_TE}")).await;
    assert_eq!(ids(&data), ["a01", "a07", "a02", "a03", "a04"]);

    let data = app.search_ok("category=cong-nghe&sortBy=newest").await;
    assert_eq!(ids(&data), ["a08", "a04", "a03"]);

    let data = app.search_ok("category=nonexistent-slug&page=999").await;
    assert_eq!(data["articles"], serde_json::json!([]));
    assert_eq!(data["pagination"]["totalItems"], 7);
}
