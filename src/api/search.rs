use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::{Query, QueryRejection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{field::Empty, instrument};

use crate::{
    error::{Error, Result},
    search::{Pagination, SearchArticle, SearchPlan, SearchRequest, SortBy},
    state::AppState,
    storage::{Category, Querier},
};

use super::ApiResponse;

const MALFORMED_QUERY: &str = "Tham số tìm kiếm không hợp lệ";

/// 配置搜索路由。
///
/// - `GET /search?q=&category=&sortBy=&page=&limit=`
pub fn setup_route<Q>() -> Router<AppState<Q>>
where
    Q: Querier + Clone + 'static,
{
    Router::new().route("/search", get(search::<Q>))
}

/// 搜索查询参数
///
/// 全部以字符串接收，在 [`SearchParams::into_request`] 中统一校验，
/// 这样格式错误也能以统一的失败结构返回。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
    pub category: String,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    /// 校验参数并生成 [`SearchRequest`]，不访问存储
    pub fn into_request(self) -> Result<SearchRequest> {
        let page = SearchRequest::parse_page(self.page.as_deref())?;
        let limit = SearchRequest::parse_limit(self.limit.as_deref())?;

        SearchRequest::new(
            self.q,
            self.category,
            SortBy::parse(&self.sort_by),
            page,
            limit,
        )
    }
}

/// 搜索条件回显
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub query: String,
    pub category: String,
    pub sort_by: SortBy,
    pub total_results: u64,
}

/// 搜索结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub articles: Vec<SearchArticle>,
    pub pagination: Pagination,
    pub search_info: SearchInfo,
}

/// 搜索已发布的文章。
///
/// 关键词和分类至少提供一个；分类无法解析时忽略分类条件。
/// 没有结果时返回空列表而不是错误。查询字符串无法解析（例如参数重复）时
/// 同样以失败结构返回 400。
#[instrument(name = "search", skip_all, fields(q = Empty, category = Empty))]
async fn search<Q: Querier>(
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
    State(app): State<AppState<Q>>,
) -> Result<Json<ApiResponse<SearchData>>> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(%e, "malformed query string");
        Error::InvalidRequest(MALFORMED_QUERY)
    })?;
    let span = tracing::Span::current();
    span.record("q", params.q.as_str());
    span.record("category", params.category.as_str());

    let request = params.into_request()?;

    let category = resolve_category(app.querier(), request.category()).await?;
    let plan = SearchPlan::build(&request, category.as_ref());
    let hits = app.querier().search(&plan).await?;

    let now = Utc::now();
    let articles = hits
        .items
        .into_iter()
        .map(|hit| SearchArticle::from_hit(hit, now))
        .collect();

    Ok(Json(ApiResponse::success(SearchData {
        articles,
        pagination: Pagination::new(request.page(), request.limit(), hits.total),
        search_info: SearchInfo {
            query: request.raw_query().to_string(),
            category: request.raw_category().to_string(),
            sort_by: request.sort_by(),
            total_results: hits.total,
        },
    })))
}

async fn resolve_category<Q: Querier>(querier: &Q, key: Option<&str>) -> Result<Option<Category>> {
    let Some(key) = key else {
        return Ok(None);
    };

    let category = querier.find_category(key).await?;
    if category.is_none() {
        tracing::debug!(category = key, "category not found, filter dropped");
    }
    Ok(category)
}
