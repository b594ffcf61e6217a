use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::Result,
    state::AppState,
    storage::{Category, Querier},
};

use super::ApiResponse;

/// 配置分类相关路由。
///
/// - `GET /categories`：所有分类，按名称排序
pub fn setup_route<Q>() -> Router<AppState<Q>>
where
    Q: Querier + Clone + 'static,
{
    Router::new().route("/categories", get(category_list::<Q>))
}

async fn category_list<Q: Querier>(
    State(app): State<AppState<Q>>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = app.querier().categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}
