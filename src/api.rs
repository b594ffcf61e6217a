mod categories;
mod response;
mod search;

use axum::Router;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    state::AppState,
    storage::Querier,
};

pub use self::{
    response::ApiResponse,
    search::{SearchData, SearchInfo, SearchParams},
};

/// 设置应用的路由。
///
/// 将 `/api` 下的搜索接口和分类接口组合在一起，并绑定应用状态。
pub fn setup_route<Q>(app: AppState<Q>) -> Router
where
    Q: Querier + Clone + 'static,
{
    Router::new()
        .nest(
            "/api",
            search::setup_route::<Q>().merge(categories::setup_route::<Q>()),
        )
        .with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, router).await.map_err(Error::from)
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server<Q>(app: AppState<Q>, addr: &str) -> Result<()>
where
    Q: Querier + Clone + 'static,
{
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, addr).await
}

/// 请求追踪：不记录普通请求，只记录失败（5xx）的请求及其耗时
fn add_middlewares(router: Router) -> Router {
    use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};

    let trace = TraceLayer::new_for_http().on_request(()).on_failure(
        |failure: ServerErrorsFailureClass, latency: std::time::Duration, _: &tracing::Span| {
            tracing::error!(%failure, ?latency, "request failed");
        },
    );
    router.layer(trace)
}
