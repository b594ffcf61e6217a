pub mod api;
pub mod config;
pub mod error;
pub mod search;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use state::AppState;

/// 初始化日志输出
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env(config::LOG_ENV))
        .init();
}

/// 读取配置，连接数据库并启动 HTTP 服务
pub async fn run() -> error::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let pool = storage::new_db_pool(&config.database_url).await?;
    storage::check_ctype(&pool).await?;

    api::run_server(AppState::new(pool), &config.listen_addr).await
}
