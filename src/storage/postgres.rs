use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

/// 建表语句所在文件
pub const SCHEMA_FILE: &str = "sql/01-CREATE_TABLE.sql";

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(conn_url: &str) -> Result<DBPool, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await
}

/// 执行 SQL 文件中的迁移语句
///
/// 将文件内容按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &DBPool, file: &str) -> Result<(), sqlx::Error> {
    let content = std::fs::read_to_string(file)?;

    for sql in content.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}

/// 检查数据库的 `LC_CTYPE` 能否对越南语字符做大小写折叠
///
/// `ILIKE` 按 `LC_CTYPE` 折叠大小写，`C`/`POSIX` 下只处理 ASCII，
/// 此时 `Ế` 与 `ế` 不再匹配，与内存存储的结果不一致。
pub async fn check_ctype(db: &DBPool) -> Result<(), sqlx::Error> {
    let ctype: String = sqlx::query_scalar("SELECT current_setting('lc_ctype')")
        .fetch_one(db)
        .await?;

    if folds_unicode_case(&ctype) {
        tracing::debug!(%ctype, "database ctype");
    } else {
        tracing::warn!(
            %ctype,
            "database ctype only folds ASCII, Vietnamese search is case sensitive"
        );
    }
    Ok(())
}

fn folds_unicode_case(ctype: &str) -> bool {
    !matches!(ctype, "C" | "POSIX")
}
