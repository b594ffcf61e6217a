use std::env;

use crate::error::{Error, Result};

/// 日志过滤规则所在的环境变量
pub const LOG_ENV: &str = "TINTUC_LOG";

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// 运行配置，从环境变量读取
///
/// - `DATABASE_URL`：数据库连接 URL，必填
/// - `TINTUC_ADDR`：HTTP 监听地址，默认 `0.0.0.0:3000`
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("环境变量 `DATABASE_URL` 未设置".to_string()))?;

        let listen_addr = lookup("TINTUC_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        Ok(Self {
            database_url,
            listen_addr,
        })
    }
}
