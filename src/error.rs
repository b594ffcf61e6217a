use std::io;

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::api::ApiResponse;

pub type Result<T> = core::result::Result<T, Error>;

/// 服务端错误时返回给调用方的通用提示，不包含任何存储细节
const SERVER_ERROR_MESSAGE: &str = "Có lỗi xảy ra, vui lòng thử lại sau";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 请求参数不合法，调用方修正参数后可重试
    #[error("{0}")]
    InvalidRequest(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// 非 sqlx 的存储读取失败（例如内存存储的锁中毒）
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::InvalidRequest(message) => {
                return (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::failure(message)))
                    .into_response();
            }
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::StoreUnavailable(e) => {
                tracing::error!(%e, "store unavailable");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            e @ (Error::Config(_) | Error::Json(_) | Error::Io(_)) => {
                tracing::error!(%e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::<()>::failure(SERVER_ERROR_MESSAGE))).into_response()
    }
}
