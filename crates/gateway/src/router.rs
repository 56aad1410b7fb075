//! # リクエストルーター
//!
//! 1回の呼び出しを `Invocation` として受け取り、`InvocationResponse` を返す。
//! HTTPランタイムからは独立しており、axumアダプタ（`main.rs`）はこの関数を呼ぶだけ。
//!
//! ## 処理順序
//! 1. OPTIONS（CORSプリフライト）なら即座に200を返す
//! 2. ステージ → バケット解決（不正なら422）
//! 3. ボディをJSONとしてパース（UTF-8やJSONとして不正なら400）
//! 4. 先頭パスセグメントで `uploads` / `download` に分岐（それ以外は422）
//!
//! 全レスポンスにCORSヘッダーを付与する。

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use broker_types::ErrorResponse;
use serde::Serialize;

use crate::config::GatewayState;
use crate::endpoints::{handle_download, handle_uploads};
use crate::error::GatewayError;

/// 1回分の呼び出し。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// HTTPメソッド
    pub method: String,
    /// リクエストパス（例: `/uploads`）
    pub path: String,
    /// ステージ変数（`staging` / `prod`）
    pub stage: Option<String>,
    /// 生のリクエストボディ（UTF-8検証前のバイト列）
    pub body: Option<Vec<u8>>,
}

/// 呼び出し結果のレスポンスエンベロープ。
#[derive(Debug, Clone)]
pub struct InvocationResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// プリフライトではボディなし
    pub body: Option<String>,
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers
}

impl InvocationResponse {
    /// CORSプリフライト応答。
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            headers: cors_headers(),
            body: None,
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => {
                let mut headers = cors_headers();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Self {
                    status,
                    headers,
                    body: Some(body),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "レスポンスのシリアライズに失敗");
                Self::error(&GatewayError::Provider(
                    "Unable to serialize the response.".to_string(),
                ))
            }
        }
    }

    pub fn error(err: &GatewayError) -> Self {
        let body = ErrorResponse {
            message: err.to_string(),
        };
        // ErrorResponseは文字列1つなのでシリアライズは失敗しない
        let body = serde_json::to_string(&body).unwrap_or_else(|_| r#"{"message":""}"#.to_string());

        let mut headers = cors_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status: err.status(),
            headers,
            body: Some(body),
        }
    }
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => body.into_response(),
            None => ().into_response(),
        };
        *response.status_mut() = self.status;
        // Stringのtext/plainは後続のContent-Typeで上書きされる
        response.headers_mut().extend(self.headers);
        response
    }
}

/// パスの先頭セグメント（`/uploads/x` → `uploads`）。
fn route_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or("")
}

/// 呼び出しを処理する。
pub async fn handle(state: &GatewayState, invocation: Invocation) -> InvocationResponse {
    if invocation.method.eq_ignore_ascii_case("OPTIONS") {
        tracing::debug!(path = %invocation.path, "CORSプリフライト");
        return InvocationResponse::preflight();
    }

    match dispatch(state, &invocation).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                path = %invocation.path,
                stage = invocation.stage.as_deref().unwrap_or(""),
                status = err.status().as_u16(),
                error = %err,
                "リクエストを拒否"
            );
            InvocationResponse::error(&err)
        }
    }
}

async fn dispatch(
    state: &GatewayState,
    invocation: &Invocation,
) -> Result<InvocationResponse, GatewayError> {
    let bucket = state
        .buckets
        .resolve_stage(invocation.stage.as_deref().unwrap_or(""))?;

    let body: serde_json::Value = serde_json::from_slice(invocation.body.as_deref().unwrap_or_default())
        .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;

    match route_segment(&invocation.path) {
        "uploads" => {
            let response = handle_uploads(state, bucket, body).await?;
            Ok(InvocationResponse::json(StatusCode::OK, &response))
        }
        "download" => {
            let response = handle_download(state, bucket, body).await?;
            Ok(InvocationResponse::json(StatusCode::OK, &response))
        }
        other => {
            tracing::debug!(segment = %other, "未知のルート");
            Err(GatewayError::UnknownRoute)
        }
    }
}
