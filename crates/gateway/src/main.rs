//! # Signed URL Broker Gateway
//!
//! オブジェクトストレージへの一時的なアクセスを仲介するGateway。
//! オブジェクト本体は中継せず、署名付きURLだけを発行する。
//!
//! ## 役割
//! - ステージ（staging / prod）によるバケット選択
//! - 業務ごとの命名規則に従ったストレージキーの導出
//! - アップロード（PUT）/ダウンロード（GET）用署名付きURLの発行
//! - CORSヘッダー付きのJSONレスポンス整形
//!
//! ## API エンドポイント
//! - `POST /uploads` — アップロード用署名付きURL発行（300秒, public-read）
//! - `POST /download` — ダウンロード用署名付きURL発行（7日）
//! - `OPTIONS *` — CORSプリフライト
//!
//! ステージは `x-stage` ヘッダー、なければ環境変数 `ENVIRONMENT` から取る。

mod config;
mod endpoints;
mod error;
mod identifier;
mod issuer;
mod keys;
mod router;
mod storage;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};

use crate::config::{GatewayConfig, GatewayState, Stage};
use crate::issuer::UrlIssuer;
use crate::router::{Invocation, InvocationResponse};
use crate::storage::S3Signer;

/// リクエストごとにステージを指定するヘッダー。
const STAGE_HEADER: &str = "x-stage";

/// 全パス・全メソッドを受け付け、`router::handle` に委譲する。
async fn handle_any(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> InvocationResponse {
    let stage = headers
        .get(STAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| state.default_stage.clone());

    let body = (!body.is_empty()).then(|| body.to_vec());

    let invocation = Invocation {
        method: method.to_string(),
        path: uri.path().to_string(),
        stage,
        body,
    };
    router::handle(&state, invocation).await
}

fn app(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new().fallback(handle_any).with_state(state)
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;

    match config.default_stage.as_deref() {
        Some(stage) if Stage::parse(stage).is_err() => tracing::warn!(
            stage = %stage,
            "ENVIRONMENTが staging / prod のいずれでもありません。x-stageヘッダーのないリクエストは422になります"
        ),
        Some(stage) => tracing::info!(stage = %stage, "デフォルトステージ"),
        None => tracing::warn!("ENVIRONMENTが未設定です。リクエストごとにx-stageヘッダーが必要です"),
    }
    tracing::info!(
        staging_bucket = %config.buckets.staging_bucket,
        prod_bucket = %config.buckets.prod_bucket,
        "バケット設定"
    );

    let signer = S3Signer::from_config(&config.s3)?;

    let state = Arc::new(GatewayState {
        buckets: config.buckets,
        default_stage: config.default_stage,
        issuer: UrlIssuer::new(Box::new(signer)),
    });

    tracing::info!("Gatewayを {} で起動します", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
