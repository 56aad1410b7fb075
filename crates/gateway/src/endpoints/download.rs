//! # POST /download
//!
//! ダウンロード用署名付きURL（GET, 7日間）の発行。

use broker_types::{DownloadUrlRequest, DownloadUrlResponse};

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::keys::derive_download_key;

/// POST /download — ダウンロード用署名付きURL発行。
///
/// アップロードと異なり、署名失敗時はプロバイダのエラー内容をそのままクライアントに返す。
pub async fn handle_download(
    state: &GatewayState,
    bucket: &str,
    body: serde_json::Value,
) -> Result<DownloadUrlResponse, GatewayError> {
    let request: Option<DownloadUrlRequest> = super::parse_payload(body)?;
    let key = derive_download_key(request.as_ref())?;

    let signed = state
        .issuer
        .issue_download_url(bucket, &key)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, key = %key, "ダウンロードURLの署名に失敗");
            GatewayError::Provider(e.to_string())
        })?;

    tracing::info!(
        bucket = %bucket,
        key = %key,
        expiry_secs = signed.expiry_secs,
        "ダウンロードURLを発行"
    );

    Ok(DownloadUrlResponse { data: signed.url })
}
