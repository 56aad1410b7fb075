//! # POST /uploads
//!
//! アップロード用署名付きURL（PUT, 300秒, public-read）の発行。

use broker_types::{UploadUrlRequest, UploadUrlResponse};

use crate::config::GatewayState;
use crate::error::{GatewayError, UPLOAD_SIGNING_FAILED};
use crate::keys::derive_upload_key;

/// POST /uploads — アップロード用署名付きURL発行。
///
/// 署名に失敗した場合、プロバイダのエラー内容はログにのみ残し、
/// クライアントには固定メッセージを返す。
pub async fn handle_uploads(
    state: &GatewayState,
    bucket: &str,
    body: serde_json::Value,
) -> Result<UploadUrlResponse, GatewayError> {
    let request: Option<UploadUrlRequest> = super::parse_payload(body)?;
    let key = derive_upload_key(request.as_ref())?;

    let signed = state
        .issuer
        .issue_upload_url(bucket, &key)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, key = %key, "アップロードURLの署名に失敗");
            GatewayError::Provider(UPLOAD_SIGNING_FAILED.to_string())
        })?;

    tracing::info!(
        bucket = %bucket,
        key = %key,
        expiry_secs = signed.expiry_secs,
        "アップロードURLを発行"
    );

    Ok(UploadUrlResponse {
        upload_url: signed.url,
    })
}
