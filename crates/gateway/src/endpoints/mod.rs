//! # Gatewayルート
//!
//! 先頭パスセグメントごとの処理。
//! - `uploads`: アップロード用署名付きURL発行
//! - `download`: ダウンロード用署名付きURL発行

pub mod download;
pub mod uploads;

pub use download::handle_download;
pub use uploads::handle_uploads;

use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// パース済みJSONボディをリクエスト型へ変換する。
/// JSON `null` は `None`（必須項目欠落として後段で検証エラーになる）。
pub(crate) fn parse_payload<T: DeserializeOwned>(
    body: serde_json::Value,
) -> Result<Option<T>, GatewayError> {
    serde_json::from_value(body).map_err(|e| GatewayError::MalformedPayload(e.to_string()))
}
