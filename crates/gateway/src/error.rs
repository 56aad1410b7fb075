//! # Gateway エラー型
//!
//! 全ルートで共通のエラー型とHTTPステータスへの対応付け。
//! 失敗時にクライアントへ返すのは `message` 文字列のみ。

use axum::http::StatusCode;

/// アップロード経路で署名付きURL生成に失敗した場合の固定メッセージ。
pub const UPLOAD_SIGNING_FAILED: &str = "Unable to create the signed URL.";

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// リクエストの必須項目が欠落・不正
    #[error("{0}")]
    Validation(String),
    /// ステージからバケットを解決できない
    #[error("{0}")]
    Configuration(String),
    /// ボディがJSONとして解釈できない
    #[error("Malformed request body: {0}")]
    MalformedPayload(String),
    /// パスの先頭セグメントが uploads / download のいずれでもない
    #[error("Invalid url path {{uploads/download }}")]
    UnknownRoute,
    /// 署名付きURL生成に失敗
    #[error("{0}")]
    Provider(String),
}

impl GatewayError {
    /// エラー種別に対応するHTTPステータス。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_)
            | GatewayError::Configuration(_)
            | GatewayError::UnknownRoute => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            GatewayError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::Configuration("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::UnknownRoute.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::MalformedPayload("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Provider("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_route_message() {
        let err = GatewayError::UnknownRoute;
        assert_eq!(err.to_string(), "Invalid url path {uploads/download }");
    }
}
