//! # Signed URL Broker 共有型定義
//!
//! クライアントとGatewayの間でやり取りされるJSONボディをRust構造体として提供する。
//!
//! ## フィールド命名規則
//! - リクエストのキーは原則snake_case（`upload_type`, `course_uuid` 等）
//! - 例外: ダウンロードリクエストの `fileName` のみcamelCase
//! - レスポンスのキーは `uploadUrl` / `data` / `message`
//!
//! リクエスト型は未検証の値をそのまま保持する（全フィールドOption）。
//! 必須項目の検証とストレージキーの導出はGateway側で行う。

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// POST /uploads
// ---------------------------------------------------------------------------

/// /uploads リクエスト。
///
/// `upload_type` が指定された場合、種別ごとの識別子がすべて必要になる。
/// - `certificate`: `participant_name`, `participant_uuid`, `course_uuid`
/// - `cv`: `jobseeker_name`, `jobseeker_uuid`
/// - `subsidy`: `company_name`, `company_uuid`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadUrlRequest {
    /// ファイル拡張子（ドットなし、例: "png"）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// MIMEタイプ（必須だがサーバー側では参照しない）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    /// アップロード種別 ("certificate" / "cv" / "subsidy")。
    /// 文字列以外の値もパースエラーにせず、Gateway側で未知の種別として扱う。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_type: Option<serde_json::Value>,
    /// 受講者名（certificate）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    /// 受講者UUID（certificate）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_uuid: Option<String>,
    /// コースUUID（certificate）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_uuid: Option<String>,
    /// 求職者名（cv）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobseeker_name: Option<String>,
    /// 求職者UUID（cv）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobseeker_uuid: Option<String>,
    /// 企業名（subsidy）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// 企業UUID（subsidy）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_uuid: Option<String>,
}

/// /uploads レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    /// 署名付きアップロードURL（PUT）
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
}

// ---------------------------------------------------------------------------
// POST /download
// ---------------------------------------------------------------------------

/// /download リクエスト。
///
/// `download_type` が未指定または未知の値の場合は `fileName` + `extension` で
/// オブジェクトを指定する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadUrlRequest {
    /// ダウンロード種別 ("certificate" / "cv" / "subsidy")。
    /// 文字列以外の値はファイル名指定として扱われる。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_type: Option<serde_json::Value>,
    /// ファイル名（拡張子なし）
    #[serde(rename = "fileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// ファイル拡張子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// コースUUID（certificate）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_uuid: Option<String>,
    /// `CVs/` 配下のパス（cv）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_path: Option<String>,
    /// `subsidy/` 配下のパス（subsidy）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsidy_path: Option<String>,
}

/// /download レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadUrlResponse {
    /// 署名付きダウンロードURL（GET）
    pub data: String,
}

// ---------------------------------------------------------------------------
// エラー
// ---------------------------------------------------------------------------

/// エラーレスポンス。失敗時にボディへ書き込まれる唯一の形式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_missing_fields_default_to_none() {
        let req: UploadUrlRequest =
            serde_json::from_str(r#"{"extension":"png","mime":"image/png"}"#).unwrap();
        assert_eq!(req.extension.as_deref(), Some("png"));
        assert_eq!(req.mime.as_deref(), Some("image/png"));
        assert!(req.upload_type.is_none());
        assert!(req.course_uuid.is_none());
    }

    #[test]
    fn test_upload_request_ignores_unknown_fields() {
        let req: UploadUrlRequest =
            serde_json::from_str(r#"{"extension":"pdf","mime":"application/pdf","size":10}"#)
                .unwrap();
        assert_eq!(req.extension.as_deref(), Some("pdf"));
    }

    /// 種別フィールドは文字列以外でもパースに失敗しない
    #[test]
    fn test_type_discriminators_accept_any_json() {
        let upload: UploadUrlRequest =
            serde_json::from_str(r#"{"extension":"png","mime":"image/png","upload_type":7}"#)
                .unwrap();
        assert_eq!(upload.upload_type, Some(serde_json::json!(7)));

        let download: DownloadUrlRequest =
            serde_json::from_str(r#"{"download_type":["cv"],"fileName":"abc","extension":"jpg"}"#)
                .unwrap();
        assert_eq!(download.download_type, Some(serde_json::json!(["cv"])));
    }

    /// fileNameのみcamelCaseで受け付ける
    #[test]
    fn test_download_request_file_name_is_camel_case() {
        let req: DownloadUrlRequest =
            serde_json::from_str(r#"{"fileName":"report","extension":"pdf"}"#).unwrap();
        assert_eq!(req.file_name.as_deref(), Some("report"));

        let snake: DownloadUrlRequest =
            serde_json::from_str(r#"{"file_name":"report","extension":"pdf"}"#).unwrap();
        assert!(snake.file_name.is_none());
    }

    #[test]
    fn test_response_field_names() {
        let upload = serde_json::to_value(UploadUrlResponse {
            upload_url: "https://example.com/put".to_string(),
        })
        .unwrap();
        assert_eq!(upload, serde_json::json!({"uploadUrl": "https://example.com/put"}));

        let download = serde_json::to_value(DownloadUrlResponse {
            data: "https://example.com/get".to_string(),
        })
        .unwrap();
        assert_eq!(download, serde_json::json!({"data": "https://example.com/get"}));

        let error = serde_json::to_value(ErrorResponse {
            message: "Invalid env".to_string(),
        })
        .unwrap();
        assert_eq!(error, serde_json::json!({"message": "Invalid env"}));
    }
}
