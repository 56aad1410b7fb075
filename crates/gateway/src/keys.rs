//! # ストレージキー導出
//!
//! 未検証のリクエストボディを種別ごとの閉じた列挙型へ変換し、
//! そこからバケット内のオブジェクトキーを決定的に導出する。
//!
//! ## キー規則
//! | 操作 | 種別 | キー |
//! |---|---|---|
//! | upload | なし | `{ランダム識別子}.{extension}` |
//! | upload | certificate | `certificates/{course_uuid}/{participant_name}{participant_uuid}.{extension}` |
//! | upload | cv | `CVs/{jobseeker_name}{jobseeker_uuid}.{extension}` |
//! | upload | subsidy | `subsidy/{company_name}{company_uuid}.{extension}` |
//! | download | なし/未知 | `{fileName}.{extension}` |
//! | download | certificate | `certificates/{course_uuid}`（プレフィックス） |
//! | download | cv | `CVs/{cv_path}` |
//! | download | subsidy | `subsidy/{subsidy_path}` |
//!
//! 名前とUUIDは区切り文字なしで連結する（既存オブジェクトとの互換のため変更しない）。

use std::fmt;

use broker_types::{DownloadUrlRequest, UploadUrlRequest};

use crate::error::GatewayError;
use crate::identifier::{new_identifier, DEFAULT_UNITS};

const MISSING_EXTENSION_MIME: &str = r#"Request must include "extension","mime" and properties."#;
const MISSING_CERTIFICATE_FIELDS: &str = r#"Request must include "course_uuid", "upload_type", "participant_uuid" and "participant_name" properties."#;
const MISSING_CV_FIELDS: &str =
    r#"Request must include "upload_type", "jobseeker_name" and "jobseeker_uuid" properties."#;
const MISSING_SUBSIDY_FIELDS: &str =
    r#"Request must include "upload_type", "company_name" and "company_uuid" properties."#;
const MISSING_FILE_NAME: &str = r#"Request must include "extension" and "fileName" properties."#;
const MISSING_COURSE_UUID: &str = r#"Request must include "course_uuid" properties."#;

/// バケット内のオブジェクトキー。このモジュールの導出関数からのみ生成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 空文字列を未指定として扱う。
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `upload_type` / `download_type` の値の分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag<'a> {
    /// 未指定、または null / false / 0 / 空文字列
    Absent,
    Text(&'a str),
    /// 文字列以外の値（数値・配列・オブジェクト・true）
    NonText,
}

fn type_tag(value: &Option<serde_json::Value>) -> TypeTag<'_> {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => TypeTag::Absent,
        Some(Value::String(s)) if s.is_empty() => TypeTag::Absent,
        Some(Value::String(s)) => TypeTag::Text(s),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => TypeTag::Absent,
        Some(_) => TypeTag::NonText,
    }
}

fn unrecognized_upload_type(shown: &str) -> GatewayError {
    GatewayError::Validation(format!(
        "Request has an unrecognized upload_type {shown}; expected certificate, cv or subsidy."
    ))
}

fn require(value: &Option<String>, message: &str) -> Result<String, GatewayError> {
    present(value)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Validation(message.to_string()))
}

// ---------------------------------------------------------------------------
// アップロード
// ---------------------------------------------------------------------------

/// アップロード種別と、その種別が必要とする識別子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// 種別指定なし。ランダム識別子でキーを作る。
    Unnamed,
    Certificate {
        participant_name: String,
        participant_uuid: String,
        course_uuid: String,
    },
    Cv {
        jobseeker_name: String,
        jobseeker_uuid: String,
    },
    Subsidy {
        company_name: String,
        company_uuid: String,
    },
}

/// 検証済みアップロードリクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub extension: String,
    pub target: UploadTarget,
}

impl ValidatedUpload {
    /// リクエストボディを検証する。ボディがJSON `null` の場合は `None` を渡す。
    pub fn parse(body: Option<&UploadUrlRequest>) -> Result<Self, GatewayError> {
        let body = body.ok_or_else(|| GatewayError::Validation(MISSING_EXTENSION_MIME.to_string()))?;

        let extension = require(&body.extension, MISSING_EXTENSION_MIME)?;
        // mimeは署名条件に含めないが、必須項目として存在だけ確認する
        require(&body.mime, MISSING_EXTENSION_MIME)?;

        let target = match type_tag(&body.upload_type) {
            TypeTag::Absent => UploadTarget::Unnamed,
            TypeTag::Text("certificate") => UploadTarget::Certificate {
                participant_name: require(&body.participant_name, MISSING_CERTIFICATE_FIELDS)?,
                participant_uuid: require(&body.participant_uuid, MISSING_CERTIFICATE_FIELDS)?,
                course_uuid: require(&body.course_uuid, MISSING_CERTIFICATE_FIELDS)?,
            },
            TypeTag::Text("cv") => UploadTarget::Cv {
                jobseeker_name: require(&body.jobseeker_name, MISSING_CV_FIELDS)?,
                jobseeker_uuid: require(&body.jobseeker_uuid, MISSING_CV_FIELDS)?,
            },
            TypeTag::Text("subsidy") => UploadTarget::Subsidy {
                company_name: require(&body.company_name, MISSING_SUBSIDY_FIELDS)?,
                company_uuid: require(&body.company_uuid, MISSING_SUBSIDY_FIELDS)?,
            },
            TypeTag::Text(other) => return Err(unrecognized_upload_type(&format!("\"{other}\""))),
            TypeTag::NonText => {
                let shown = body
                    .upload_type
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                return Err(unrecognized_upload_type(&shown));
            }
        };

        Ok(Self { extension, target })
    }

    /// オブジェクトキーを導出する。`Unnamed` の場合は呼び出しごとに異なるキーになる。
    pub fn storage_key(&self) -> StorageKey {
        let ext = &self.extension;
        let key = match &self.target {
            UploadTarget::Unnamed => format!("{}.{ext}", new_identifier(DEFAULT_UNITS)),
            UploadTarget::Certificate {
                participant_name,
                participant_uuid,
                course_uuid,
            } => format!("certificates/{course_uuid}/{participant_name}{participant_uuid}.{ext}"),
            UploadTarget::Cv {
                jobseeker_name,
                jobseeker_uuid,
            } => format!("CVs/{jobseeker_name}{jobseeker_uuid}.{ext}"),
            UploadTarget::Subsidy {
                company_name,
                company_uuid,
            } => format!("subsidy/{company_name}{company_uuid}.{ext}"),
        };
        StorageKey(key)
    }
}

/// アップロード用キーを導出する。
pub fn derive_upload_key(body: Option<&UploadUrlRequest>) -> Result<StorageKey, GatewayError> {
    Ok(ValidatedUpload::parse(body)?.storage_key())
}

// ---------------------------------------------------------------------------
// ダウンロード
// ---------------------------------------------------------------------------

/// ダウンロード対象。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// `download_type` が未指定、未知の文字列、または文字列以外
    Named { file_name: String, extension: String },
    /// コース単位の証明書フォルダ（単一オブジェクトではなくプレフィックス）
    CertificateFolder { course_uuid: String },
    /// `cv_path` は検証せずそのまま使う。未指定は空文字列。
    Cv { path: String },
    /// `subsidy_path` は検証せずそのまま使う。未指定は空文字列。
    Subsidy { path: String },
}

impl DownloadTarget {
    /// リクエストボディを検証する。ボディがJSON `null` の場合は `None` を渡す。
    pub fn parse(body: Option<&DownloadUrlRequest>) -> Result<Self, GatewayError> {
        let Some(body) = body else {
            return Err(GatewayError::Validation(MISSING_FILE_NAME.to_string()));
        };

        // TODO: cv_path / subsidy_path に "../" 等が含まれてもそのまま通る。許可する文字種を決めて検証を追加する。
        match type_tag(&body.download_type) {
            TypeTag::Text("certificate") => Ok(DownloadTarget::CertificateFolder {
                course_uuid: require(&body.course_uuid, MISSING_COURSE_UUID)?,
            }),
            TypeTag::Text("cv") => Ok(DownloadTarget::Cv {
                path: body.cv_path.clone().unwrap_or_default(),
            }),
            TypeTag::Text("subsidy") => Ok(DownloadTarget::Subsidy {
                path: body.subsidy_path.clone().unwrap_or_default(),
            }),
            _ => Ok(DownloadTarget::Named {
                file_name: require(&body.file_name, MISSING_FILE_NAME)?,
                extension: require(&body.extension, MISSING_FILE_NAME)?,
            }),
        }
    }

    pub fn storage_key(&self) -> StorageKey {
        let key = match self {
            DownloadTarget::Named {
                file_name,
                extension,
            } => format!("{file_name}.{extension}"),
            DownloadTarget::CertificateFolder { course_uuid } => format!("certificates/{course_uuid}"),
            DownloadTarget::Cv { path } => format!("CVs/{path}"),
            DownloadTarget::Subsidy { path } => format!("subsidy/{path}"),
        };
        StorageKey(key)
    }
}

/// ダウンロード用キーを導出する。
pub fn derive_download_key(body: Option<&DownloadUrlRequest>) -> Result<StorageKey, GatewayError> {
    Ok(DownloadTarget::parse(body)?.storage_key())
}
