//! # オブジェクトストレージ署名
//!
//! 署名付きURLを発行するストレージプロバイダの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use s3::S3Signer;

/// 署名対象の操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// アップロード（PUT）
    PutObject,
    /// ダウンロード（GET）
    GetObject,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::PutObject => "putObject",
            Operation::GetObject => "getObject",
        }
    }
}

/// オブジェクトに付与する既定ACL。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedAcl {
    /// アップロード直後から誰でも取得可能
    PublicRead,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::PublicRead => "public-read",
        }
    }
}

/// 署名付きURL生成リクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest<'a> {
    pub operation: Operation,
    pub bucket: &'a str,
    pub key: &'a str,
    pub expiry_secs: u32,
    pub acl: Option<CannedAcl>,
}

/// プロバイダ側の署名失敗。
#[derive(Debug, thiserror::Error)]
#[error("{operation}の署名付きURL生成に失敗: {reason}")]
pub struct StorageError {
    pub operation: &'static str,
    pub reason: String,
}

/// 署名付きURLを生成するストレージプロバイダ。
///
/// 署名自体はローカル計算だが、キー不正や設定不備で失敗しうる。
/// 運用者はAWS S3のほか MinIO, Cloudflare R2 等のS3互換実装を選択できる。
#[async_trait::async_trait]
pub trait ObjectSigner: Send + Sync {
    async fn sign(&self, request: SignRequest<'_>) -> Result<String, StorageError>;
}
