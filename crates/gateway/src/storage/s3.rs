//! # S3互換ストレージ署名実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIに対するSigV4署名付きURLを生成する。
//! バケット名はリクエストごとに決まる（ステージで切り替わる）ため、
//! リージョンと認証情報だけを保持し、署名のたびに `s3::Bucket` を組み立てる。
//!
//! ## 認証情報
//! - アクセスキー指定: 静的な認証情報をそのまま使い続ける
//! - 未指定: 既定の認証情報チェーン（環境変数・プロファイル・ロール）から解決する。
//!   STS等の一時認証情報は失効するため、失効前に署名時点で再解決する

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use s3::creds::Credentials;
use tokio::sync::RwLock;

use super::{ObjectSigner, Operation, SignRequest, StorageError};
use crate::config::S3Config;

/// ACLを署名付きURLのクエリに載せる際のキー。
/// ヘッダーではなくクエリに載せることで、クライアントはURLだけでPUTできる。
const ACL_QUERY_KEY: &str = "x-amz-acl";

/// 失効までの残りがこの秒数を下回った認証情報は再解決する。
const REFRESH_MARGIN_SECS: i64 = 300;

/// 解決済みの認証情報と失効時刻。
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    /// 失効時刻（UNIX秒）。静的キーなど失効しないものは `None`
    pub expires_at: Option<i64>,
}

impl ResolvedCredentials {
    fn from_credentials(credentials: Credentials) -> Self {
        let expires_at = credentials
            .expiration
            .as_ref()
            .map(|expiration| expiration.0.unix_timestamp());
        Self {
            credentials,
            expires_at,
        }
    }

    fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - REFRESH_MARGIN_SECS <= now)
    }
}

/// 認証情報を解決する関数。インスタンスメタデータへの問い合わせ等のブロッキングI/Oを伴う。
pub type CredentialResolver = Arc<dyn Fn() -> anyhow::Result<ResolvedCredentials> + Send + Sync>;

/// 既定の認証情報チェーンから解決する。
fn resolve_from_chain() -> anyhow::Result<ResolvedCredentials> {
    let credentials = Credentials::new(None, None, None, None, None)?;
    Ok(ResolvedCredentials::from_credentials(credentials))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// S3互換ストレージによる署名実装。
pub struct S3Signer {
    region: s3::Region,
    credentials: RwLock<ResolvedCredentials>,
    /// 再解決に使う関数。静的キーの場合は `None`
    resolver: Option<CredentialResolver>,
    /// カスタムエンドポイント（MinIO等）ではパススタイルでアクセスする
    path_style: bool,
}

impl S3Signer {
    /// 静的な認証情報で構築する。
    pub fn new(region: s3::Region, credentials: Credentials, path_style: bool) -> Self {
        Self {
            region,
            credentials: RwLock::new(ResolvedCredentials::from_credentials(credentials)),
            resolver: None,
            path_style,
        }
    }

    /// 失効時に `resolver` で再解決する認証情報で構築する。初回の解決はここで行う。
    pub fn with_resolver(
        region: s3::Region,
        path_style: bool,
        resolver: CredentialResolver,
    ) -> anyhow::Result<Self> {
        let initial = resolver()?;
        Ok(Self {
            region,
            credentials: RwLock::new(initial),
            resolver: Some(resolver),
            path_style,
        })
    }

    /// 設定から構築する。
    ///
    /// アクセスキーが未設定の場合は環境変数・プロファイル・ロール等の
    /// 既定の認証情報チェーンから解決する。
    pub fn from_config(config: &S3Config) -> anyhow::Result<Self> {
        let (region, path_style) = match &config.endpoint {
            Some(endpoint) => (
                s3::Region::Custom {
                    region: config.region.clone(),
                    endpoint: endpoint.clone(),
                },
                true,
            ),
            None => (config.region.parse::<s3::Region>()?, false),
        };

        let signer = match (config.access_key.as_deref(), config.secret_key.as_deref()) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(Some(access_key), Some(secret_key), None, None, None)?;
                Self::new(region, credentials, path_style)
            }
            _ => Self::with_resolver(region, path_style, Arc::new(resolve_from_chain))?,
        };

        tracing::info!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            path_style,
            refreshable = signer.resolver.is_some(),
            "S3署名プロバイダを初期化"
        );

        Ok(signer)
    }

    /// 署名に使う認証情報。失効済みまたは失効間近なら再解決してから返す。
    async fn current_credentials(&self) -> anyhow::Result<Credentials> {
        {
            let cached = self.credentials.read().await;
            if !cached.needs_refresh(unix_now()) {
                return Ok(cached.credentials.clone());
            }
        }

        let Some(resolver) = self.resolver.clone() else {
            return Ok(self.credentials.read().await.credentials.clone());
        };

        let mut cached = self.credentials.write().await;
        // 書き込みロック待ちの間に他のリクエストが更新済みの場合
        if !cached.needs_refresh(unix_now()) {
            return Ok(cached.credentials.clone());
        }

        let refreshed = tokio::task::spawn_blocking(move || resolver()).await??;
        tracing::info!(expires_at = ?refreshed.expires_at, "S3認証情報を再解決");
        *cached = refreshed;
        Ok(cached.credentials.clone())
    }

    fn bucket(
        &self,
        name: &str,
        credentials: Credentials,
    ) -> Result<Box<s3::Bucket>, s3::error::S3Error> {
        let bucket = s3::Bucket::new(name, self.region.clone(), credentials)?;
        if self.path_style {
            Ok(bucket.with_path_style())
        } else {
            Ok(bucket)
        }
    }
}

#[async_trait::async_trait]
impl ObjectSigner for S3Signer {
    async fn sign(&self, request: SignRequest<'_>) -> Result<String, StorageError> {
        let operation = request.operation.as_str();
        let to_error = |e: s3::error::S3Error| StorageError {
            operation,
            reason: e.to_string(),
        };

        let credentials = self.current_credentials().await.map_err(|e| {
            tracing::error!(error = %e, "S3認証情報の再解決に失敗");
            StorageError {
                operation,
                reason: e.to_string(),
            }
        })?;
        let bucket = self.bucket(request.bucket, credentials).map_err(to_error)?;

        let queries = request.acl.map(|acl| {
            HashMap::from([(ACL_QUERY_KEY.to_string(), acl.as_str().to_string())])
        });

        match request.operation {
            Operation::PutObject => bucket
                .presign_put(request.key, request.expiry_secs, None, queries)
                .await
                .map_err(to_error),
            Operation::GetObject => bucket
                .presign_get(request.key, request.expiry_secs, queries)
                .await
                .map_err(to_error),
        }
    }
}
