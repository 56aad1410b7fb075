//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 共有状態は起動後に変更しない（リクエスト間で可変状態を共有しない）。

use crate::error::GatewayError;
use crate::issuer::UrlIssuer;

/// ステージが解決できない場合のメッセージ。
pub const INVALID_ENV: &str = "Invalid env {staging/prod} ";

/// デプロイステージ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Staging,
    Prod,
}

impl Stage {
    /// ステージ変数の値を解釈する。`staging` / `prod` 以外はエラー。
    pub fn parse(value: &str) -> Result<Self, GatewayError> {
        match value {
            "staging" => Ok(Stage::Staging),
            "prod" => Ok(Stage::Prod),
            _ => Err(GatewayError::Configuration(INVALID_ENV.to_string())),
        }
    }
}

/// ステージごとのバケット名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub staging_bucket: String,
    pub prod_bucket: String,
}

impl BucketConfig {
    pub fn resolve(&self, stage: Stage) -> &str {
        match stage {
            Stage::Staging => &self.staging_bucket,
            Stage::Prod => &self.prod_bucket,
        }
    }

    /// ステージ変数の値からバケット名を解決する。
    pub fn resolve_stage(&self, stage: &str) -> Result<&str, GatewayError> {
        Ok(self.resolve(Stage::parse(stage)?))
    }
}

/// S3署名プロバイダの設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// 署名リージョン
    pub region: String,
    /// S3互換ストレージのエンドポイント（未設定ならAWS）
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Gateway設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub buckets: BucketConfig,
    /// デプロイのステージ変数（`x-stage` ヘッダーがない場合に使う）
    pub default_stage: Option<String>,
    pub s3: S3Config,
    pub listen_addr: String,
}

impl GatewayConfig {
    /// 環境変数から構築する。バケット名の2つは必須。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| anyhow::anyhow!("{name}が設定されていません"))
        };

        let buckets = BucketConfig {
            staging_bucket: required("STAGING_BUCKET_NAME")?,
            prod_bucket: required("PROD_BUCKET_NAME")?,
        };

        let s3 = S3Config {
            region: var("S3_REGION").unwrap_or_else(|| "eu-central-1".to_string()),
            endpoint: var("S3_ENDPOINT"),
            access_key: var("S3_ACCESS_KEY"),
            secret_key: var("S3_SECRET_KEY"),
        };

        Ok(Self {
            buckets,
            default_stage: var("ENVIRONMENT"),
            s3,
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    pub buckets: BucketConfig,
    /// ヘッダー未指定時に使うステージ
    pub default_stage: Option<String>,
    /// 署名付きURL発行
    pub issuer: UrlIssuer,
}
