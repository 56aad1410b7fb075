//! # テスト用共通ヘルパー
//!
//! ストレージへ接続せずに署名呼び出しを記録するモックと、それを使うGatewayState。

use std::sync::{Arc, Mutex};

use crate::config::{BucketConfig, GatewayState};
use crate::issuer::UrlIssuer;
use crate::storage::{CannedAcl, ObjectSigner, Operation, SignRequest, StorageError};

pub const STAGING_BUCKET: &str = "files-staging";
pub const PROD_BUCKET: &str = "files-prod";

/// モックが受け取った署名リクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSign {
    pub operation: Operation,
    pub bucket: String,
    pub key: String,
    pub expiry_secs: u32,
    pub acl: Option<CannedAcl>,
}

pub type SignLog = Arc<Mutex<Vec<RecordedSign>>>;

/// 呼び出しを記録し、ダミーの署名付きURLを返すモック。
/// `failure` が設定されている場合は常にその理由で失敗する。
pub struct MockSigner {
    calls: SignLog,
    failure: Option<String>,
}

#[async_trait::async_trait]
impl ObjectSigner for MockSigner {
    async fn sign(&self, request: SignRequest<'_>) -> Result<String, StorageError> {
        self.calls.lock().unwrap().push(RecordedSign {
            operation: request.operation,
            bucket: request.bucket.to_string(),
            key: request.key.to_string(),
            expiry_secs: request.expiry_secs,
            acl: request.acl,
        });

        if let Some(reason) = &self.failure {
            return Err(StorageError {
                operation: request.operation.as_str(),
                reason: reason.clone(),
            });
        }

        Ok(format!(
            "https://{}.s3.mock/{}?op={}&X-Amz-Expires={}",
            request.bucket,
            request.key,
            request.operation.as_str(),
            request.expiry_secs
        ))
    }
}

fn build_state(
    failure: Option<String>,
    default_stage: Option<String>,
) -> (Arc<GatewayState>, SignLog) {
    let calls = SignLog::default();
    let signer = MockSigner {
        calls: calls.clone(),
        failure,
    };
    let state = Arc::new(GatewayState {
        buckets: BucketConfig {
            staging_bucket: STAGING_BUCKET.to_string(),
            prod_bucket: PROD_BUCKET.to_string(),
        },
        default_stage,
        issuer: UrlIssuer::new(Box::new(signer)),
    });
    (state, calls)
}

/// 常に署名に成功するGatewayState。
pub fn test_state() -> (Arc<GatewayState>, SignLog) {
    build_state(None, None)
}

/// 常に署名に失敗するGatewayState。
pub fn failing_state(reason: &str) -> (Arc<GatewayState>, SignLog) {
    build_state(Some(reason.to_string()), None)
}

/// ステージ変数が設定されたデプロイを想定したGatewayState。
pub fn test_state_with_default_stage(stage: &str) -> (Arc<GatewayState>, SignLog) {
    build_state(None, Some(stage.to_string()))
}
