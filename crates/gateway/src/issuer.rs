//! # 署名付きURL発行
//!
//! 操作ごとの署名条件（有効期限・ACL）を固定し、ストレージプロバイダに署名を依頼する。
//!
//! | 操作 | 有効期限 | ACL |
//! |---|---|---|
//! | upload (`putObject`) | 300秒 | public-read |
//! | download (`getObject`) | 604800秒（7日） | なし |

use crate::keys::StorageKey;
use crate::storage::{CannedAcl, ObjectSigner, Operation, SignRequest, StorageError};

/// アップロードURLの有効期限（秒）。
pub const UPLOAD_EXPIRY_SECS: u32 = 300;

/// ダウンロードURLの有効期限（秒）。
pub const DOWNLOAD_EXPIRY_SECS: u32 = 604_800;

/// 発行結果。レスポンスに載せた時点で破棄される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expiry_secs: u32,
}

pub struct UrlIssuer {
    signer: Box<dyn ObjectSigner>,
}

impl UrlIssuer {
    pub fn new(signer: Box<dyn ObjectSigner>) -> Self {
        Self { signer }
    }

    /// アップロード用URLを発行する。アップロードされたオブジェクトは即時に公開読み取り可能になる。
    pub async fn issue_upload_url(
        &self,
        bucket: &str,
        key: &StorageKey,
    ) -> Result<SignedUrl, StorageError> {
        self.issue(Operation::PutObject, bucket, key, UPLOAD_EXPIRY_SECS, Some(CannedAcl::PublicRead))
            .await
    }

    /// ダウンロード用URLを発行する。
    pub async fn issue_download_url(
        &self,
        bucket: &str,
        key: &StorageKey,
    ) -> Result<SignedUrl, StorageError> {
        self.issue(Operation::GetObject, bucket, key, DOWNLOAD_EXPIRY_SECS, None)
            .await
    }

    async fn issue(
        &self,
        operation: Operation,
        bucket: &str,
        key: &StorageKey,
        expiry_secs: u32,
        acl: Option<CannedAcl>,
    ) -> Result<SignedUrl, StorageError> {
        let url = self
            .signer
            .sign(SignRequest {
                operation,
                bucket,
                key: key.as_str(),
                expiry_secs,
                acl,
            })
            .await?;

        Ok(SignedUrl { url, expiry_secs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_download_key;
    use crate::test_helpers::{failing_state, test_state, PROD_BUCKET};
    use broker_types::DownloadUrlRequest;

    fn key(name: &str) -> StorageKey {
        derive_download_key(Some(&DownloadUrlRequest {
            file_name: Some(name.to_string()),
            extension: Some("pdf".to_string()),
            ..Default::default()
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_url_parameters() {
        let (state, calls) = test_state();
        let signed = state
            .issuer
            .issue_upload_url(PROD_BUCKET, &key("report"))
            .await
            .unwrap();

        assert_eq!(signed.expiry_secs, UPLOAD_EXPIRY_SECS);
        assert!(signed.url.contains("report.pdf"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, Operation::PutObject);
        assert_eq!(calls[0].bucket, PROD_BUCKET);
        assert_eq!(calls[0].key, "report.pdf");
        assert_eq!(calls[0].expiry_secs, 300);
        assert_eq!(calls[0].acl, Some(CannedAcl::PublicRead));
    }

    #[tokio::test]
    async fn test_download_url_parameters() {
        let (state, calls) = test_state();
        let signed = state
            .issuer
            .issue_download_url(PROD_BUCKET, &key("report"))
            .await
            .unwrap();

        assert_eq!(signed.expiry_secs, DOWNLOAD_EXPIRY_SECS);

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].operation, Operation::GetObject);
        assert_eq!(calls[0].expiry_secs, 7 * 24 * 60 * 60);
        assert_eq!(calls[0].acl, None);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let (state, _) = failing_state("bucket misconfigured");
        let err = state
            .issuer
            .issue_download_url(PROD_BUCKET, &key("report"))
            .await
            .unwrap_err();
        assert_eq!(err.operation, "getObject");
        assert!(err.to_string().contains("bucket misconfigured"));
    }
}
