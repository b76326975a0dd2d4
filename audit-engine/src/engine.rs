use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crypto::KekChain;
use secrets_core::context::RequestContext;
use secrets_core::error::{CoreError, CoreResult, ErrorKind};
use secrets_core::new_id;
use serde_json::Value;
use uuid::Uuid;

use crate::model::AuditLog;
use crate::repository::AuditLogRepository;
use crate::signer;

/// Outcome of verifying one record's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Valid,
    Invalid,
    /// Legacy (unsigned) record — not a failure of integrity, a distinct kind.
    SignatureMissing,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total_checked: usize,
    pub signed_count: usize,
    pub unsigned_count: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub invalid_ids: Vec<Uuid>,
}

/// `AuditLogService` — create, verify, and batch-verify tamper-evident
/// records (design spec §4.10). Best-effort: a signing failure at creation
/// degrades to a legacy record rather than failing the enclosing request
/// (§4's failure semantics table: "Audit signing failure ... no[t fatal]").
pub struct AuditLogService {
    repository: Arc<dyn AuditLogRepository>,
    kek_chain: Arc<KekChain>,
}

impl AuditLogService {
    pub fn new(repository: Arc<dyn AuditLogRepository>, kek_chain: Arc<KekChain>) -> Self {
        Self {
            repository,
            kek_chain,
        }
    }

    /// Signs with the active KEK when available; otherwise persists a
    /// legacy record. Takes the caller's `RequestContext` rather than loose
    /// `request_id`/`client_id` params so the record always reflects the
    /// request it was raised for (design spec §5: "thread it explicitly").
    pub async fn create(
        &self,
        ctx: &RequestContext,
        capability: &str,
        path: &str,
        metadata: BTreeMap<String, Value>,
    ) -> CoreResult<AuditLog> {
        let request_id = ctx.request_id;
        let client_id = ctx
            .client_id
            .ok_or_else(|| CoreError::invalid_input("audit log requires an authenticated client"))?;
        let id = new_id();
        let created_at = Utc::now();

        let (kek_id, signature, is_signed) =
            match self.try_sign(id, request_id, client_id, capability, path, created_at, &metadata).await {
                Ok((kek_id, signature)) => (Some(kek_id), signature.to_vec(), true),
                Err(_) => (None, Vec::new(), false),
            };

        let log = AuditLog {
            id,
            request_id,
            client_id,
            capability: capability.to_string(),
            path: path.to_string(),
            metadata,
            signature,
            kek_id,
            is_signed,
            created_at,
        };
        self.repository.insert(log.clone()).await?;
        Ok(log)
    }

    #[allow(clippy::too_many_arguments)]
    async fn try_sign(
        &self,
        id: Uuid,
        request_id: Uuid,
        client_id: Uuid,
        capability: &str,
        path: &str,
        created_at: DateTime<Utc>,
        metadata: &BTreeMap<String, Value>,
    ) -> CoreResult<(Uuid, [u8; 32])> {
        let (kek, kek_plain) = self.kek_chain.unwrap_active().await?;
        let signing_key = signer::derive_signing_key(&kek_plain)?;
        let record = signer::canonical_record(
            id,
            request_id,
            client_id,
            capability,
            path,
            &created_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            metadata,
        )?;
        let signature = signer::sign(&signing_key, &record)?;
        Ok((kek.id, signature))
    }

    /// Legacy records fail with `ErrorKind::SignatureMissing` — a distinct
    /// kind, not an integrity failure. Signed records recompute the
    /// canonical record under the KEK named by `kek_id` and
    /// constant-time-compare against the stored signature, failing with
    /// `ErrorKind::SignatureInvalid` on mismatch.
    pub async fn verify_integrity(&self, log_id: Uuid) -> CoreResult<()> {
        let log = self
            .repository
            .get_by_id(log_id)
            .await?
            .ok_or_else(|| CoreError::not_found("audit log not found"))?;
        match self.verify_one(&log).await? {
            VerifyOutcome::Valid => Ok(()),
            VerifyOutcome::SignatureMissing => Err(CoreError::new(
                ErrorKind::SignatureMissing,
                "audit log is a legacy unsigned record",
            )),
            VerifyOutcome::Invalid => Err(CoreError::new(
                ErrorKind::SignatureInvalid,
                "audit log signature does not match its contents",
            )),
        }
    }

    async fn verify_one(&self, log: &AuditLog) -> CoreResult<VerifyOutcome> {
        if log.is_legacy() {
            return Ok(VerifyOutcome::SignatureMissing);
        }
        let kek_id = log
            .kek_id
            .ok_or_else(|| CoreError::internal("signed record missing kek_id"))?;

        let kek_plain = self.kek_chain.unwrap_by_id(kek_id).await?;
        let signing_key = signer::derive_signing_key(&kek_plain)?;
        let record = signer::canonical_record(
            log.id,
            log.request_id,
            log.client_id,
            &log.capability,
            &log.path,
            &log.created_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            &log.metadata,
        )?;
        let expected = signer::sign(&signing_key, &record)?;

        if crypto::constant_time::ct_eq(&expected, &log.signature) {
            Ok(VerifyOutcome::Valid)
        } else {
            logger_redacted::redacted_warn!(
                "audit log {} failed signature verification (kek {kek_id})",
                log.id
            );
            Ok(VerifyOutcome::Invalid)
        }
    }

    /// Iterates every record in `[from, to]`, classifying each; never
    /// short-circuits on an invalid or missing signature.
    pub async fn verify_batch(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> CoreResult<BatchReport> {
        let logs = self.repository.list_range(from, to).await?;
        let mut report = BatchReport::default();

        for log in &logs {
            report.total_checked += 1;
            if log.is_legacy() {
                report.unsigned_count += 1;
                continue;
            }
            report.signed_count += 1;
            // `log.is_legacy()` was already checked above, so `verify_one`
            // cannot return `SignatureMissing` here.
            match self.verify_one(log).await? {
                VerifyOutcome::Valid => report.valid_count += 1,
                VerifyOutcome::Invalid | VerifyOutcome::SignatureMissing => {
                    report.invalid_count += 1;
                    report.invalid_ids.push(log.id);
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use crypto::{Algorithm, InMemoryKekRepository, MasterKeyChain};

    use super::*;
    use crate::repository::InMemoryAuditLogRepository;

    async fn service() -> AuditLogService {
        let material = vec![("default".to_string(), STANDARD.encode([0u8; 32]))];
        let master_keys =
            Arc::new(MasterKeyChain::from_direct_material(&material, "default").unwrap());
        let kek_chain = Arc::new(KekChain::new(
            Arc::new(InMemoryKekRepository::new()),
            master_keys,
        ));
        kek_chain.create_initial(Algorithm::AesGcm).await.unwrap();
        AuditLogService::new(Arc::new(InMemoryAuditLogRepository::new()), kek_chain)
    }

    /// Scenario (f): audit tamper detection.
    #[tokio::test]
    async fn tampering_with_a_signed_field_invalidates_it() {
        let service = service().await;
        let ctx = RequestContext::new().with_client(Uuid::nil());
        let log = service
            .create(&ctx, "read", "/v1/secrets/x", BTreeMap::new())
            .await
            .unwrap();
        assert!(log.is_signed);
        service.verify_integrity(log.id).await.unwrap();

        let mut tampered = log.clone();
        tampered.path = "/v1/secrets/y".to_string();
        service.repository.insert(tampered).await.unwrap();

        let err = service.verify_integrity(log.id).await.unwrap_err();
        assert_eq!(err.kind(), secrets_core::ErrorKind::SignatureInvalid);
    }

    #[tokio::test]
    async fn legacy_record_reports_signature_missing() {
        let service = service().await;
        let legacy = AuditLog {
            id: new_id(),
            request_id: Uuid::nil(),
            client_id: Uuid::nil(),
            capability: "read".to_string(),
            path: "/v1/secrets/x".to_string(),
            metadata: BTreeMap::new(),
            signature: Vec::new(),
            kek_id: None,
            is_signed: false,
            created_at: Utc::now(),
        };
        service.repository.insert(legacy.clone()).await.unwrap();

        let err = service.verify_integrity(legacy.id).await.unwrap_err();
        assert_eq!(err.kind(), secrets_core::ErrorKind::SignatureMissing);
    }

    #[tokio::test]
    async fn verify_batch_classifies_every_record() {
        let service = service().await;
        let ctx = RequestContext::new().with_client(Uuid::nil());
        let signed = service
            .create(&ctx, "read", "/v1/secrets/a", BTreeMap::new())
            .await
            .unwrap();

        let mut tampered = signed.clone();
        tampered.path = "/v1/secrets/b".to_string();
        let tampered_id = new_id();
        tampered.id = tampered_id;
        service.repository.insert(tampered).await.unwrap();

        let from = signed.created_at - chrono::Duration::minutes(1);
        let to = Utc::now() + chrono::Duration::minutes(1);
        let report = service.verify_batch(from, to).await.unwrap();

        assert_eq!(report.total_checked, 2);
        assert_eq!(report.signed_count, 2);
        assert_eq!(report.valid_count, 1);
        assert_eq!(report.invalid_count, 1);
        assert_eq!(report.invalid_ids, vec![tampered_id]);
    }
}
