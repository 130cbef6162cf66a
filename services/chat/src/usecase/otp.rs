use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngExt;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use cargolink_domain::status::OtpPurpose;

use crate::domain::repository::Storage;
use crate::domain::types::{MAX_OTP_ATTEMPTS, OTP_LEN, OTP_TTL_MINUTES, Otp};
use crate::error::ChatServiceError;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Issues and checks one-time codes bound to `(phone, purpose, reference)`.
///
/// Verification is read-modify-write on the stored record, so it runs under a
/// single guard to keep the attempt counter and the used flag consistent.
pub struct OtpVerifier<S: Storage> {
    pub store: Arc<S>,
    guard: Mutex<()>,
    ttl: Duration,
}

impl<S: Storage> OtpVerifier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_ttl(store, Duration::minutes(OTP_TTL_MINUTES))
    }

    pub fn with_ttl(store: Arc<S>, ttl: Duration) -> Self {
        Self {
            store,
            guard: Mutex::new(()),
            ttl,
        }
    }

    // ── Issue ────────────────────────────────────────────────────────────────

    /// Issue a fresh code. Earlier outstanding codes for the same phone and purpose
    /// are revoked.
    pub async fn issue(
        &self,
        phone: &str,
        purpose: OtpPurpose,
        reference_id: &str,
    ) -> Result<Otp, ChatServiceError> {
        let _guard = self.guard.lock().await;

        let revoked = self.store.revoke_otps(phone, purpose).await?;
        let now = Utc::now();
        let otp = Otp {
            id: Uuid::now_v7(),
            phone: phone.to_owned(),
            code: generate_code(),
            purpose,
            reference_id: reference_id.to_owned(),
            expires_at: now + self.ttl,
            used: false,
            verified_at: None,
            attempts: 0,
            revoked_at: None,
            created_at: now,
        };
        self.store.create_otp(&otp).await?;

        info!(
            phone,
            purpose = purpose.as_str(),
            reference_id,
            revoked,
            "otp issued"
        );
        Ok(otp)
    }

    // ── Verify ───────────────────────────────────────────────────────────────

    /// Check `code` and consume it. Returns the reference the code was issued for;
    /// the caller compares it with the reference it expects.
    pub async fn verify(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<String, ChatServiceError> {
        let _guard = self.guard.lock().await;
        let mut otp = self.check_locked(phone, code, purpose).await?;
        otp.used = true;
        otp.verified_at = Some(Utc::now());
        self.store.update_otp(&otp).await?;
        info!(
            phone,
            purpose = purpose.as_str(),
            reference_id = %otp.reference_id,
            "otp verified"
        );
        Ok(otp.reference_id)
    }

    /// Check `code` without consuming it. The caller consumes the returned code
    /// together with the state change it unlocks, see
    /// [`Storage::transition_booking`].
    pub async fn check(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Otp, ChatServiceError> {
        let _guard = self.guard.lock().await;
        self.check_locked(phone, code, purpose).await
    }

    /// Every attempt that reaches a record counts, including the successful one.
    /// A wrong code counts against the phone's active code for the purpose.
    async fn check_locked(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Otp, ChatServiceError> {
        let now = Utc::now();

        let Some(mut otp) = self.store.find_otp(phone, code.trim(), purpose).await? else {
            return self.record_mismatch(phone, purpose).await;
        };

        otp.attempts += 1;
        let rejection = if otp.attempts > MAX_OTP_ATTEMPTS {
            Some(ChatServiceError::OtpTooManyAttempts)
        } else if otp.is_expired(now) {
            Some(ChatServiceError::OtpExpired)
        } else if otp.used {
            Some(ChatServiceError::OtpAlreadyUsed)
        } else {
            None
        };
        self.store.update_otp(&otp).await?;

        match rejection {
            None => Ok(otp),
            Some(e) => {
                warn!(
                    phone,
                    purpose = purpose.as_str(),
                    attempts = otp.attempts,
                    kind = e.kind(),
                    "otp rejected"
                );
                Err(e)
            }
        }
    }

    async fn record_mismatch(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> Result<Otp, ChatServiceError> {
        let Some(mut active) = self.store.find_active_otp(phone, purpose).await? else {
            return Err(ChatServiceError::OtpNotFound);
        };
        active.attempts += 1;
        self.store.update_otp(&active).await?;
        warn!(
            phone,
            purpose = purpose.as_str(),
            attempts = active.attempts,
            "otp mismatch"
        );
        if active.attempts > MAX_OTP_ATTEMPTS {
            Err(ChatServiceError::OtpTooManyAttempts)
        } else {
            Err(ChatServiceError::OtpMismatch)
        }
    }
}
