//! Token lifecycle orchestrator
//!
//! Combines the codec, the refresh token store and the clock into the four
//! lifecycle operations. All business rules about expiry and revocation live
//! here; the store only persists.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::token::{RefreshTokenRecord, TokenKind, TokenPair};
use crate::errors::{StoreError, TokenError};
use crate::repositories::TokenRepository;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::sweeper::{ExpirySweeper, SweeperHandle};

/// Service for issuing, validating, rotating and revoking token pairs
pub struct TokenService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
    span: Span,
    expiry_sweeper: Arc<ExpirySweeper<R>>,
    sweeper_handle: Mutex<Option<SweeperHandle>>,
}

impl<R: TokenRepository + 'static> TokenService<R> {
    /// Creates a token service on the wall clock, without starting the sweeper
    pub fn new(repository: Arc<R>, config: TokenServiceConfig) -> Self {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Creates a token service reading time from `clock`
    pub fn with_clock(
        repository: Arc<R>,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let codec = TokenCodec::new(&config, clock.clone());
        let expiry_sweeper = Arc::new(ExpirySweeper::new(
            repository.clone(),
            clock.clone(),
            config.sweeper.clone(),
        ));

        Self {
            repository,
            codec,
            clock,
            config,
            span: info_span!("token_service"),
            expiry_sweeper,
            sweeper_handle: Mutex::new(None),
        }
    }

    /// Replaces the span every operation and the sweeper log under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Creates a token service and starts its expiry sweeper
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(repository: Arc<R>, config: TokenServiceConfig) -> Self {
        let service = Self::new(repository, config);
        service.start_sweeper();
        service
    }

    /// Starts the expiry sweeper unless it is already running or disabled
    pub fn start_sweeper(&self) {
        let mut slot = self
            .sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!(parent: &self.span, "Expiry sweeper already running");
            return;
        }

        let span = info_span!(parent: &self.span, "expiry_sweeper");
        *slot = self.expiry_sweeper.clone().spawn(span);
    }

    /// Stops the expiry sweeper and waits for it to exit
    pub async fn shutdown(&self) {
        let handle = self
            .sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.stop().await;
        }
        info!(parent: &self.span, "Token service shut down");
    }

    /// Issues a fresh token pair for `subject` and persists the refresh half
    ///
    /// # Errors
    /// * `TokenError::Internal` - Signing or persistence failed; no token is returned
    pub async fn authenticate(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let span = info_span!(parent: &self.span, "authenticate", subject = %subject);

        async move {
            let (pair, record) = self.mint_pair(subject)?;

            self.bounded(self.repository.save_refresh_token(record))
                .await
                .map_err(|e| self.store_failure(e))?;

            info!("Issued token pair");
            Ok(pair)
        }
        .instrument(span)
        .await
    }

    /// Exchanges a refresh token for a new pair, revoking the old one
    ///
    /// Each refresh token funds at most one successful rotation. Of two
    /// concurrent callers presenting the same token exactly one succeeds; the
    /// other observes `TokenRevoked`.
    ///
    /// # Errors
    /// * `TokenError::TokenInvalid` - The token was never issued
    /// * `TokenError::TokenRevoked` - Already rotated or logged out
    /// * `TokenError::TokenExpired` - Past its expiry
    /// * `TokenError::Internal` - Signing or the store failed; no pair is returned
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let span = info_span!(
            parent: &self.span,
            "refresh_tokens",
            subject = tracing::field::Empty
        );

        async move {
            let record = self.lookup(refresh_token).await?;
            Span::current().record("subject", record.subject.as_str());

            if record.revoked {
                warn!("Revoked refresh token presented");
                return Err(TokenError::TokenRevoked);
            }
            if record.is_expired_at(self.clock.now()) {
                debug!("Expired refresh token presented");
                return Err(TokenError::TokenExpired);
            }

            let (pair, replacement) = self.mint_pair(&record.subject)?;

            match self
                .bounded(self.repository.rotate_refresh_token(refresh_token, replacement))
                .await
            {
                Ok(()) => {}
                Err(StoreError::NotFound) => {
                    warn!("Refresh token revoked concurrently");
                    return Err(TokenError::TokenRevoked);
                }
                Err(e) => return Err(self.store_failure(e)),
            }

            info!("Rotated refresh token");
            Ok(pair)
        }
        .instrument(span)
        .await
    }

    /// Revokes a refresh token
    ///
    /// Logging out twice succeeds both times.
    ///
    /// # Errors
    /// * `TokenError::TokenInvalid` - The token was never issued
    /// * `TokenError::Internal` - The store failed
    pub async fn logout(&self, refresh_token: &str) -> Result<(), TokenError> {
        let span = info_span!(
            parent: &self.span,
            "logout",
            subject = tracing::field::Empty
        );

        async move {
            let record = self.lookup(refresh_token).await?;
            Span::current().record("subject", record.subject.as_str());

            if record.revoked {
                debug!("Refresh token already revoked");
                return Ok(());
            }

            match self.bounded(self.repository.revoke_token(refresh_token)).await {
                // Lost a race against another revoke; the token is revoked either way
                Ok(()) | Err(StoreError::NotFound) => {
                    info!("Logged out");
                    Ok(())
                }
                Err(e) => Err(self.store_failure(e)),
            }
        }
        .instrument(span)
        .await
    }

    /// Checks an access token and returns its subject
    ///
    /// Never touches the store. Refresh tokens are not accepted.
    ///
    /// # Errors
    /// * `TokenError::TokenInvalid` - Not a valid access token
    /// * `TokenError::TokenExpired` - Valid access token past its expiry
    pub fn validate_token(&self, access_token: &str) -> Result<String, TokenError> {
        let _entered = self.span.enter();

        match self.codec.verify_kind(access_token, TokenKind::Access) {
            Ok(claims) => Ok(claims.sub),
            Err(e) => {
                debug!(error = %e, "Access token rejected");
                Err(e)
            }
        }
    }

    /// Runs one expiry sweep immediately
    pub async fn sweep_expired(&self) -> Result<u64, TokenError> {
        let span = info_span!(parent: &self.span, "sweep_expired");

        async move {
            self.bounded(self.expiry_sweeper.run_once())
                .await
                .map_err(|e| self.store_failure(e))
        }
        .instrument(span)
        .await
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signs an access and a refresh token and builds the record for the latter
    fn mint_pair(&self, subject: &str) -> Result<(TokenPair, RefreshTokenRecord), TokenError> {
        let access = self
            .codec
            .issue(subject, TokenKind::Access, self.config.access_token_ttl)
            .map_err(|e| self.signing_failure(e))?;
        let refresh = self
            .codec
            .issue(subject, TokenKind::Refresh, self.config.refresh_token_ttl)
            .map_err(|e| self.signing_failure(e))?;

        let record = RefreshTokenRecord::new(
            subject,
            refresh.token.clone(),
            refresh.claims.issued_at(),
            refresh.expires_at,
        );

        let pair = TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.config.access_token_ttl.num_seconds(),
            expires_at: access.expires_at,
        };

        Ok((pair, record))
    }

    async fn lookup(&self, refresh_token: &str) -> Result<RefreshTokenRecord, TokenError> {
        match self
            .bounded(self.repository.find_refresh_token(refresh_token))
            .await
        {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => {
                debug!("Unknown refresh token presented");
                Err(TokenError::TokenInvalid)
            }
            Err(e) => Err(self.store_failure(e)),
        }
    }

    /// Bounds a store call by the configured timeout
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let limit = self.config.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::unavailable(format!(
                "store call timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }

    fn store_failure(&self, e: StoreError) -> TokenError {
        error!(error = %e, "Refresh token store failed");
        TokenError::internal(e.to_string())
    }

    fn signing_failure(&self, e: TokenError) -> TokenError {
        error!(error = %e, "Token signing failed");
        e
    }
}

impl<R: TokenRepository + 'static> Drop for TokenService<R> {
    fn drop(&mut self) {
        let handle = self
            .sweeper_handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.cancel();
        }
    }
}
