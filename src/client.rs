//! Client for the payment capabilities of a bsvalias identity

use crate::codec::{decode_payment_destination, decode_payment_request};
use crate::config::ClientConfig;
use crate::crypto::signature::Signer;
use crate::transport::{HttpTransport, Transport};
use crate::types::*;
use crate::{BsvaliasError, Result};
use bitcoin::ScriptBuf;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for requesting payment destinations and payment requests from
/// counterparty identities.
///
/// Each call builds a fresh request, signs it if a key is supplied, posts it
/// and decodes the response. Nothing is cached or retried.
pub struct IdentityClient<T = HttpTransport> {
    transport: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl IdentityClient<HttpTransport> {
    /// Create a client over HTTP with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a client over HTTP with a custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> IdentityClient<T> {
    /// Create a client over any transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock that stamps requests
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a locking script that can be used to send bitcoin to `identity`.
    ///
    /// With [`Signer::Key`] the key must belong to `sender.handle`; the request
    /// is then signed over handle, time, amount and purpose.
    pub async fn get_payment_destination(
        &self,
        identity: &Identity,
        sender: &Sender,
        purpose: &str,
        amount: u64,
        signer: Signer<'_>,
    ) -> Result<ScriptBuf> {
        let url = identity.capability_url(capabilities::PAYMENT_DESTINATION)?;

        let mut request = PaymentDestinationBody::new(sender, self.clock.now(), amount, purpose);
        signer.apply(&mut request)?;

        debug!(
            capability = capabilities::PAYMENT_DESTINATION,
            signed = signer.is_signed(),
            "Requesting payment destination from {}",
            url
        );

        let response: PaymentDestinationResponse = self.exchange(&url, &request).await?;
        let script = decode_payment_destination(&response).inspect_err(|e| {
            warn!("Invalid payment destination from {}: {}", url, e);
        })?;

        info!(
            "Received {} byte locking script from {}",
            script.len(),
            identity.handle()
        );
        Ok(script)
    }

    /// Get a payment request from `identity`.
    ///
    /// `asset_id` may be empty or [`BSV_ASSET_ID`] to request bitcoin. The
    /// sender handle is required.
    pub async fn get_payment_request(
        &self,
        identity: &Identity,
        sender: &Sender,
        purpose: &str,
        asset_id: &str,
        amount: u64,
        signer: Signer<'_>,
    ) -> Result<PaymentRequest> {
        let url = identity.capability_url(capabilities::PAYMENT_REQUEST)?;

        let mut request =
            PaymentRequestBody::new(sender, self.clock.now(), asset_id, amount, purpose);
        signer.apply(&mut request)?;

        debug!(
            capability = capabilities::PAYMENT_REQUEST,
            signed = signer.is_signed(),
            base_currency = is_base_currency(asset_id),
            "Requesting payment request from {}",
            url
        );

        let response: PaymentRequestResponse = self.exchange(&url, &request).await?;
        let payment_request = decode_payment_request(&response).inspect_err(|e| {
            warn!("Invalid payment request from {}: {}", url, e);
        })?;

        info!(
            "Received payment request with {} outputs from {}",
            payment_request.outputs.len(),
            identity.handle()
        );
        Ok(payment_request)
    }

    /// Post a request body and parse the typed response envelope
    async fn exchange<B, R>(&self, url: &url::Url, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;

        let response = self
            .transport
            .post_json(url.as_str(), &body)
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                BsvaliasError::transport("http get", e)
            })?;

        serde_json::from_value(response).map_err(|e| BsvaliasError::format("parse response", e))
    }
}

impl<T> Clone for IdentityClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T> std::fmt::Debug for IdentityClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
