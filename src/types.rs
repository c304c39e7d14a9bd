//! Core types for the bsvalias payment protocol

use crate::{BsvaliasError, Result};
use bitcoin::{Transaction, TxOut};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder for the identity alias in capability URL templates
pub const ALIAS_PLACEHOLDER: &str = "{alias}";

/// Placeholder for the identity hostname in capability URL templates
pub const DOMAIN_PLACEHOLDER: &str = "{domain.tld}";

/// Asset identifier meaning the base currency. An empty asset id means the same.
pub const BSV_ASSET_ID: &str = "BSV";

/// Capability names as advertised by a bsvalias site
pub mod capabilities {
    /// Locking script for a single payment
    pub const PAYMENT_DESTINATION: &str = "payment-destination";
    /// Transaction template plus the outputs to fund
    pub const PAYMENT_REQUEST: &str = "payment-request";
}

/// Returns true when the asset id requests the base currency
pub fn is_base_currency(asset_id: &str) -> bool {
    asset_id.is_empty() || asset_id == BSV_ASSET_ID
}

/// Capability URL templates advertised by a site. Empty means not advertised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    pub payment_destination: String,
    pub payment_request: String,
}

impl Capabilities {
    /// Set the payment destination URL template
    pub fn with_payment_destination(mut self, template: impl Into<String>) -> Self {
        self.payment_destination = template.into();
        self
    }

    /// Set the payment request URL template
    pub fn with_payment_request(mut self, template: impl Into<String>) -> Self {
        self.payment_request = template.into();
        self
    }

    /// Look up a capability template by name. Unknown names and empty
    /// templates both read as not advertised.
    pub fn template(&self, capability: &str) -> Option<&str> {
        let template = match capability {
            capabilities::PAYMENT_DESTINATION => &self.payment_destination,
            capabilities::PAYMENT_REQUEST => &self.payment_request,
            _ => return None,
        };

        if template.is_empty() {
            None
        } else {
            Some(template.as_str())
        }
    }
}

/// Site configuration of a counterparty identity service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub capabilities: Capabilities,
}

impl Site {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }
}

/// A payment handle in `alias@domain.tld` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    pub alias: String,
    pub domain: String,
}

impl FromStr for Handle {
    type Err = BsvaliasError;

    fn from_str(s: &str) -> Result<Self> {
        let (alias, domain) = s
            .split_once('@')
            .ok_or_else(|| BsvaliasError::invalid_handle(s))?;

        if alias.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(BsvaliasError::invalid_handle(s));
        }

        Ok(Self {
            alias: alias.to_string(),
            domain: domain.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.alias, self.domain)
    }
}

/// A counterparty identity: alias and hostname plus the capabilities its
/// site advertises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub alias: String,
    pub hostname: String,
    pub site: Site,
}

impl Identity {
    pub fn new(alias: impl Into<String>, hostname: impl Into<String>, site: Site) -> Self {
        Self {
            alias: alias.into(),
            hostname: hostname.into(),
            site,
        }
    }

    /// Build an identity from an `alias@domain.tld` handle
    pub fn from_handle(handle: &str, site: Site) -> Result<Self> {
        let handle: Handle = handle.parse()?;
        Ok(Self::new(handle.alias, handle.domain, site))
    }

    /// The identity's handle
    pub fn handle(&self) -> Handle {
        Handle {
            alias: self.alias.clone(),
            domain: self.hostname.clone(),
        }
    }

    /// Check the capability is advertised and resolve its URL template for
    /// this identity. Fails with `NotCapable` before anything else happens.
    pub fn capability_url(&self, capability: &str) -> Result<url::Url> {
        let template = self
            .site
            .capabilities
            .template(capability)
            .ok_or_else(|| BsvaliasError::not_capable(capability))?;

        let resolved = template
            .replace(ALIAS_PLACEHOLDER, &self.alias)
            .replace(DOMAIN_PLACEHOLDER, &self.hostname);

        url::Url::parse(&resolved).map_err(|e| {
            BsvaliasError::config(format!("Invalid {} URL {}: {}", capability, resolved, e))
        })
    }
}

/// The sender of a payment, as presented to the counterparty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Display name
    pub name: String,
    /// Sender's own handle, required by the protocol
    pub handle: String,
}

impl Sender {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
        }
    }
}

/// A request body that carries a sender signature over its canonical fields
pub trait SignableRequest {
    /// Canonical concatenation of the signed fields. The order is part of
    /// the wire contract.
    fn signing_message(&self) -> String;

    /// Handle of the sender the signature is attributed to
    fn sender_handle(&self) -> &str;

    /// Attach the encoded signature
    fn set_signature(&mut self, signature: String);
}

/// Body posted to a `payment-destination` capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDestinationBody {
    pub sender_name: String,
    pub sender_handle: String,
    /// RFC3339 UTC time the request was built
    #[serde(rename = "dt")]
    pub date_time: String,
    pub amount: u64,
    pub purpose: String,
    /// Empty when the request is unsigned
    pub signature: String,
}

impl PaymentDestinationBody {
    pub fn new(sender: &Sender, date_time: DateTime<Utc>, amount: u64, purpose: &str) -> Self {
        Self {
            sender_name: sender.name.clone(),
            sender_handle: sender.handle.clone(),
            date_time: format_date_time(date_time),
            amount,
            purpose: purpose.to_string(),
            signature: String::new(),
        }
    }
}

impl SignableRequest for PaymentDestinationBody {
    fn signing_message(&self) -> String {
        format!(
            "{}{}{}{}",
            self.sender_handle, self.date_time, self.amount, self.purpose
        )
    }

    fn sender_handle(&self) -> &str {
        &self.sender_handle
    }

    fn set_signature(&mut self, signature: String) {
        self.signature = signature;
    }
}

/// Body posted to a `payment-request` capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestBody {
    pub sender_name: String,
    pub sender_handle: String,
    #[serde(rename = "dt")]
    pub date_time: String,
    /// Empty or [`BSV_ASSET_ID`] for the base currency
    #[serde(rename = "assetID")]
    pub asset_id: String,
    pub amount: u64,
    pub purpose: String,
    pub signature: String,
}

impl PaymentRequestBody {
    pub fn new(
        sender: &Sender,
        date_time: DateTime<Utc>,
        asset_id: &str,
        amount: u64,
        purpose: &str,
    ) -> Self {
        Self {
            sender_name: sender.name.clone(),
            sender_handle: sender.handle.clone(),
            date_time: format_date_time(date_time),
            asset_id: asset_id.to_string(),
            amount,
            purpose: purpose.to_string(),
            signature: String::new(),
        }
    }
}

impl SignableRequest for PaymentRequestBody {
    fn signing_message(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.sender_handle, self.date_time, self.asset_id, self.amount, self.purpose
        )
    }

    fn sender_handle(&self) -> &str {
        &self.sender_handle
    }

    fn set_signature(&mut self, signature: String) {
        self.signature = signature;
    }
}

/// Response from a `payment-destination` capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentDestinationResponse {
    /// Hex encoded locking script
    pub output: String,
}

/// Response from a `payment-request` capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentRequestResponse {
    /// Hex encoded transaction template
    pub payment_request: String,
    /// Hex encoded outputs, in the order the counterparty expects them funded
    pub outputs: Vec<String>,
}

/// A decoded payment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub tx: Transaction,
    pub outputs: Vec<TxOut>,
}

/// Format a timestamp the way the protocol expects: RFC3339, UTC, whole
/// seconds, `Z` suffix
pub fn format_date_time(date_time: DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Source of the request timestamp
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for reproducible signatures
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
