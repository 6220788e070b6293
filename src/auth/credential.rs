//! Consumer credential lifecycle: request payloads, pending credentials, the shared slot.
//!
//! Issuance is two explicit steps. [`CredentialRequest`] is posted to the provider, which answers
//! with a [`PendingCredential`] whose key only works once a human visits
//! [`PendingCredential::validation_url`]. Validation happens outside this crate; the caller then
//! persists the resulting [`Credential`] and installs it wherever it is needed.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{AccessRule, ConsumerKey},
};

/// Payload for the credential-request endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
	/// Rules the new consumer key should be granted.
	pub access_rules: Vec<AccessRule>,
	/// URL the provider redirects the user to after validation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirection: Option<String>,
}
impl CredentialRequest {
	/// Creates a request for the provided rules.
	pub fn new(access_rules: impl IntoIterator<Item = AccessRule>) -> Self {
		Self { access_rules: access_rules.into_iter().collect(), redirection: None }
	}

	/// Sets the post-validation redirect URL.
	pub fn with_redirection(mut self, redirection: impl Into<String>) -> Self {
		self.redirection = Some(redirection.into());

		self
	}
}

/// Provider answer to a credential request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CredentialResponse {
	pub(crate) validation_url: String,
	pub(crate) consumer_key: ConsumerKey,
	pub(crate) state: String,
}

/// Consumer key issued by the provider but not yet validated by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCredential {
	/// URL the user must visit to approve the key.
	pub validation_url: String,
	/// Issued consumer key; rejected by the provider until validated.
	pub consumer_key: ConsumerKey,
	/// Opaque provider state (`pendingValidation` on issuance).
	pub state: String,
	/// Rules the key was requested with.
	pub access_rules: Vec<AccessRule>,
	/// Redirect URL the key was requested with.
	pub redirection: Option<String>,
}
impl PendingCredential {
	pub(crate) fn from_response(response: CredentialResponse, request: &CredentialRequest) -> Self {
		Self {
			validation_url: response.validation_url,
			consumer_key: response.consumer_key,
			state: response.state,
			access_rules: request.access_rules.clone(),
			redirection: request.redirection.clone(),
		}
	}

	/// Converts into the persisted [`Credential`] once the caller knows validation happened.
	pub fn into_credential(self) -> Credential {
		Credential {
			consumer_key: self.consumer_key,
			access_rules: self.access_rules,
			redirection: self.redirection,
		}
	}
}

/// Consumer key plus the scope it was issued for; persisted by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
	/// Consumer key used to sign calls.
	pub consumer_key: ConsumerKey,
	/// Rules the key was issued for.
	#[serde(default)]
	pub access_rules: Vec<AccessRule>,
	/// Redirect URL used during issuance.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirection: Option<String>,
}
impl Credential {
	/// Wraps a bare consumer key whose rules are unknown to the caller.
	pub fn new(consumer_key: impl Into<ConsumerKey>) -> Self {
		Self { consumer_key: consumer_key.into(), access_rules: Vec::new(), redirection: None }
	}
}

/// Single-writer, many-reader holder for the client's consumer key.
///
/// Requests read the key once through [`CredentialSlot::snapshot`] and use that copy for both
/// the signature and the headers, so replacing the key mid-flight never mixes two keys in one
/// request.
#[derive(Clone, Debug, Default)]
pub struct CredentialSlot(Arc<RwLock<Option<ConsumerKey>>>);
impl CredentialSlot {
	/// Creates a slot pre-populated with `key`.
	pub fn new(key: Option<ConsumerKey>) -> Self {
		Self(Arc::new(RwLock::new(key.filter(|key| !key.is_blank()))))
	}

	/// Replaces the stored key; blank keys clear the slot.
	pub fn store(&self, key: ConsumerKey) {
		*self.0.write() = Some(key).filter(|key| !key.is_blank());
	}

	/// Removes and returns the stored key.
	pub fn take(&self) -> Option<ConsumerKey> {
		self.0.write().take()
	}

	/// Clears the slot only while it still holds `expected`; returns whether it did.
	///
	/// A key stored by another caller after `expected` was snapshotted is left in place.
	pub fn clear_if(&self, expected: &ConsumerKey) -> bool {
		let mut slot = self.0.write();

		if slot.as_ref() == Some(expected) {
			*slot = None;

			true
		} else {
			false
		}
	}

	/// Returns a copy of the stored key.
	pub fn snapshot(&self) -> Option<ConsumerKey> {
		self.0.read().clone()
	}

	/// Returns true when a key is stored, regardless of whether the provider accepts it.
	pub fn is_set(&self) -> bool {
		self.0.read().is_some()
	}
}

/// Validation status reported by the provider for a consumer key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialStatus {
	/// Approved by the user and usable.
	Validated,
	/// Issued but not approved yet.
	PendingValidation,
	/// Past its expiration date.
	Expired,
	/// Rejected by the user.
	Refused,
	/// Status not known to this crate.
	#[serde(other)]
	Unknown,
}

/// Provider view of the credential currently used to sign calls.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDetails {
	/// Provider identifier of the credential.
	pub credential_id: u64,
	/// Application the credential belongs to.
	#[serde(default)]
	pub application_id: Option<u64>,
	/// Validation status.
	pub status: CredentialStatus,
	/// Rules granted to the credential.
	#[serde(default)]
	pub rules: Vec<AccessRule>,
	/// Creation instant.
	#[serde(default, deserialize_with = "deserialize_instant")]
	pub creation: Option<OffsetDateTime>,
	/// Expiration instant, when the key is not perpetual.
	#[serde(default, deserialize_with = "deserialize_instant")]
	pub expiration: Option<OffsetDateTime>,
	/// Last time the key signed a call.
	#[serde(default, deserialize_with = "deserialize_instant")]
	pub last_use: Option<OffsetDateTime>,
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let Some(raw) = Option::<String>::deserialize(deserializer)? else {
		return Ok(None);
	};

	OffsetDateTime::parse(raw.trim(), &Rfc3339).map(Some).map_err(serde::de::Error::custom)
}
