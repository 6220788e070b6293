//! Client configuration: builder helpers, serde loading, and environment lookup.

// self
use crate::{
	_prelude::*,
	auth::{ApplicationSecret, ConsumerKey},
	endpoint::Endpoint,
	error::ConfigError,
};

/// Environment variable naming the endpoint (region name or literal URL).
pub const ENV_ENDPOINT: &str = "OVH_ENDPOINT";
/// Environment variable holding the application key.
pub const ENV_APP_KEY: &str = "OVH_APP_KEY";
/// Environment variable holding the application secret.
pub const ENV_APP_SECRET: &str = "OVH_APP_SECRET";
/// Environment variable holding an optional consumer key.
pub const ENV_CONSUMER_KEY: &str = "OVH_CONSUMER_KEY";

/// Settings needed to build a signing client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Region or literal base URL.
	#[serde(default)]
	pub endpoint: Endpoint,
	/// Application key issued by the provider.
	pub application_key: String,
	/// Application secret issued by the provider.
	pub application_secret: ApplicationSecret,
	/// Consumer key obtained through the credential flow, if already known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub consumer_key: Option<ConsumerKey>,
}
impl ClientConfig {
	/// Creates a configuration for the default region.
	pub fn new(
		application_key: impl Into<String>,
		application_secret: impl Into<ApplicationSecret>,
	) -> Self {
		Self {
			endpoint: Endpoint::default(),
			application_key: application_key.into(),
			application_secret: application_secret.into(),
			consumer_key: None,
		}
	}

	/// Overrides the endpoint.
	pub fn with_endpoint(mut self, endpoint: impl Into<Endpoint>) -> Self {
		self.endpoint = endpoint.into();

		self
	}

	/// Sets the consumer key.
	pub fn with_consumer_key(mut self, consumer_key: impl Into<ConsumerKey>) -> Self {
		self.consumer_key = Some(consumer_key.into());

		self
	}

	/// Reads `OVH_ENDPOINT`, `OVH_APP_KEY`, `OVH_APP_SECRET`, and `OVH_CONSUMER_KEY`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds a configuration from any variable lookup; values are trimmed and blank values
	/// count as absent.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &'static str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let application_key =
			read(ENV_APP_KEY).ok_or(ConfigError::MissingEnv { name: ENV_APP_KEY })?;
		let application_secret =
			read(ENV_APP_SECRET).ok_or(ConfigError::MissingEnv { name: ENV_APP_SECRET })?;
		let endpoint = match read(ENV_ENDPOINT) {
			Some(value) => Endpoint::parse(&value)?,
			None => Endpoint::default(),
		};

		Ok(Self {
			endpoint,
			application_key,
			application_secret: application_secret.into(),
			consumer_key: read(ENV_CONSUMER_KEY).map(ConsumerKey::from),
		})
	}

	/// Checks that the application identity is present.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.application_key.trim().is_empty() {
			return Err(ConfigError::MissingApplicationKey);
		}
		if self.application_secret.is_blank() {
			return Err(ConfigError::MissingApplicationSecret);
		}

		Ok(())
	}
}
