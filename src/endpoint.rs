//! Endpoint registry mapping symbolic regions to provider base URLs.
//!
//! An [`Endpoint`] is either a known [`Region`] or a literal base URL. [`Endpoint::parse`] keeps
//! the permissive behavior existing callers rely on (unknown names resolve to
//! [`Region::DEFAULT`]), while [`Endpoint::parse_strict`] turns the same typo into a
//! [`ConfigError::UnknownRegion`].

// self
use crate::{_prelude::*, error::ConfigError};

/// Symbolic provider regions with fixed base URLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
	/// OVHcloud Europe.
	OvhEu,
	/// OVHcloud Canada.
	OvhCa,
	/// OVHcloud United States.
	OvhUs,
	/// Kimsufi Europe.
	KimsufiEu,
	/// Kimsufi Canada.
	KimsufiCa,
	/// So you Start Europe.
	SoyoustartEu,
	/// So you Start Canada.
	SoyoustartCa,
}
impl Region {
	/// Every registered region.
	pub const ALL: [Region; 7] = [
		Region::OvhEu,
		Region::OvhCa,
		Region::OvhUs,
		Region::KimsufiEu,
		Region::KimsufiCa,
		Region::SoyoustartEu,
		Region::SoyoustartCa,
	];
	/// Region used when none (or an unknown one) is configured.
	pub const DEFAULT: Region = Region::OvhEu;

	/// Returns the registry name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Region::OvhEu => "ovh-eu",
			Region::OvhCa => "ovh-ca",
			Region::OvhUs => "ovh-us",
			Region::KimsufiEu => "kimsufi-eu",
			Region::KimsufiCa => "kimsufi-ca",
			Region::SoyoustartEu => "soyoustart-eu",
			Region::SoyoustartCa => "soyoustart-ca",
		}
	}

	/// Returns the fixed base URL (no trailing slash).
	pub const fn base_url(self) -> &'static str {
		match self {
			Region::OvhEu => "https://eu.api.ovh.com/1.0",
			Region::OvhCa => "https://ca.api.ovh.com/1.0",
			Region::OvhUs => "https://api.us.ovhcloud.com/1.0",
			Region::KimsufiEu => "https://eu.api.kimsufi.com/1.0",
			Region::KimsufiCa => "https://ca.api.kimsufi.com/1.0",
			Region::SoyoustartEu => "https://eu.api.soyoustart.com/1.0",
			Region::SoyoustartCa => "https://ca.api.soyoustart.com/1.0",
		}
	}
}
impl Default for Region {
	fn default() -> Self {
		Self::DEFAULT
	}
}
impl Display for Region {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Region {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim().to_ascii_lowercase();
		let region = match name.as_str() {
			"eu" => Region::OvhEu,
			"ca" => Region::OvhCa,
			"us" => Region::OvhUs,
			other => Region::ALL
				.into_iter()
				.find(|region| region.as_str() == other)
				.ok_or_else(|| ConfigError::UnknownRegion { name: s.to_owned() })?,
		};

		Ok(region)
	}
}

/// Provider endpoint: a registered region or a literal base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Endpoint {
	/// Registered region resolved through the registry.
	Region(Region),
	/// Literal base URL kept verbatim.
	Custom(String),
}
impl Endpoint {
	/// Parses an endpoint, falling back to [`Region::DEFAULT`] for unknown names.
	///
	/// The fallback is silent; the resolved base URL shows up as the `endpoint` field of every
	/// call span.
	pub fn parse(value: &str) -> Result<Self, ConfigError> {
		match Self::parse_strict(value) {
			Err(ConfigError::UnknownRegion { .. }) => Ok(Self::Region(Region::DEFAULT)),
			other => other,
		}
	}

	/// Parses an endpoint, rejecting names missing from the registry.
	pub fn parse_strict(value: &str) -> Result<Self, ConfigError> {
		if is_literal_url(value) {
			Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint {
				endpoint: value.to_owned(),
				source,
			})?;

			return Ok(Self::Custom(value.to_owned()));
		}
		if value.trim().is_empty() {
			return Ok(Self::default());
		}

		value.parse().map(Self::Region)
	}

	/// Returns the base URL requests are issued against.
	pub fn base_url(&self) -> &str {
		match self {
			Self::Region(region) => region.base_url(),
			Self::Custom(url) => url,
		}
	}
}
impl Default for Endpoint {
	fn default() -> Self {
		Self::Region(Region::DEFAULT)
	}
}
impl From<Region> for Endpoint {
	fn from(region: Region) -> Self {
		Self::Region(region)
	}
}
impl From<Endpoint> for String {
	fn from(value: Endpoint) -> Self {
		match value {
			Endpoint::Region(region) => region.as_str().to_owned(),
			Endpoint::Custom(url) => url,
		}
	}
}
impl TryFrom<String> for Endpoint {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl FromStr for Endpoint {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Region(region) => Display::fmt(region, f),
			Self::Custom(url) => f.write_str(url),
		}
	}
}

fn is_literal_url(value: &str) -> bool {
	let lower = value.trim_start().to_ascii_lowercase();

	lower.starts_with("http://") || lower.starts_with("https://")
}
