//! `$1$` request signature.
//!
//! The provider authenticates a call by recomputing
//! `"$1$" + hex(sha1(secret + "+" + consumer + "+" + method + "+" + url + "+" + body + "+" + ts))`
//! and comparing it with the `X-Ovh-Signature` header.

// crates.io
use sha1::{Digest, Sha1};
// self
use crate::http::Method;

/// Version tag prefixed to every signature.
pub const SIGNATURE_VERSION: &str = "$1$";

const SEPARATOR: &[u8] = b"+";

/// Computes the signature for one request.
///
/// `consumer_key` is the empty string for unauthenticated material and `body` is the empty
/// string when the request carries no payload; both still take part in the digest.
pub fn sign(
	application_secret: &str,
	consumer_key: &str,
	method: Method,
	url: &str,
	body: &str,
	timestamp: i64,
) -> String {
	let timestamp = timestamp.to_string();
	let mut hasher = Sha1::new();

	for (idx, part) in
		[application_secret, consumer_key, method.as_str(), url, body, timestamp.as_str()]
			.into_iter()
			.enumerate()
	{
		if idx > 0 {
			hasher.update(SEPARATOR);
		}

		hasher.update(part.as_bytes());
	}

	format!("{SIGNATURE_VERSION}{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const SECRET: &str = "app-secret";
	const CONSUMER: &str = "consumer-key";
	const URL: &str = "https://eu.api.ovh.com/1.0/me";
	const TS: i64 = 1_700_000_000;

	fn is_well_formed(signature: &str) -> bool {
		signature.strip_prefix(SIGNATURE_VERSION).is_some_and(|digest| {
			digest.len() == 40 && digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
		})
	}

	#[test]
	fn matches_reference_digest() {
		// sha1("s+c+GET+https://x/1.0/me++1")
		assert_eq!(
			sign("s", "c", Method::Get, "https://x/1.0/me", "", 1),
			"$1$7d79dc21a019b1d615f0d9447ee491ee5d2c9cba"
		);
	}

	#[test]
	fn deterministic_and_well_formed() {
		let first = sign(SECRET, CONSUMER, Method::Get, URL, "", TS);
		let second = sign(SECRET, CONSUMER, Method::Get, URL, "", TS);

		assert_eq!(first, second);
		assert!(is_well_formed(&first), "Unexpected signature shape: {first}.");
	}

	#[test]
	fn every_input_changes_the_output() {
		let base = sign(SECRET, CONSUMER, Method::Post, URL, "{}", TS);
		let variants = [
			sign("other-secret", CONSUMER, Method::Post, URL, "{}", TS),
			sign(SECRET, "other-consumer", Method::Post, URL, "{}", TS),
			sign(SECRET, CONSUMER, Method::Put, URL, "{}", TS),
			sign(SECRET, CONSUMER, Method::Post, "https://eu.api.ovh.com/1.0/me/bill", "{}", TS),
			sign(SECRET, CONSUMER, Method::Post, URL, "{\"a\":1}", TS),
			sign(SECRET, CONSUMER, Method::Post, URL, "{}", TS + 1),
		];

		for variant in variants {
			assert!(is_well_formed(&variant));
			assert_ne!(variant, base);
		}
	}

	#[test]
	fn empty_body_is_part_of_the_material() {
		let empty = sign(SECRET, CONSUMER, Method::Delete, URL, "", TS);
		let undefined = sign(SECRET, CONSUMER, Method::Delete, URL, "undefined", TS);
		let expected = format!(
			"$1${}",
			hex::encode(Sha1::digest(format!("{SECRET}+{CONSUMER}+DELETE+{URL}++{TS}").as_bytes()))
		);

		assert_eq!(empty, expected);
		assert_ne!(empty, undefined);
	}
}
