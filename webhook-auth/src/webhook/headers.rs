//! Case-insensitive lookup of the signing headers.

use std::collections::HashMap;

/// Names of the three headers that carry a signed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderNames {
    pub id: &'static str,
    pub timestamp: &'static str,
    pub signature: &'static str,
}

/// Standard Webhooks header names.
pub const STANDARD_HEADERS: HeaderNames = HeaderNames {
    id: "webhook-id",
    timestamp: "webhook-timestamp",
    signature: "webhook-signature",
};

/// Svix header names, same scheme under a vendor prefix.
pub const SVIX_HEADERS: HeaderNames = HeaderNames {
    id: "svix-id",
    timestamp: "svix-timestamp",
    signature: "svix-signature",
};

const HEADER_FAMILIES: [HeaderNames; 2] = [STANDARD_HEADERS, SVIX_HEADERS];

/// The signing header values of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> SigningHeaders<'a> {
    /// Finds a complete set of signing headers.
    ///
    /// All three values must come from the same family and be non-blank; mixing
    /// `webhook-id` with `svix-signature` does not count.
    pub fn extract(headers: &'a HashMap<String, String>) -> Option<Self> {
        HEADER_FAMILIES.iter().find_map(|names| {
            Some(SigningHeaders {
                id: lookup(headers, names.id)?,
                timestamp: lookup(headers, names.timestamp)?,
                signature: lookup(headers, names.signature)?,
            })
        })
    }

    /// The individual `tag,value` entries of the signature header.
    pub fn signatures(&self) -> impl Iterator<Item = &'a str> {
        self.signature.split_whitespace()
    }
}

fn lookup<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let headers = headers(&[
            ("Webhook-Id", "msg_1"),
            ("WEBHOOK-TIMESTAMP", "1706832000"),
            ("webhook-signature", "v1,abc v1,def"),
        ]);

        let signing = SigningHeaders::extract(&headers).unwrap();
        assert_eq!(signing.id, "msg_1");
        assert_eq!(signing.timestamp, "1706832000");
        assert_eq!(signing.signatures().collect::<Vec<_>>(), vec!["v1,abc", "v1,def"]);
    }

    #[test]
    fn test_extract_svix_family() {
        let headers = headers(&[
            ("svix-id", "msg_1"),
            ("svix-timestamp", "1706832000"),
            ("svix-signature", "v1,abc"),
        ]);

        assert!(SigningHeaders::extract(&headers).is_some());
    }

    #[test]
    fn test_missing_header_yields_none() {
        let headers = headers(&[("webhook-id", "msg_1"), ("webhook-timestamp", "1706832000")]);
        assert!(SigningHeaders::extract(&headers).is_none());
    }

    #[test]
    fn test_blank_header_counts_as_missing() {
        let headers = headers(&[
            ("webhook-id", "  "),
            ("webhook-timestamp", "1706832000"),
            ("webhook-signature", "v1,abc"),
        ]);
        assert!(SigningHeaders::extract(&headers).is_none());
    }

    #[test]
    fn test_families_are_not_mixed() {
        let headers = headers(&[
            ("webhook-id", "msg_1"),
            ("webhook-timestamp", "1706832000"),
            ("svix-signature", "v1,abc"),
        ]);
        assert!(SigningHeaders::extract(&headers).is_none());
    }
}
