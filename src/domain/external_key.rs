//! Opaque, URL-safe entity references.
//!
//! An external key encodes the entity kind together with its store id, so a
//! key minted for one kind of entity can never be used to load another.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt;
use std::str::FromStr;

/// Kinds of stored entities that can be referenced externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ShortLink,
    LinkVersion,
    ClickStats,
    SiteConfig,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortLink => "ShortLink",
            Self::LinkVersion => "LinkVersion",
            Self::ClickStats => "ClickStats",
            Self::SiteConfig => "SiteConfig",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ShortLink" => Ok(Self::ShortLink),
            "LinkVersion" => Ok(Self::LinkVersion),
            "ClickStats" => Ok(Self::ClickStats),
            "SiteConfig" => Ok(Self::SiteConfig),
            _ => Err(()),
        }
    }
}

/// Encodes `kind` and `id` into an external key.
pub fn encode(kind: EntityKind, id: i64) -> String {
    URL_SAFE_NO_PAD.encode(format!("{kind}:{id}"))
}

/// Decodes `key` into its kind and id.
///
/// Malformed keys are logged and yield `None`.
pub fn decode(key: &str) -> Option<(EntityKind, i64)> {
    let parsed = URL_SAFE_NO_PAD
        .decode(key)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|raw| {
            let (kind, id) = raw.split_once(':')?;
            Some((kind.parse().ok()?, id.parse().ok()?))
        });

    if parsed.is_none() {
        tracing::warn!(external_key = key, "Failed to decode external key");
    }

    parsed
}

/// Decodes `key` and returns the id only if it refers to an entity of `expected` kind.
pub fn decode_for(expected: EntityKind, key: &str) -> Option<i64> {
    match decode(key)? {
        (kind, id) if kind == expected => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_url_safe() {
        let key = encode(EntityKind::ShortLink, 1234567890);
        assert!(
            key.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_decode_for_matching_kind() {
        let key = encode(EntityKind::LinkVersion, 42);
        assert_eq!(decode_for(EntityKind::LinkVersion, &key), Some(42));
    }

    #[test]
    fn test_decode_for_mismatched_kind() {
        let key = encode(EntityKind::ClickStats, 42);
        assert_eq!(decode_for(EntityKind::ShortLink, &key), None);
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(decode("***"), None);
        assert_eq!(decode(""), None);
        assert_eq!(decode(&URL_SAFE_NO_PAD.encode("ShortLink")), None);
        assert_eq!(decode(&URL_SAFE_NO_PAD.encode("Unknown:1")), None);
        assert_eq!(decode(&URL_SAFE_NO_PAD.encode("ShortLink:abc")), None);
    }
}
