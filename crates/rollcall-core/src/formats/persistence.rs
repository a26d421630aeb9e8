//! Snapshot encoding.
//!
//! Layout: `RCAL` magic, one version byte, then the postcard-encoded
//! [`RegistrySnapshot`].

use crate::error::RollcallError;
use crate::registry::{Registry, RegistrySnapshot};
use crate::Result;

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"RCAL";
pub const SNAPSHOT_VERSION: u8 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

/// Encode the registry as a binary snapshot.
///
/// Records are written in id order, so equal registries encode to equal bytes.
pub fn encode_snapshot(registry: &Registry) -> Result<Vec<u8>> {
    let body = postcard::to_allocvec(&registry.snapshot())?;
    let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(body.len()));
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a binary snapshot back into a registry.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Registry> {
    let Some((magic, rest)) = bytes.split_first_chunk::<4>() else {
        return Err(RollcallError::Format("snapshot is truncated".into()));
    };
    if magic != SNAPSHOT_MAGIC {
        return Err(RollcallError::Format("not a rollcall snapshot".into()));
    }
    let Some((&version, body)) = rest.split_first() else {
        return Err(RollcallError::Format("snapshot is truncated".into()));
    };
    if version != SNAPSHOT_VERSION {
        return Err(RollcallError::Format(format!(
            "unsupported snapshot version {version}"
        )));
    }
    let snapshot: RegistrySnapshot = postcard::from_bytes(body)?;
    Ok(Registry::from_snapshot(snapshot))
}

/// Pretty JSON of the registry snapshot.
pub fn export_json(registry: &Registry) -> Result<String> {
    Ok(serde_json::to_string_pretty(&registry.snapshot())?)
}

/// Registry from JSON written by [`export_json`].
pub fn import_json(text: &str) -> Result<Registry> {
    let snapshot: RegistrySnapshot = serde_json::from_str(text)?;
    Ok(Registry::from_snapshot(snapshot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::Person;

    fn sample() -> Registry {
        let mut registry = Registry::new();
        let course = registry.add_course("Computing").unwrap();
        let module = registry.add_module("COM101", "12345").unwrap();
        let student = registry
            .add_student(Person::new("B00112233", "Ada", "L", "a@uni.ac.uk"), "10519C", course)
            .unwrap();
        registry.enrol(module, student).unwrap();
        registry.settings_mut("B00112233").colourblind = true;
        registry
    }

    #[test]
    fn snapshot_restores_registry() {
        let registry = sample();
        let bytes = encode_snapshot(&registry).unwrap();
        assert!(bytes.starts_with(SNAPSHOT_MAGIC));
        assert_eq!(bytes.get(4), Some(&SNAPSHOT_VERSION));

        let restored = decode_snapshot(&bytes).unwrap();
        assert_eq!(restored.snapshot(), registry.snapshot());
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_snapshot(&sample()).unwrap();
        let b = encode_snapshot(&sample()).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(decode_snapshot(b"RC").is_err());
        assert!(decode_snapshot(b"NOPE\x01").is_err());
        assert!(decode_snapshot(b"RCAL").is_err());

        let message = decode_snapshot(b"RCAL\x09").err().map(|e| e.to_string());
        assert_eq!(
            message,
            Some("format error: unsupported snapshot version 9".to_string())
        );
    }

    #[test]
    fn rejects_corrupt_body() {
        assert!(decode_snapshot(b"RCAL\x01\xff\xff\xff").is_err());
    }

    #[test]
    fn json_export_round_trips() {
        let registry = sample();
        let text = export_json(&registry).unwrap();
        assert!(text.contains("\"module_code\": \"COM101\""));
        let restored = import_json(&text).unwrap();
        assert_eq!(restored.snapshot(), registry.snapshot());
    }
}
