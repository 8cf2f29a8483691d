//! Shared `.lottie` fixtures.
//!
//! Archives are described as JSON under `fixtures/bundles/` (entry path plus
//! content, in physical archive order) and assembled into real zip bytes on
//! demand, so tests never depend on checked-in binaries.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    bundles: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Compression method written into a zip record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Store,
    #[default]
    Deflate,
    /// Payload is stored as-is but the record claims this method id.
    #[serde(skip)]
    Method(u16),
}

impl Compression {
    fn method_id(self) -> u16 {
        match self {
            Compression::Store => 0,
            Compression::Deflate => 8,
            Compression::Method(id) => id,
        }
    }
}

struct PendingEntry {
    path: String,
    data: Vec<u8>,
    compression: Compression,
}

/// Assembles a zip archive in memory. Entries keep the order they were added
/// in, which lets tests control physical layout.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<PendingEntry>,
    compression: Compression,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compression used by subsequent `json`/`text`/`bytes` calls.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn json(self, path: &str, value: &serde_json::Value) -> Self {
        let text = value.to_string();
        self.bytes(path, text.as_bytes())
    }

    pub fn text(self, path: &str, text: &str) -> Self {
        self.bytes(path, text.as_bytes())
    }

    pub fn bytes(mut self, path: &str, data: &[u8]) -> Self {
        let compression = self.compression;
        self.entries.push(PendingEntry {
            path: path.to_string(),
            data: data.to_vec(),
            compression,
        });
        self
    }

    /// Writes local headers, central directory, and end record.
    pub fn build(self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let mut crc = flate2::Crc::new();
            crc.update(&entry.data);
            let crc = crc.sum();

            let payload = match entry.compression {
                Compression::Store | Compression::Method(_) => entry.data.clone(),
                Compression::Deflate => {
                    let mut enc = flate2::write::DeflateEncoder::new(
                        Vec::new(),
                        flate2::Compression::default(),
                    );
                    enc.write_all(&entry.data)?;
                    enc.finish()?
                }
            };

            let name = entry.path.as_bytes();
            let offset = u32::try_from(out.len()).context("archive exceeds 4 GiB")?;
            let compressed_len = u32::try_from(payload.len()).context("entry too large")?;
            let uncompressed_len = u32::try_from(entry.data.len()).context("entry too large")?;
            let name_len = u16::try_from(name.len()).context("entry name too long")?;
            let method = entry.compression.method_id();

            // local file header
            out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&method.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&0x21u16.to_le_bytes());
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&compressed_len.to_le_bytes());
            out.extend_from_slice(&uncompressed_len.to_le_bytes());
            out.extend_from_slice(&name_len.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name);
            out.extend_from_slice(&payload);

            // central directory record
            central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&method.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0x21u16.to_le_bytes());
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&compressed_len.to_le_bytes());
            central.extend_from_slice(&uncompressed_len.to_le_bytes());
            central.extend_from_slice(&name_len.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u32.to_le_bytes());
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name);
        }

        let directory_offset = u32::try_from(out.len()).context("archive exceeds 4 GiB")?;
        let directory_len = u32::try_from(central.len()).context("directory too large")?;
        let count = u16::try_from(self.entries.len()).context("too many entries")?;
        out.extend_from_slice(&central);

        // end of central directory
        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&directory_len.to_le_bytes());
        out.extend_from_slice(&directory_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct BundleSpec {
    #[serde(default)]
    compression: Compression,
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntrySpec {
    Json {
        path: String,
        json: serde_json::Value,
    },
    Text {
        path: String,
        text: String,
    },
}

pub mod bundles {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.bundles.keys().cloned().collect()
    }

    /// Zip bytes for the named bundle fixture.
    pub fn bytes(name: &str) -> Result<Vec<u8>> {
        let rel = lookup(&MANIFEST.bundles, "bundle", name)?;
        let text = read_to_string(rel)?;
        let spec: BundleSpec = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse bundle fixture {rel}"))?;

        let mut builder = ArchiveBuilder::new().compression(spec.compression);
        for entry in &spec.entries {
            builder = match entry {
                EntrySpec::Json { path, json } => builder.json(path, json),
                EntrySpec::Text { path, text } => builder.text(path, text),
            };
        }
        builder
            .build()
            .with_context(|| format!("failed to assemble bundle fixture {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_bundle_assembles() {
        for name in bundles::keys() {
            let bytes = bundles::bytes(&name).unwrap();
            // smallest possible archive is a bare end record
            assert!(bytes.len() >= 22, "{name} produced {} bytes", bytes.len());
            assert_eq!(&bytes[bytes.len() - 22..bytes.len() - 18], b"PK\x05\x06");
        }
    }

    #[test]
    fn unknown_bundle_is_an_error() {
        let err = bundles::bytes("does-not-exist").unwrap_err();
        assert!(err.to_string().contains("does-not-exist"));
    }
}
