//! Container parser: archive entries → [`Bundle`].
//!
//! Entry discovery is a filter-and-sort over the flat name list. Each
//! conventional directory (`animations/`, `themes/`, `markers/`, `states/`)
//! contributes `.json` entries keyed by their path below the directory.
//! Results are ordered by normalized path, so archives written by different
//! packaging tools resolve identically.

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{debug, warn};
use rawzip::ReaderAt;

use crate::archive::Archive;
use crate::data::{
    AnimationDocument, Bundle, BundleWarning, Manifest, MarkerDefinition, StateDefinition,
    ThemeDefinition, WarningKind,
};
use crate::error::BundleError;

pub const MANIFEST_ENTRY: &str = "manifest.json";
const DOCUMENT_EXTENSION: &str = ".json";

/// Conventional location an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryClass {
    Animation,
    Theme,
    Marker,
    State,
}

impl EntryClass {
    pub const ALL: [EntryClass; 4] = [
        EntryClass::Animation,
        EntryClass::Theme,
        EntryClass::Marker,
        EntryClass::State,
    ];

    #[inline]
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Animation => "animations/",
            Self::Theme => "themes/",
            Self::Marker => "markers/",
            Self::State => "states/",
        }
    }
}

/// Canonical form of an entry path: forward slashes, no leading `./` or `/`.
pub fn normalize_entry_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    loop {
        if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
        } else {
            break;
        }
    }
    rest.to_string()
}

/// Classify a normalized path, returning its class and logical name.
pub fn classify_entry(normalized: &str) -> Option<(EntryClass, &str)> {
    EntryClass::ALL.into_iter().find_map(|class| {
        let rest = normalized.strip_prefix(class.directory())?;
        let split = rest.len().checked_sub(DOCUMENT_EXTENSION.len())?;
        let ext = rest.get(split..)?;
        if !ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION) {
            return None;
        }
        let name = &rest[..split];
        if name.is_empty() || name.ends_with('/') {
            return None;
        }
        Some((class, name))
    })
}

#[derive(Debug)]
struct Located<'a> {
    raw: &'a str,
    normalized: String,
    name: String,
}

/// Parse a `.lottie` archive held in memory.
pub fn parse(bytes: &[u8]) -> Result<Bundle, BundleError> {
    let archive = Archive::from_slice(bytes)?;
    parse_archive(&archive)
}

/// Parse an already opened archive.
pub fn parse_archive<R: ReaderAt>(archive: &Archive<R>) -> Result<Bundle, BundleError> {
    if archive.is_empty() {
        return Err(BundleError::NoAnimationFound);
    }
    debug!("indexing {} archive entries", archive.len());

    let mut located: HashMap<EntryClass, Vec<Located<'_>>> = HashMap::new();
    let mut manifest_entry = None;

    for raw in archive.entries() {
        let normalized = normalize_entry_path(raw);
        if normalized == MANIFEST_ENTRY {
            manifest_entry.get_or_insert(raw);
            continue;
        }
        let Some((class, name)) = classify_entry(&normalized) else {
            continue;
        };
        let name = name.to_string();
        located.entry(class).or_default().push(Located {
            raw,
            normalized,
            name,
        });
    }

    for entries in located.values_mut() {
        entries.sort_by(|a, b| {
            a.normalized
                .cmp(&b.normalized)
                .then_with(|| a.raw.cmp(b.raw))
        });
    }

    let mut warnings = Vec::new();
    let take = |class: EntryClass| located.get(&class).map(Vec::as_slice).unwrap_or(&[]);

    let animation_entries = take(EntryClass::Animation);
    let animations: Vec<AnimationDocument> =
        collect(archive, animation_entries, &mut warnings, |loc, data| {
            Ok(AnimationDocument {
                id: loc.name.clone(),
                entry: loc.raw.to_string(),
                data,
            })
        })
        .into_values()
        .collect();

    if animations.is_empty() {
        // a lone animation entry that fails to parse is reported as such
        if let [only] = animation_entries {
            let reason = warnings
                .iter()
                .find_map(|w| match &w.kind {
                    WarningKind::Malformed { reason } if w.entry == only.raw => {
                        Some(reason.clone())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| "unreadable".to_string());
            return Err(BundleError::MalformedManifest {
                entry: only.raw.to_string(),
                reason,
            });
        }
        return Err(BundleError::NoAnimationFound);
    }

    let mut themes = collect(archive, take(EntryClass::Theme), &mut warnings, |loc, payload| {
        Ok(ThemeDefinition {
            name: loc.name.clone(),
            entry: loc.raw.to_string(),
            payload,
            animations: Vec::new(),
        })
    });

    let markers = collect(archive, take(EntryClass::Marker), &mut warnings, |_, data| {
        serde_json::from_value::<MarkerDefinition>(data).map_err(|e| e.to_string())
    });

    let states = collect(archive, take(EntryClass::State), &mut warnings, |loc, payload| {
        Ok(StateDefinition {
            name: loc.name.clone(),
            entry: loc.raw.to_string(),
            payload,
        })
    });

    let manifest = manifest_entry.and_then(|raw| read_manifest(archive, raw, &mut warnings));
    if let Some(manifest) = &manifest {
        for item in &manifest.themes {
            if let Some(theme) = themes.get_mut(&item.id) {
                theme.animations = item.animations.clone();
            }
        }
    }

    debug!(
        "parsed bundle: {} animations, {} themes, {} markers, {} states, {} warnings",
        animations.len(),
        themes.len(),
        markers.len(),
        states.len(),
        warnings.len()
    );

    Ok(Bundle {
        animations,
        themes,
        markers,
        states,
        manifest,
        warnings,
    })
}

/// Read and convert sorted entries, keeping the first successful entry per
/// logical name.
fn collect<R, T, F>(
    archive: &Archive<R>,
    entries: &[Located<'_>],
    warnings: &mut Vec<BundleWarning>,
    convert: F,
) -> IndexMap<String, T>
where
    R: ReaderAt,
    F: Fn(&Located<'_>, serde_json::Value) -> Result<T, String>,
{
    let mut out = IndexMap::new();
    let mut claimed: HashMap<&str, &str> = HashMap::new();

    for loc in entries {
        if let Some(kept) = claimed.get(loc.name.as_str()) {
            warn!("dropping {}: {} already provides '{}'", loc.raw, kept, loc.name);
            warnings.push(BundleWarning {
                entry: loc.raw.to_string(),
                kind: WarningKind::Duplicate {
                    kept: kept.to_string(),
                },
            });
            continue;
        }

        let parsed = archive
            .read_text(loc.raw)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
            .and_then(|value| convert(loc, value));

        match parsed {
            Ok(item) => {
                claimed.insert(loc.name.as_str(), loc.raw);
                out.insert(loc.name.clone(), item);
            }
            Err(reason) => {
                warn!("skipping malformed entry {}: {}", loc.raw, reason);
                warnings.push(BundleWarning {
                    entry: loc.raw.to_string(),
                    kind: WarningKind::Malformed { reason },
                });
            }
        }
    }

    out
}

fn read_manifest<R: ReaderAt>(
    archive: &Archive<R>,
    raw: &str,
    warnings: &mut Vec<BundleWarning>,
) -> Option<Manifest> {
    let parsed = archive
        .read_text(raw)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Manifest>(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(manifest) => Some(manifest),
        Err(reason) => {
            warn!("ignoring malformed manifest {}: {}", raw, reason);
            warnings.push(BundleWarning {
                entry: raw.to_string(),
                kind: WarningKind::Malformed { reason },
            });
            None
        }
    }
}
