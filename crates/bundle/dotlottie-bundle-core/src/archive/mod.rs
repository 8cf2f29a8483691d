//! Read named entries out of a dotLottie zip archive.
//!
//! A `.lottie` file is an ordinary zip container. This module does the
//! minimum needed to work with one: locate the central directory, index the
//! file records, and decompress an entry by name. Store and deflate are the
//! only compression methods packaging tools emit, so they are the only ones
//! supported.
//!
//! ```text
//! Archive
//! ├── from_slice(bytes) → index of file records (directories skipped)
//! ├── entries()         → names in central directory order
//! └── read_text(name)   → decompressed UTF-8 contents
//! ```
//!
//! Nothing here assumes a physical layout: callers discover entries by
//! filtering the name list, never by position.

mod errors;
mod reader;

pub use errors::*;
pub use reader::*;

#[cfg(test)]
mod tests {
    use super::*;
    use dotlottie_test_fixtures::{ArchiveBuilder, Compression};
    use serde_json::json;

    #[test]
    fn lists_entries_in_directory_order() {
        let bytes = ArchiveBuilder::new()
            .json("manifest.json", &json!({ "version": "1" }))
            .json("animations/b.json", &json!({ "frames": 1 }))
            .json("animations/a.json", &json!({ "frames": 2 }))
            .build()
            .unwrap();

        let archive = Archive::from_slice(bytes.as_slice()).unwrap();
        let names: Vec<&str> = archive.entries().collect();
        assert_eq!(
            names,
            vec!["manifest.json", "animations/b.json", "animations/a.json"]
        );
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn reads_stored_and_deflated_entries() {
        let bytes = ArchiveBuilder::new()
            .compression(Compression::Store)
            .text("stored.json", r#"{"kind":"stored"}"#)
            .compression(Compression::Deflate)
            .text("deflated.json", r#"{"kind":"deflated"}"#)
            .build()
            .unwrap();

        let archive = Archive::from_slice(bytes).unwrap();
        assert_eq!(archive.read_text("stored.json").unwrap(), r#"{"kind":"stored"}"#);
        assert_eq!(
            archive.read_text("deflated.json").unwrap(),
            r#"{"kind":"deflated"}"#
        );
    }

    #[test]
    fn missing_entry_is_reported_by_name() {
        let bytes = ArchiveBuilder::new()
            .text("animations/a.json", "{}")
            .build()
            .unwrap();
        let archive = Archive::from_slice(bytes).unwrap();

        let Err(err) = archive.read_text("animations/missing.json") else {
            panic!("expected missing entry error");
        };
        assert!(matches!(
            err.kind(),
            ArchiveErrorKind::EntryNotFound(name) if name == "animations/missing.json"
        ));
    }

    #[test]
    fn directory_records_are_not_listed() {
        let bytes = ArchiveBuilder::new()
            .compression(Compression::Store)
            .bytes("animations/", b"")
            .text("animations/a.json", "{}")
            .build()
            .unwrap();
        let archive = Archive::from_slice(bytes).unwrap();
        assert_eq!(archive.entries().collect::<Vec<_>>(), vec!["animations/a.json"]);
    }

    #[test]
    fn unsupported_compression_is_reported_per_entry() {
        let bytes = ArchiveBuilder::new()
            .compression(Compression::Method(12))
            .text("animations/bz.json", "{}")
            .compression(Compression::Store)
            .text("animations/ok.json", "{}")
            .build()
            .unwrap();
        let archive = Archive::from_slice(bytes).unwrap();
        assert_eq!(archive.len(), 2);

        let err = archive.read_text("animations/bz.json").unwrap_err();
        assert!(matches!(
            err.kind(),
            ArchiveErrorKind::UnsupportedCompression { entry, .. } if entry == "animations/bz.json"
        ));
        assert_eq!(archive.read_text("animations/ok.json").unwrap(), "{}");
    }

    #[test]
    fn invalid_utf8_is_an_entry_error() {
        let bytes = ArchiveBuilder::new()
            .bytes("animations/bin.json", &[0xff, 0xfe, 0x00])
            .build()
            .unwrap();
        let archive = Archive::from_slice(bytes).unwrap();
        let err = archive.read_text("animations/bin.json").unwrap_err();
        assert!(matches!(err.kind(), ArchiveErrorKind::InvalidUtf8(_)));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let err = Archive::from_slice(b"definitely not a zip file".as_slice()).unwrap_err();
        assert!(matches!(err.kind(), ArchiveErrorKind::Zip(_)));
    }
}
