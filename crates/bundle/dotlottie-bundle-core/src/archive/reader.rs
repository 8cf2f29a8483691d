use crate::archive::errors::{ArchiveError, ArchiveErrorKind};
use rawzip::{CompressionMethod, ReaderAt, ZipArchiveEntryWayfinder};
use std::io::{Cursor, Read};

/// Largest trailing region scanned for the end of central directory record.
const MAX_SEARCH_SPACE: u64 = 64 * 1024;

/// An indexed zip archive. Only file records are indexed; directory records
/// are skipped.
#[derive(Debug, Clone)]
pub struct Archive<R> {
    archive: rawzip::ZipArchive<R>,
    entries: Vec<EntryRecord>,
}

/// Location of a single file inside the archive.
#[derive(Debug, Clone)]
struct EntryRecord {
    name: String,
    compression: CompressionMethod,
    wayfinder: ZipArchiveEntryWayfinder,
}

impl Archive<()> {
    /// Opens an archive held in memory
    pub fn from_slice<T>(data: T) -> Result<Archive<Cursor<T>>, ArchiveError>
    where
        T: AsRef<[u8]>,
    {
        let archive = rawzip::ZipArchive::with_max_search_space(MAX_SEARCH_SPACE)
            .locate_in_slice(data)
            .map_err(|(_, err)| ArchiveErrorKind::Zip(err))?
            .into_zip_archive();
        Archive::index(archive)
    }
}

impl<R> Archive<R>
where
    R: ReaderAt,
{
    fn index(archive: rawzip::ZipArchive<R>) -> Result<Self, ArchiveError> {
        let mut buf = vec![0u8; rawzip::RECOMMENDED_BUFFER_SIZE];
        let mut records = Vec::new();
        let mut entries = archive.entries(&mut buf);
        while let Some(entry) = entries.next_entry().map_err(ArchiveErrorKind::Zip)? {
            let name = String::from_utf8_lossy(entry.file_path().as_ref()).into_owned();
            if name.ends_with('/') {
                continue;
            }

            records.push(EntryRecord {
                name,
                compression: entry.compression_method(),
                wayfinder: entry.wayfinder(),
            });
        }

        Ok(Archive {
            archive,
            entries: records,
        })
    }

    /// Entry names in central directory order
    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the archive holds no file entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a reader for an entry, decompressing if necessary
    ///
    /// Will return a `ArchiveErrorKind::EntryNotFound` if the requested path
    /// is not found.
    pub fn read_entry(&self, name: &str) -> Result<Box<dyn Read + '_>, ArchiveError> {
        let record = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ArchiveErrorKind::EntryNotFound(name.to_string()))?;

        let zip_entry = self
            .archive
            .get_entry(record.wayfinder)
            .map_err(ArchiveErrorKind::Zip)?;

        match record.compression {
            CompressionMethod::Store => Ok(Box::new(zip_entry.reader())),
            CompressionMethod::Deflate => {
                Ok(Box::new(CompressedReader::new(zip_entry.reader())))
            }
            other => Err(ArchiveErrorKind::UnsupportedCompression {
                entry: name.to_string(),
                method: format!("{:?}", other),
            }
            .into()),
        }
    }

    /// Reads an entry fully and decodes it as UTF-8 text
    pub fn read_text(&self, name: &str) -> Result<String, ArchiveError> {
        let hint = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.wayfinder.uncompressed_size_hint())
            .unwrap_or(0);

        let mut reader = self.read_entry(name)?;
        // size hints are untrusted; cap the preallocation
        let mut buf = Vec::with_capacity(hint.min(1 << 20) as usize);
        reader.read_to_end(&mut buf)?;
        String::from_utf8(buf).map_err(|_| ArchiveErrorKind::InvalidUtf8(name.to_string()).into())
    }
}

/// Wrapper that decompresses deflate-encoded data from a ZIP entry
#[derive(Debug)]
pub struct CompressedReader<R> {
    reader: flate2::read::DeflateDecoder<R>,
}

impl<R: Read> CompressedReader<R> {
    fn new(reader: R) -> Self {
        CompressedReader {
            reader: flate2::read::DeflateDecoder::new(reader),
        }
    }
}

impl<R> Read for CompressedReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}
