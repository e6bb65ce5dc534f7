// SPDX-License-Identifier: AGPL-3.0-or-later
//! ODF package writer
//!
//! An ODF document is a zip archive whose first entry is an uncompressed
//! `mimetype` file, followed by the XML parts and a manifest listing them.

use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::escape::escape_attribute;
use crate::traits::Result;

/// Entry in `META-INF/manifest.xml`
#[derive(Debug, Clone)]
struct ManifestEntry {
    full_path: String,
    media_type: String,
}

/// Builder for ODF zip packages
pub struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
    manifest_entries: Vec<ManifestEntry>,
}

impl PackageWriter<Cursor<Vec<u8>>> {
    /// Create a package writer that writes to memory
    pub fn new() -> Self {
        Self::with_writer(Cursor::new(Vec::new()))
    }

    /// Finish the package and return its bytes
    pub fn finish_to_bytes(self) -> Result<Vec<u8>> {
        Ok(self.finish()?.into_inner())
    }
}

impl Default for PackageWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
            manifest_entries: Vec::new(),
        }
    }

    /// Write the `mimetype` entry and the manifest root entry.
    ///
    /// Must be called before any [`add_file`](Self::add_file) so that the
    /// type marker is the first entry of the archive.
    pub fn set_mimetype(&mut self, mimetype: &str) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip_writer.start_file("mimetype", options)?;
        self.zip_writer.write_all(mimetype.as_bytes())?;

        self.manifest_entries.push(ManifestEntry {
            full_path: "/".to_string(),
            media_type: mimetype.to_string(),
        });
        Ok(())
    }

    /// Add a deflated file and record it in the manifest
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.manifest_entries.push(ManifestEntry {
            full_path: path.to_string(),
            media_type: guess_media_type(path).to_string(),
        });

        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip_writer.start_file(path, options)?;
        self.zip_writer.write_all(content)?;
        Ok(())
    }

    fn generate_manifest(&self) -> String {
        let mut manifest = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
"#,
        );

        for entry in &self.manifest_entries {
            manifest.push_str(&format!(
                "  <manifest:file-entry manifest:full-path=\"{}\" manifest:media-type=\"{}\"/>\n",
                escape_attribute(&entry.full_path),
                escape_attribute(&entry.media_type)
            ));
        }

        manifest.push_str("</manifest:manifest>\n");
        manifest
    }

    /// Write the manifest and close the archive
    pub fn finish(mut self) -> Result<W> {
        let manifest = self.generate_manifest();
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip_writer.start_file("META-INF/manifest.xml", options)?;
        self.zip_writer.write_all(manifest.as_bytes())?;

        Ok(self.zip_writer.finish()?)
    }
}

fn guess_media_type(path: &str) -> &'static str {
    if path.ends_with(".xml") {
        "text/xml"
    } else if path.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn build() -> Vec<u8> {
        let mut writer = PackageWriter::new();
        writer
            .set_mimetype("application/vnd.oasis.opendocument.text")
            .unwrap();
        writer.add_file("content.xml", b"<content/>").unwrap();
        writer.add_file("meta.xml", b"<meta/>").unwrap();
        writer.finish_to_bytes().unwrap()
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let mut archive = ZipArchive::new(Cursor::new(build())).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);

        let mut body = String::new();
        first.read_to_string(&mut body).unwrap();
        assert_eq!(body, "application/vnd.oasis.opendocument.text");
    }

    #[test]
    fn test_other_entries_deflated() {
        let mut archive = ZipArchive::new(Cursor::new(build())).unwrap();
        for name in ["content.xml", "meta.xml", "META-INF/manifest.xml"] {
            let entry = archive.by_name(name).unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Deflated, "{name}");
        }
    }

    #[test]
    fn test_manifest_lists_entries() {
        let mut archive = ZipArchive::new(Cursor::new(build())).unwrap();
        let mut manifest = String::new();
        archive
            .by_name("META-INF/manifest.xml")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();

        assert!(manifest.contains(
            r#"manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text""#
        ));
        assert!(manifest.contains(r#"manifest:full-path="content.xml" manifest:media-type="text/xml""#));
        assert!(manifest.contains(r#"manifest:full-path="meta.xml""#));
    }
}
