// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scene archive container.
//!
//! A scene file is a zip archive whose `Home.xml` entry holds the scene
//! document; the remaining entries are furniture meshes and textures
//! referenced by relative entry names.

use std::io::{Cursor, Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::Home;
use crate::parser::parse_home;

pub const HOME_XML_ENTRY: &str = "Home.xml";

/// A scene archive opened for reading.
pub struct SceneArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> SceneArchive<R> {
    /// Open an archive and verify it carries a `Home.xml` entry.
    /// A missing entry is fatal for the whole archive.
    pub fn open(reader: R) -> Result<Self> {
        let zip = ZipArchive::new(reader)?;
        if zip.index_for_name(HOME_XML_ENTRY).is_none() {
            return Err(Error::MissingHomeXml);
        }
        Ok(Self { zip })
    }

    /// Read and parse the scene document.
    pub fn home(&mut self) -> Result<Home> {
        let xml = self.entry_string(HOME_XML_ENTRY)?;
        parse_home(&xml)
    }

    /// Raw bytes of a model or texture entry, as referenced by a
    /// furniture `model` attribute.
    pub fn model_bytes(&mut self, entry: &str) -> Result<Vec<u8>> {
        let mut file = self
            .zip
            .by_name(entry)
            .map_err(|_| Error::MissingEntry(entry.to_string()))?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    fn entry_string(&mut self, entry: &str) -> Result<String> {
        let mut file = self
            .zip
            .by_name(entry)
            .map_err(|_| Error::MissingEntry(entry.to_string()))?;
        let mut text = String::with_capacity(file.size() as usize);
        file.read_to_string(&mut text)?;
        Ok(text)
    }
}

impl SceneArchive<Cursor<Vec<u8>>> {
    /// Open an archive held entirely in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::open(Cursor::new(bytes))
    }
}

/// Builds a scene archive for writing.
pub struct SceneWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl SceneWriter {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Write the scene document. Must be called exactly once.
    pub fn write_home_xml(&mut self, xml: &str) -> Result<()> {
        self.write_entry(HOME_XML_ENTRY, xml.as_bytes())
    }

    /// Write an auxiliary entry (model mesh, texture, icon).
    pub fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for SceneWriter {
    fn default() -> Self {
        Self::new()
    }
}
