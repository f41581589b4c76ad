//! Helpers to fetch the raw rom bytes, either from a single file or from a zip archive of roms.
use std::{
    fs::File,
    io::{Cursor, Read, Seek},
    path::Path,
};

use zip::{read::ZipArchive, result::ZipError};

use crate::error::RomError;

/// A zip file with one rom per entry
pub struct RomArchives<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl RomArchives<File> {
    /// Will open the archive at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Self::new(File::open(path)?)
    }
}

impl<'a> RomArchives<Cursor<&'a [u8]>> {
    /// Will read the archive from memory
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, RomError> {
        Self::new(Cursor::new(data))
    }
}

impl<R: Read + Seek> RomArchives<R> {
    pub fn new(reader: R) -> Result<Self, RomError> {
        Ok(RomArchives {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// The entry names, sorted
    pub fn file_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.archive.file_names().collect();
        names.sort_unstable();
        names
    }

    /// Will decompress the rom with the given name
    pub fn get_file_data(&mut self, name: &str) -> Result<Rom, RomError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(RomError::NotFound(name.to_string())),
            Err(err) => return Err(err.into()),
        };
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Rom::new(name, data))
    }
}

/// A program image together with its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    name: String,
    /// The raw program bytes, copied verbatim into memory
    data: Box<[u8]>,
}

impl Rom {
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read the whole file as a rom, the file name is used as the rom name
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Rom::new(&name, data))
    }

    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
