//! Where payloads come from, and go to, when the caller supplies neither.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;

pub const DEFAULT_STEM: &str = "default";

/// Owner read/write.
pub const DEFAULT_MODE: u32 = 0o600;

/// Supplies the fallback payload and sink for an extension.
pub trait DefaultLocator {
    /// Reads the whole fallback payload for `ext`.
    fn read_default(&self, ext: &str) -> io::Result<String>;

    /// Opens the fallback sink for `ext`, creating it if needed and appending
    /// to it otherwise.
    fn open_default(&self, ext: &str) -> io::Result<Box<dyn Write>>;
}

/// Resolves `<dir>/<stem>.<ext>` on the local filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsLocator {
    dir: PathBuf,
    stem: String,
    mode: u32,
}

impl FsLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    /// Permission bits for newly created files; ignored off unix.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn path_for(&self, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, ext))
    }
}

impl Default for FsLocator {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            stem: DEFAULT_STEM.to_owned(),
            mode: DEFAULT_MODE,
        }
    }
}

impl DefaultLocator for FsLocator {
    fn read_default(&self, ext: &str) -> io::Result<String> {
        let path = self.path_for(ext);
        debug!("Reading default payload from {}", path.display());
        fs::read_to_string(path)
    }

    fn open_default(&self, ext: &str) -> io::Result<Box<dyn Write>> {
        let path = self.path_for(ext);
        debug!("Opening default sink {}", path.display());

        let mut options = OpenOptions::new();
        options.read(true).append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }

        let file: File = options.open(path)?;
        Ok(Box::new(file))
    }
}

impl<L: DefaultLocator + ?Sized> DefaultLocator for &L {
    fn read_default(&self, ext: &str) -> io::Result<String> {
        (**self).read_default(ext)
    }

    fn open_default(&self, ext: &str) -> io::Result<Box<dyn Write>> {
        (**self).open_default(ext)
    }
}
