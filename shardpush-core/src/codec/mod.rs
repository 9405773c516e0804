use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecId {
    Store = 0,
    Zstd = 1,
    Gzip = 2,
}

impl CodecId {
    /// File extension of archives produced with this codec (without the leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            CodecId::Store => "tar",
            CodecId::Zstd => "tar.zst",
            CodecId::Gzip => "tar.gz",
        }
    }

    pub fn default_level(self) -> i32 {
        match self {
            CodecId::Store => 0,
            CodecId::Zstd => 3,
            CodecId::Gzip => 6,
        }
    }

    pub fn compressor(self) -> Box<dyn Compressor> {
        match self {
            CodecId::Store => Box::new(store::Store),
            CodecId::Zstd => Box::new(zstdc::ZstdCompressor),
            CodecId::Gzip => Box::new(gzip::GzipCompressor),
        }
    }

    /// Guess the codec from an archive file name.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        [CodecId::Zstd, CodecId::Gzip, CodecId::Store]
            .into_iter()
            .find(|c| name.ends_with(&format!(".{}", c.extension())))
    }
}

impl FromStr for CodecId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "store" | "tar" | "none" => Ok(CodecId::Store),
            "zstd" | "zst" => Ok(CodecId::Zstd),
            "gzip" | "gz" => Ok(CodecId::Gzip),
            other => Err(format!("unknown codec '{other}' (expected gzip, zstd or store)")),
        }
    }
}

/// A compressing writer that must be finished explicitly so trailer write
/// errors surface instead of being swallowed on drop.
pub trait FinishWrite: Write {
    fn finish(self: Box<Self>) -> std::io::Result<()>;
}

pub trait Compressor: Send + Sync {
    fn encoder<'a>(&self, dst: Box<dyn Write + 'a>, level: i32)
    -> Result<Box<dyn FinishWrite + 'a>>;
    fn decoder<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>>;
}

pub mod gzip;
pub mod store;
pub mod zstdc;
