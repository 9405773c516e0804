use super::{Compressor, FinishWrite};
use crate::error::Result;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

pub struct GzipCompressor;

impl<W: Write> FinishWrite for GzEncoder<W> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = GzEncoder::finish(*self)?;
        inner.flush()
    }
}

impl Compressor for GzipCompressor {
    fn encoder<'a>(
        &self,
        dst: Box<dyn Write + 'a>,
        level: i32,
    ) -> Result<Box<dyn FinishWrite + 'a>> {
        let level = level.clamp(0, 9) as u32;
        Ok(Box::new(GzEncoder::new(dst, Compression::new(level))))
    }

    fn decoder<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(Box::new(GzDecoder::new(src)))
    }
}
