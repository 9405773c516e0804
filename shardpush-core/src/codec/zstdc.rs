use super::{Compressor, FinishWrite};
use crate::error::Result;
use std::io::{Read, Write};
use zstd::stream::write::Encoder;

pub struct ZstdCompressor;

impl<W: Write> FinishWrite for Encoder<'static, W> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = Encoder::finish(*self)?;
        inner.flush()
    }
}

impl Compressor for ZstdCompressor {
    fn encoder<'a>(
        &self,
        dst: Box<dyn Write + 'a>,
        level: i32,
    ) -> Result<Box<dyn FinishWrite + 'a>> {
        let mut enc = Encoder::new(dst, level.max(1))?;
        let workers = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);
        if workers > 1 {
            enc.multithread(workers)?;
        }
        Ok(Box::new(enc))
    }

    fn decoder<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(Box::new(zstd::stream::read::Decoder::new(src)?))
    }
}
