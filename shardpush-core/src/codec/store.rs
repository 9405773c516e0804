use super::{Compressor, FinishWrite};
use crate::error::Result;
use std::io::{Read, Write};

pub struct Store;

/// Pass-through writer for uncompressed tarballs.
struct StoreWriter<W: Write>(W);

impl<W: Write> Write for StoreWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishWrite for StoreWriter<W> {
    fn finish(mut self: Box<Self>) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl Compressor for Store {
    fn encoder<'a>(
        &self,
        dst: Box<dyn Write + 'a>,
        _level: i32,
    ) -> Result<Box<dyn FinishWrite + 'a>> {
        Ok(Box::new(StoreWriter(dst)))
    }

    fn decoder<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(src)
    }
}
