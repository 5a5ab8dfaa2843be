use std::io::{self, BufRead, ErrorKind, Read, Write};

use crate::traits::Channel;

/// A [`Channel`] built from a buffered reader and a writer.
///
/// The reader must be buffered so the next byte can be inspected without
/// consuming it. Both halves are owned; pass `&mut` references to keep
/// ownership with the caller.
#[derive(Debug)]
pub struct StreamChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    /// Create a channel from an inbound reader and an outbound writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R, W> StreamChannel<R, W> {
    /// Borrow the reader and writer.
    pub fn get_ref(&self) -> (&R, &W) {
        (&self.reader, &self.writer)
    }

    /// Mutably borrow the reader and writer.
    pub fn get_mut(&mut self) -> (&mut R, &mut W) {
        (&mut self.reader, &mut self.writer)
    }

    /// Consume the channel and return the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> Channel for StreamChannel<R, W> {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        Read::read_exact(&mut self.reader, buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.writer.write(&buf[offset..]) {
                Ok(0) => return Err(io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        loop {
            match self.writer.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}
