use std::io;

/// Chunk size used when discarding unwanted bytes from a channel.
const DISCARD_CHUNK_SIZE: usize = 8 * 1024;

/// A blocking duplex byte channel.
///
/// This is the only capability the framing layer needs from the outside
/// world: look at the next inbound byte without consuming it, read an exact
/// number of bytes, write bytes, and flush. End of stream is reported by
/// `peek_byte` as `Ok(None)` and by `read_exact` as
/// [`io::ErrorKind::UnexpectedEof`].
pub trait Channel {
    /// Return the next inbound byte without consuming it.
    ///
    /// Blocks until a byte is available. `Ok(None)` means the peer closed the
    /// inbound half.
    fn peek_byte(&mut self) -> io::Result<Option<u8>>;

    /// Fill `buf` completely from the inbound half.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Write all of `buf` to the outbound half.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush any bytes buffered on the outbound half.
    fn flush(&mut self) -> io::Result<()>;

    /// Consume and return the next inbound byte, or `Ok(None)` at end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.peek_byte()?.is_none() {
            return Ok(None);
        }
        let mut one = [0u8; 1];
        self.read_exact(&mut one)?;
        Ok(Some(one[0]))
    }

    /// Read and drop exactly `len` inbound bytes without buffering them all.
    fn discard(&mut self, mut len: usize) -> io::Result<()> {
        let mut chunk = [0u8; DISCARD_CHUNK_SIZE];
        while len > 0 {
            let n = len.min(chunk.len());
            self.read_exact(&mut chunk[..n])?;
            len -= n;
        }
        Ok(())
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).peek_byte()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).peek_byte()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
