use std::io::{self, BufReader, Read, Write};
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StreamChannel;

/// Channel over a connected Unix domain socket.
pub type SocketChannel = StreamChannel<BufReader<SocketStream>, SocketStream>;

/// Listening Unix domain socket bound to a filesystem path.
///
/// The socket file is removed on drop, unless something else has replaced it
/// at the same path in the meantime.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    /// `(dev, ino)` of the socket file this listener created.
    identity: (u64, u64),
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Size of `sockaddr_un.sun_path`.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen with [`Self::DEFAULT_SOCKET_MODE`].
    ///
    /// A stale socket file at `path` is removed first; any other kind of file
    /// there is left alone and the bind fails.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind and listen, setting the socket file to `mode`.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        let bind_err = |source: io::Error| TransportError::Bind {
            path: path.clone(),
            source,
        };

        match std::fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_socket() => {
                debug!(?path, "removing stale socket");
                std::fs::remove_file(&path).map_err(bind_err)?;
            }
            Ok(_) => {
                return Err(bind_err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(bind_err(err)),
        }

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(bind_err)?;
        let meta = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(?path, "listening on unix domain socket");

        Ok(Self {
            listener,
            identity: (meta.dev(), meta.ino()),
            path,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<SocketStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted connection");
        Ok(SocketStream { inner: stream })
    }

    /// Connect to a listening socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<SocketStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| TransportError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(SocketStream { inner: stream })
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Ok(meta) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        if meta.file_type().is_socket() && (meta.dev(), meta.ino()) == self.identity {
            debug!(path = ?self.path, "cleaning up socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path replaced; skipping cleanup");
        }
    }
}

/// A connected Unix domain socket stream.
#[derive(Debug)]
pub struct SocketStream {
    inner: UnixStream,
}

impl SocketStream {
    /// Create a connected pair of streams, for in-process loopback.
    pub fn pair() -> Result<(Self, Self)> {
        let (a, b) = UnixStream::pair()?;
        Ok((Self { inner: a }, Self { inner: b }))
    }

    /// Duplicate the underlying descriptor.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            inner: self.inner.try_clone()?,
        })
    }

    /// Bound how long a read may block. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Bound how long a write may block. `None` blocks indefinitely.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Split into a buffered duplex channel.
    ///
    /// The read half goes through a cloned descriptor so the socket can be
    /// read and written from one channel value.
    pub fn into_channel(self) -> Result<SocketChannel> {
        let reader = BufReader::new(self.try_clone()?);
        Ok(StreamChannel::new(reader, self))
    }
}

impl Read for SocketStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SocketStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
