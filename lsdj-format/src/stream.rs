//! Byte streams the codecs read from and write to
//!
//! Every reader and writer in this crate goes through [`ByteStream`], so the
//! same code handles saves on disk and songs held in memory (for example a
//! project decompressed into a scratch buffer before it is parsed).

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{LsdjError, Result};

/// Positioned byte source and sink
///
/// `read` and `write` may transfer fewer bytes than requested when the
/// stream runs out of room; callers that need a full transfer use
/// [`ByteStream::read_exact`] and [`ByteStream::write_all`].
pub trait ByteStream {
    /// Read up to `buf.len()` bytes, returning how many were read
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write up to `buf.len()` bytes, returning how many were written
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Current position from the start of the stream
    fn tell(&mut self) -> io::Result<u64>;

    /// Move the cursor, returning the new position
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Read exactly `buf.len()` bytes
    ///
    /// `context` names the region being read for the error message.
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        if self.read(buf)? != buf.len() {
            return Err(LsdjError::UnexpectedEof { context });
        }
        Ok(())
    }

    /// Read one byte, or `None` at the end of the stream
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        Ok(match self.read(&mut byte)? {
            1 => Some(byte[0]),
            _ => None,
        })
    }

    /// Write all of `buf`
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let written = self.write(buf)?;
        if written != buf.len() {
            return Err(LsdjError::ShortWrite {
                written,
                expected: buf.len(),
            });
        }
        Ok(())
    }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        (**self).seek(pos)
    }
}

// =============================================================================
// File Stream
// =============================================================================

/// Stream over a file on disk
///
/// Reads go through a `BufReader`; a write first discards the read buffer so
/// the file cursor and the logical position agree.
pub struct FileStream {
    inner: BufReader<File>,
}

impl FileStream {
    /// Open an existing file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }

    /// Create (or truncate) a file for reading and writing
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(file))
    }

    /// Wrap an already opened file
    pub fn new(file: File) -> Self {
        Self {
            inner: BufReader::new(file),
        }
    }

    /// Flush pending writes and hand back the file
    pub fn into_inner(self) -> io::Result<File> {
        let mut file = self.inner.into_inner();
        file.flush()?;
        Ok(file)
    }
}

impl ByteStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Keep reading until the buffer is full or the file ends
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Seeking in place drops buffered read-ahead and re-syncs the file cursor
        self.inner.seek(SeekFrom::Current(0))?;
        self.inner.get_mut().write_all(buf)?;
        Ok(buf.len())
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

// =============================================================================
// Memory Stream
// =============================================================================

/// Bounds-checked cursor over a fixed-capacity buffer
///
/// The buffer never grows. Seeks clamp to `0..=capacity`, and reads and
/// writes near the end transfer only what fits.
#[derive(Debug, Clone)]
pub struct MemoryStream<B> {
    buffer: B,
    position: usize,
}

impl MemoryStream<Vec<u8>> {
    /// Zero-filled stream of `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(vec![0; capacity])
    }
}

impl<B: AsRef<[u8]>> MemoryStream<B> {
    /// Stream over `buffer`, positioned at the start
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Size of the underlying buffer
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// View of the whole buffer
    pub fn get_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Release the underlying buffer
    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteStream for MemoryStream<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.buffer.as_ref();
        let count = buf.len().min(data.len() - self.position);
        buf[..count].copy_from_slice(&data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let data = self.buffer.as_mut();
        let count = buf.len().min(data.len() - self.position);
        data[self.position..self.position + count].copy_from_slice(&buf[..count]);
        self.position += count;
        Ok(count)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position as u64)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let capacity = self.capacity() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(offset) => self.position as i128 + offset as i128,
            SeekFrom::End(offset) => capacity + offset as i128,
        };
        self.position = target.clamp(0, capacity) as usize;
        Ok(self.position as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_clamps_at_end() {
        let mut stream = MemoryStream::new(vec![1u8, 2, 3, 4]);
        stream.seek(SeekFrom::Start(2)).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[3, 4]);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert_eq!(stream.read_byte().unwrap(), None);
    }

    #[test]
    fn test_memory_write_truncates() {
        let mut stream = MemoryStream::with_capacity(3);
        assert_eq!(stream.write(&[9, 8, 7, 6]).unwrap(), 3);
        assert_eq!(stream.get_ref(), &[9, 8, 7]);

        stream.seek(SeekFrom::Start(1)).unwrap();
        let err = stream.write_all(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            LsdjError::ShortWrite {
                written: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn test_memory_seek_clamps() {
        let mut stream = MemoryStream::with_capacity(16);
        assert_eq!(stream.seek(SeekFrom::Start(100)).unwrap(), 16);
        assert_eq!(stream.seek(SeekFrom::Current(-40)).unwrap(), 0);
        assert_eq!(stream.seek(SeekFrom::End(-4)).unwrap(), 12);
        assert_eq!(stream.tell().unwrap(), 12);
    }

    #[test]
    fn test_memory_over_borrowed_slice() {
        let mut backing = [0u8; 4];
        {
            let mut stream = MemoryStream::new(&mut backing[..]);
            stream.seek(SeekFrom::Start(1)).unwrap();
            stream.write_all(&[0xAA, 0xBB]).unwrap();
        }
        assert_eq!(backing, [0, 0xAA, 0xBB, 0]);
    }

    #[test]
    fn test_read_exact_reports_region() {
        let mut stream = MemoryStream::with_capacity(2);
        let mut buf = [0u8; 4];
        let err = stream.read_exact(&mut buf, "save header").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected end of stream while reading save header"
        );
    }

    #[test]
    fn test_file_stream_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.bin");

        let mut stream = FileStream::create(&path).unwrap();
        stream.write_all(b"hello world").unwrap();
        stream.seek(SeekFrom::Start(6)).unwrap();

        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf, "test").unwrap();
        assert_eq!(&buf, b"world");
        assert_eq!(stream.tell().unwrap(), 11);

        // Writing after a buffered read lands at the logical position
        stream.seek(SeekFrom::Start(0)).unwrap();
        let mut first = [0u8; 1];
        stream.read_exact(&mut first, "test").unwrap();
        stream.write_all(b"E").unwrap();
        drop(stream.into_inner().unwrap());

        assert_eq!(std::fs::read(&path).unwrap(), b"hEllo world");
    }
}
