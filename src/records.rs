//! Length-prefixed UTF-8 records.
//!
//! Each record is a big-endian `u16` byte length followed by that many bytes
//! of UTF-8. There is no trailer: a reader learns the stream is exhausted when
//! the next length prefix cannot be read.

use std::io::{self, ErrorKind, Read, Write};

/// Write every record in order.
pub fn write_records<W, S>(mut writer: W, records: &[S]) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for record in records {
        let bytes = record.as_ref().as_bytes();
        let len = u16::try_from(bytes.len()).map_err(|_| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("record of {} bytes exceeds {} byte limit", bytes.len(), u16::MAX),
            )
        })?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(bytes)?;
    }
    writer.flush()
}

pub struct RecordReader<R> {
    inner: R,
    records_read: usize,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            records_read: 0,
        }
    }

    /// Read the next record.
    /// Exhaustion and truncation both surface as `UnexpectedEof`.
    pub fn next_record(&mut self) -> io::Result<String> {
        let mut prefix = [0u8; 2];
        self.inner.read_exact(&mut prefix)?;
        let len = u16::from_be_bytes(prefix) as usize;

        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        let record = String::from_utf8(buf)
            .map_err(|err| io::Error::new(ErrorKind::InvalidData, err))?;

        self.records_read += 1;
        Ok(record)
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }
}
