use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Streams values into a JSON array, one element at a time.
///
/// Every element is flushed as soon as it is written, so a crash leaves the
/// records gathered so far on disk. The array is only well formed once
/// [`JsonArrayWriter::finish`] has run.
pub struct JsonArrayWriter<W: Write> {
    inner: W,
    written: usize,
}

impl JsonArrayWriter<BufWriter<File>> {
    /// Truncates `path` and opens a new array in it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut inner: W) -> Result<Self> {
        inner.write_all(b"[\n")?;
        inner.flush()?;
        Ok(Self { inner, written: 0 })
    }

    /// Appends one pretty-printed element.
    pub fn append<T: Serialize>(&mut self, item: &T) -> Result<()> {
        if self.written > 0 {
            self.inner.write_all(b",\n")?;
        }
        serde_json::to_writer_pretty(&mut self.inner, item)?;
        self.inner.flush()?;
        self.written += 1;
        Ok(())
    }

    /// The number of elements appended so far.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Closes the array and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if self.written > 0 {
            self.inner.write_all(b"\n")?;
        }
        self.inner.write_all(b"]")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes one compact JSON value per line.
pub fn write_json_lines<T: Serialize>(path: impl AsRef<Path>, items: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
