// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::convert::Infallible;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Destination for serialized journal lines.
///
/// Each call receives exactly one line without the trailing newline.
#[async_trait]
pub trait JournalWriter {
    async fn write_line(&self, line: &str) -> Result<(), io::Error>;
}

pub enum JournalTarget {
    // optimization: static dispatch for these known types
    Stdout(StdoutWriter),
    File(FileWriter),
    Buffer(BufferWriter),

    Custom(Box<dyn JournalWriter + Send + Sync + 'static>),
}

impl JournalTarget {
    pub(crate) async fn write_line(&self, line: &str) -> Result<(), io::Error> {
        use unwrap_infallible::UnwrapInfallible;

        match self {
            JournalTarget::File(file) => file.write_line(line).await?,
            JournalTarget::Stdout(stdout) => stdout.write_line(line).await.unwrap_infallible(),
            JournalTarget::Buffer(buffer) => buffer.write_line(line).await.unwrap_infallible(),

            JournalTarget::Custom(custom) => custom.write_line(line).await?,
        }
        Ok(())
    }
}

/// Journal file, truncated when opened.
pub struct FileWriter {
    file: Arc<Mutex<fs::File>>,
}

impl FileWriter {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let file = fs::File::create(path).await?;

        Ok(FileWriter {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub async fn write_line(&self, line: &str) -> Result<(), io::Error> {
        let mut handle = self.file.lock().await;

        let mut buf = Vec::<u8>::with_capacity(line.len() + 1);
        writeln!(buf, "{}", line)?;

        handle.write_all(&buf).await?;
        handle.flush().await?;

        Ok(())
    }
}

#[derive(Debug)]
pub struct BufferWriter {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl BufferWriter {
    pub fn new(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        Self { buffer }
    }

    pub async fn write_line(&self, line: &str) -> Result<(), Infallible> {
        self.buffer.lock().await.push(line.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StdoutWriter {}

impl StdoutWriter {
    pub fn new() -> Self {
        StdoutWriter {}
    }

    pub async fn write_line(&self, line: &str) -> Result<(), Infallible> {
        println!("{}", line);
        Ok(())
    }
}
