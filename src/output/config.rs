// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::output::writer::{self, JournalTarget};

/// Source of the timestamps stamped on every journal line.
pub trait TimestampProvider {
    fn now(&self) -> chrono::DateTime<chrono_tz::Tz>;
}

struct ConfiguredTzProvider {
    tz: chrono_tz::Tz,
}

impl TimestampProvider for ConfiguredTzProvider {
    fn now(&self) -> chrono::DateTime<chrono_tz::Tz> {
        chrono::Local::now().with_timezone(&self.tz)
    }
}

/// The configuration repository for the [`crate::output::Product`].
pub struct Config {
    pub(crate) timestamp_provider: Box<dyn TimestampProvider + Send + Sync + 'static>,
    pub(crate) target: JournalTarget,
    pub(crate) files_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new [`ConfigBuilder`]
    ///
    /// # Examples
    /// ```rust
    /// # use farm_uploader::output::*;
    ///
    /// let builder = Config::builder();
    /// ```
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// The builder for the [`Config`] object.
pub struct ConfigBuilder {
    timezone: Option<chrono_tz::Tz>,
    timestamp_provider: Option<Box<dyn TimestampProvider + Send + Sync + 'static>>,
    writer: Option<JournalTarget>,
    files_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            timezone: None,
            timestamp_provider: None,
            writer: Some(JournalTarget::Stdout(writer::StdoutWriter::new())),
            files_dir: None,
        }
    }

    pub fn timezone(mut self, timezone: chrono_tz::Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn with_timestamp_provider(
        mut self,
        timestamp_provider: Box<dyn TimestampProvider + Send + Sync + 'static>,
    ) -> Self {
        self.timestamp_provider = Some(timestamp_provider);
        self
    }

    pub fn with_buffer_output(mut self, buffer: Arc<Mutex<Vec<String>>>) -> Self {
        self.writer = Some(JournalTarget::Buffer(writer::BufferWriter::new(buffer)));
        self
    }

    /// Writes the journal to `path`, replacing any previous content.
    pub async fn with_file_output<P: AsRef<Path>>(
        mut self,
        path: P,
    ) -> Result<Self, std::io::Error> {
        let file = writer::FileWriter::create(path).await?;
        self.writer = Some(JournalTarget::File(file));
        Ok(self)
    }

    pub fn with_custom_output(
        mut self,
        custom: Box<dyn writer::JournalWriter + Send + Sync + 'static>,
    ) -> Self {
        self.writer = Some(JournalTarget::Custom(custom));
        self
    }

    /// Directory receiving the content of published files.
    ///
    /// Without it only the file metadata is journaled.
    pub fn files_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Config {
        let timezone = self.timezone.unwrap_or(chrono_tz::UTC);
        Config {
            timestamp_provider: self
                .timestamp_provider
                .unwrap_or_else(|| Box::new(ConfiguredTzProvider { tz: timezone })),
            target: self
                .writer
                .unwrap_or(JournalTarget::Stdout(writer::StdoutWriter::new())),
            files_dir: self.files_dir,
        }
    }
}
