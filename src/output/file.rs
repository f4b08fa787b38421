// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::Path;

use crate::spec;

/// A file attached to a test run set or to a single test run.
///
/// # Examples
///
/// ```
/// # use farm_uploader::output::*;
/// let file = AdditionalFile::builder("home.png", vec![0x89, 0x50])
///     .description("From AWS")
///     .build();
/// assert_eq!(file.content_type(), &mime::IMAGE_PNG);
/// ```
pub struct AdditionalFile {
    name: String,
    description: Option<String>,
    content_type: mime::Mime,
    content: Vec<u8>,
}

impl AdditionalFile {
    pub fn builder(name: &str, content: Vec<u8>) -> AdditionalFileBuilder {
        AdditionalFileBuilder::new(name, content)
    }

    pub fn new(name: &str, description: &str, content: Vec<u8>) -> Self {
        AdditionalFileBuilder::new(name, content)
            .description(description)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &mime::Mime {
        &self.content_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn to_artifact(&self, path: Option<&Path>) -> spec::AdditionalFile {
        spec::AdditionalFile {
            name: self.name.clone(),
            description: self.description.clone(),
            size: self.content.len() as u64,
            content_type: Some(self.content_type.clone()),
            path: path.map(|p| p.display().to_string()),
        }
    }
}

pub struct AdditionalFileBuilder {
    name: String,
    description: Option<String>,
    content_type: Option<mime::Mime>,
    content: Vec<u8>,
}

impl AdditionalFileBuilder {
    fn new(name: &str, content: Vec<u8>) -> Self {
        AdditionalFileBuilder {
            name: name.to_owned(),
            description: None,
            content_type: None,
            content,
        }
    }

    pub fn description(mut self, value: &str) -> Self {
        self.description = Some(value.to_owned());
        self
    }

    pub fn content_type(mut self, value: mime::Mime) -> Self {
        self.content_type = Some(value);
        self
    }

    pub fn build(self) -> AdditionalFile {
        let content_type = self
            .content_type
            .unwrap_or_else(|| content_type_for(&self.name));

        AdditionalFile {
            name: self.name,
            description: self.description,
            content_type,
            content: self.content,
        }
    }
}

/// Guesses a content type from the file extension.
pub fn content_type_for(name: &str) -> mime::Mime {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("txt" | "log") => mime::TEXT_PLAIN,
        Some("xml") => mime::TEXT_XML,
        Some("json") => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
