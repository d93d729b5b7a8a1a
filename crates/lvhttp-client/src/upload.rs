//! Multipart upload parts.

use std::path::Path;

use lvhttp_core::{RequestError, RequestResult};

/// MIME type used for binary parts when none is given.
pub const DEFAULT_PART_MIME: &str = "application/octet-stream";

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub(crate) name: String,
    pub(crate) body: PartBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PartBody {
    Text(String),
    Bytes {
        data: Vec<u8>,
        file_name: Option<String>,
        mime: String,
    },
}

impl UploadPart {
    /// A plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: PartBody::Text(value.into()),
        }
    }

    /// A binary field with an optional file name.
    pub fn bytes(name: impl Into<String>, data: Vec<u8>, file_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            body: PartBody::Bytes {
                data,
                file_name,
                mime: DEFAULT_PART_MIME.to_string(),
            },
        }
    }

    /// A file read from disk, sent under its own file name.
    pub fn file(name: impl Into<String>, path: &Path) -> RequestResult<Self> {
        let data = std::fs::read(path).map_err(|e| RequestError::from_io_error(&e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self::bytes(name, data, file_name))
    }

    /// One part per `(field, path)` pair, all read up front.
    pub fn files<'a, I, N>(files: I) -> RequestResult<Vec<Self>>
    where
        I: IntoIterator<Item = (N, &'a Path)>,
        N: Into<String>,
    {
        files
            .into_iter()
            .map(|(name, path)| Self::file(name, path))
            .collect()
    }

    /// Override the MIME type of a binary part. No effect on text parts.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        if let PartBody::Bytes { mime: current, .. } = &mut self.body {
            *current = mime.into();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the part's body in bytes.
    pub fn len(&self) -> usize {
        match &self.body {
            PartBody::Text(value) => value.len(),
            PartBody::Bytes { data, .. } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
