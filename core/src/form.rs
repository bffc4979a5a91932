//! Multipart form inputs and the encoder that turns them into a body.
//!
//! # Design
//! The client accumulates three kinds of form input: files referenced by
//! path, plain string fields, and already-open readers. Whenever any of them
//! is present the dispatcher encodes a `multipart/form-data` body instead of
//! JSON. Parts are written in a fixed order (path files, then fields, then
//! open files), each group sorted by field name.
//!
//! Files opened from a path live only for the duration of the encode call.
//! Open readers are moved out of the client by the dispatch that encodes
//! them, so each is sent at most once.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// An open reader submitted as a form file.
///
/// The name is reported as the part's filename and rendered by the curl
/// renderer; encoding fails for a file without one.
pub struct FormFile {
    name: Option<String>,
    reader: Box<dyn Read + Send>,
}

impl FormFile {
    /// Open `path` for reading; the path becomes the file's name.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::named(path.display().to_string(), file))
    }

    pub fn named(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name: Some(name.into()),
            reader: Box::new(reader),
        }
    }

    /// A reader with no retrievable name.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            name: None,
            reader: Box::new(reader),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for FormFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFile").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Form inputs accumulated on the client.
#[derive(Debug, Default)]
pub struct FormInputs {
    pub(crate) paths: BTreeMap<String, PathBuf>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) files: BTreeMap<String, FormFile>,
}

impl FormInputs {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.fields.is_empty() && self.files.is_empty()
    }

    pub fn summary(&self) -> FormSummary {
        FormSummary {
            paths: self
                .paths
                .iter()
                .map(|(field, path)| (field.clone(), path.display().to_string()))
                .collect(),
            fields: self.fields.clone(),
            files: self
                .files
                .iter()
                .map(|(field, file)| (field.clone(), file.name.clone()))
                .collect(),
        }
    }

    /// Encode every input into a multipart body, consuming the open files.
    pub(crate) fn encode(&mut self) -> Result<(Multipart, FormSummary), ClientError> {
        let summary = self.summary();
        let files = std::mem::take(&mut self.files);
        let mut encoder = FormEncoder::new();

        for (field, path) in &self.paths {
            let io_err = |source: io::Error| ClientError::FormIoError {
                field: field.clone(),
                source,
            };
            let mut file = File::open(path).map_err(io_err)?;
            encoder.write_file(field, &base_name(&path.to_string_lossy()), &mut file).map_err(io_err)?;
        }

        for (field, value) in &self.fields {
            encoder.write_field(field, value);
        }

        for (field, mut file) in files {
            let name = file.name.take().ok_or_else(|| ClientError::UnnamedFormFile(field.clone()))?;
            encoder
                .write_file(&field, &base_name(&name), &mut file.reader)
                .map_err(|source| ClientError::FormIoError {
                    field: field.clone(),
                    source,
                })?;
        }

        Ok((encoder.finish(), summary))
    }
}

fn base_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|base| base.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Form inputs as recorded on a dispatched request.
///
/// Open files are represented by their reported name, `None` when the
/// reader had none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSummary {
    pub paths: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, Option<String>>,
}

impl FormSummary {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.fields.is_empty() && self.files.is_empty()
    }
}

/// An encoded `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    boundary: String,
    bytes: Vec<u8>,
}

impl Multipart {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content-Type header value carrying the boundary parameter.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Incremental multipart writer.
#[derive(Debug)]
pub struct FormEncoder {
    boundary: String,
    buf: Vec<u8>,
    parts: usize,
}

impl Default for FormEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormEncoder {
    /// New encoder with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
            parts: 0,
        }
    }

    /// Write a file part, streaming `reader` to its end.
    pub fn write_file(&mut self, field: &str, filename: &str, reader: &mut dyn Read) -> io::Result<u64> {
        self.begin_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n",
            escape_param(field),
            escape_param(filename)
        ));
        io::copy(reader, &mut self.buf)
    }

    pub fn write_field(&mut self, field: &str, value: &str) {
        self.begin_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_param(field)
        ));
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Append the closing boundary.
    pub fn finish(mut self) -> Multipart {
        if self.parts > 0 {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Multipart {
            boundary: self.boundary,
            bytes: self.buf,
        }
    }

    fn begin_part(&mut self, headers: &str) {
        if self.parts > 0 {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buf.extend_from_slice(headers.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        self.parts += 1;
    }
}

/// Quote-escape a disposition parameter; line breaks are percent-encoded
/// so a name cannot start a new part header.
fn escape_param(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
