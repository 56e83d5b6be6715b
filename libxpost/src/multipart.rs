//! `multipart/form-data` body encoding
//!
//! Fields are written in call order. The body carries no length prefix; the
//! transport sets `Content-Length`, and `Content-Type` comes from
//! [`MultipartBody::content_type`].

use rand::Rng;

const BOUNDARY_PREFIX: &str = "----XpostFormBoundary";

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    Binary {
        name: String,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// Ordered list of fields waiting to be encoded.
#[derive(Debug, Clone, Default)]
pub struct MultipartEncoder {
    parts: Vec<Part>,
}

impl MultipartEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn binary(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::Binary {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Encode with a freshly generated boundary.
    ///
    /// The boundary is not checked against the content.
    pub fn encode(self) -> MultipartBody {
        self.encode_with_boundary(generate_boundary())
    }

    pub fn encode_with_boundary(self, boundary: impl Into<String>) -> MultipartBody {
        let boundary = boundary.into();
        let mut body = Vec::with_capacity(self.encoded_len_hint(&boundary));

        for part in &self.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

            match part {
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::Binary {
                    name,
                    filename,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; \
                             filename=\"{filename}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }

            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        MultipartBody { boundary, body }
    }

    fn encoded_len_hint(&self, boundary: &str) -> usize {
        let payload: usize = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { value, .. } => value.len(),
                Part::Binary { data, .. } => data.len(),
            })
            .sum();
        payload + (self.parts.len() + 1) * (boundary.len() + 128)
    }
}

/// An assembled, immutable multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

fn generate_boundary() -> String {
    let suffix: u64 = rand::thread_rng().gen_range(1_000_000_000..=9_999_999_999);
    format!("{BOUNDARY_PREFIX}{suffix}")
}
