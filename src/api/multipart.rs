//! Minimal `multipart/form-data` encoder for the `/classify` upload.
//!
//! ureq 2 sends raw bytes only, so the body is assembled here: one part per
//! text field or file, separated by a random boundary.

use uuid::Uuid;

/// An in-memory multipart body under construction.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
    parts: usize,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("mailtriage-{}", Uuid::new_v4().simple()))
    }

    /// Build with a fixed boundary. Used by tests that assert on the body.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
            parts: 0,
        }
    }

    /// Append a plain text field.
    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.open_part();
        self.push_line(&format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quoted(name)
        ));
        self.push_line("");
        self.body.extend_from_slice(value.as_bytes());
        self.push_line("");
        self
    }

    /// Append a file part.
    pub fn file(
        &mut self,
        name: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> &mut Self {
        self.open_part();
        self.push_line(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
            escape_quoted(name),
            escape_quoted(filename)
        ));
        self.push_line(&format!("Content-Type: {content_type}"));
        self.push_line("");
        self.body.extend_from_slice(bytes);
        self.push_line("");
        self
    }

    /// Number of parts added so far.
    pub fn len(&self) -> usize {
        self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts == 0
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the body and return its bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.body.clone();
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }

    fn open_part(&mut self) {
        self.parts += 1;
        let delimiter = format!("--{}", self.boundary);
        self.push_line(&delimiter);
    }

    fn push_line(&mut self, line: &str) {
        self.body.extend_from_slice(line.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }
}

/// Guess an upload's MIME type from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".txt") {
        "text/plain"
    } else if lower.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_body_layout() {
        let mut form = MultipartForm::with_boundary("XYZ");
        form.text("email_text", "Hello");
        let body = String::from_utf8(form.to_bytes()).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\nContent-Disposition: form-data; name=\"email_text\"\r\n\r\nHello\r\n--XYZ--\r\n"
        );
        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn file_parts_carry_filename_and_type() {
        let mut form = MultipartForm::with_boundary("B");
        form.file("files[]", "a.txt", "text/plain", b"one")
            .file("files[]", "b.pdf", "application/pdf", b"two");
        let body = String::from_utf8(form.to_bytes()).unwrap();
        assert!(body.contains(
            "name=\"files[]\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\none\r\n"
        ));
        assert!(body.contains("filename=\"b.pdf\"\r\nContent-Type: application/pdf"));
        assert_eq!(body.matches("--B\r\n").count(), 2);
        assert!(body.ends_with("--B--\r\n"));
    }

    #[test]
    fn quotes_in_filenames_are_escaped() {
        let mut form = MultipartForm::with_boundary("B");
        form.file("files[]", "we\"ird.txt", "text/plain", b"");
        let body = String::from_utf8(form.to_bytes()).unwrap();
        assert!(body.contains("filename=\"we\\\"ird.txt\""));
    }

    #[test]
    fn random_boundaries_differ() {
        assert_ne!(MultipartForm::new().content_type(), MultipartForm::new().content_type());
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("mail.TXT"), "text/plain");
        assert_eq!(content_type_for("mail.pdf"), "application/pdf");
        assert_eq!(content_type_for("mail.eml"), "application/octet-stream");
    }
}
