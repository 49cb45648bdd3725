use crate::error::AttachmentError;
use async_trait::async_trait;
use std::path::Path;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// The file name reported by the client. Only its extension is kept.
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(original_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes: bytes.into(),
        }
    }

    /// The extension of the original name including the leading dot, or an
    /// empty string. Extensions that are not plain ASCII alphanumerics are
    /// dropped.
    pub fn extension(&self) -> String {
        Path::new(&self.original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Builds the stored name of an upload from its upload time.
pub fn attachment_filename(unix_millis: i64, upload: &Upload) -> String {
    format!("{unix_millis}{}", upload.extension())
}

/// Persists uploaded files under generated names.
#[async_trait]
pub trait AttachmentStore: Send + Sync + 'static {
    /// Stores the upload and returns the generated file name.
    async fn store(&self, upload: Upload) -> Result<String, AttachmentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_kept() {
        assert_eq!(Upload::new("kiwi.jpg", vec![]).extension(), ".jpg");
        assert_eq!(Upload::new("archive.tar.GZ", vec![]).extension(), ".GZ");
        assert_eq!(Upload::new("dir/../kea.png", vec![]).extension(), ".png");
    }

    #[test]
    fn odd_extensions_are_dropped() {
        assert_eq!(Upload::new("noext", vec![]).extension(), "");
        assert_eq!(Upload::new("trailing.", vec![]).extension(), "");
        assert_eq!(Upload::new("weird.p g", vec![]).extension(), "");
    }

    #[test]
    fn filename_from_time_and_extension() {
        let upload = Upload::new("tui.jpeg", vec![1, 2, 3]);
        assert_eq!(attachment_filename(1700000000123, &upload), "1700000000123.jpeg");
        assert_eq!(
            attachment_filename(5, &Upload::new("blob", vec![])),
            "5"
        );
    }
}
