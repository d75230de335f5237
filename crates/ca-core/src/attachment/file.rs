use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::MimeType;

/// A user-selected document: the authoritative binary plus the name and type
/// reported at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub name: String,
    pub mime: MimeType,
    pub data: Bytes,
}

impl AttachmentFile {
    pub fn new(name: impl Into<String>, mime: MimeType, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime,
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Display metadata derived from the binary. This is the only way a
    /// mirror entry should ever be produced.
    pub fn meta(&self) -> AttachmentMeta {
        AttachmentMeta {
            name: self.name.clone(),
            size: self.size(),
            mime: self.mime.0.clone(),
        }
    }
}

/// Display-only copy of an attachment's metadata, kept in the `restOfData`
/// fragment. Never trusted as the binary itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_mirrors_binary() {
        let file = AttachmentFile::new("deed.pdf", MimeType::pdf(), vec![0u8; 2048]);
        let meta = file.meta();
        assert_eq!(meta.size, 2048);
        assert_eq!(meta.name, "deed.pdf");
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({"name": "deed.pdf", "size": 2048, "type": "application/pdf"})
        );
    }
}
