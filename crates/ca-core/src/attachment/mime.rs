use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MimeType(pub String);

impl MimeType {
    pub fn pdf() -> Self {
        Self("application/pdf".into())
    }
    pub fn doc() -> Self {
        Self("application/msword".into())
    }
    pub fn docx() -> Self {
        Self("application/vnd.openxmlformats-officedocument.wordprocessingml.document".into())
    }
    pub fn xls() -> Self {
        Self("application/vnd.ms-excel".into())
    }
    pub fn xlsx() -> Self {
        Self("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".into())
    }
    pub fn octet_stream() -> Self {
        Self("application/octet-stream".into())
    }

    /// Office document types accepted by the registration service.
    pub fn office_documents() -> Vec<MimeType> {
        vec![
            Self::pdf(),
            Self::doc(),
            Self::docx(),
            Self::xls(),
            Self::xlsx(),
        ]
    }

    /// Best-effort guess from a file extension; unknown extensions map to `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::pdf()),
            "doc" => Some(Self::doc()),
            "docx" => Some(Self::docx()),
            "xls" => Some(Self::xls()),
            "xlsx" => Some(Self::xlsx()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MimeType {
    fn from(s: &str) -> Self {
        MimeType(s.to_string())
    }
}
