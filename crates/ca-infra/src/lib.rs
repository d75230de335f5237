pub mod captcha;
pub mod fs;
pub mod http;
pub mod memory;

pub use captcha::InMemoryCaptcha;
pub use fs::{FileFragmentCache, FsAttachmentStore};
pub use http::HttpSubmissionTransport;
pub use memory::{InMemoryAttachmentStore, InMemoryFragmentCache};
