pub mod app_data_dir;
pub mod attachment_store;
pub mod fragment_cache;

pub use app_data_dir::app_data_dir;
pub use attachment_store::FsAttachmentStore;
pub use fragment_cache::FileFragmentCache;
