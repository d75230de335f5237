//! # Application Dependencies
//!
//! Dependency grouping for [`CompanyApplication`](crate::CompanyApplication)
//! construction.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - Just parameter grouping

use std::sync::Arc;

use ca_core::ports::*;

/// All ports the use cases need. Every field is required.
pub struct AppDeps {
    // Persistence
    pub attachment_store: Arc<dyn AttachmentStorePort>,
    pub fragment_cache: Arc<dyn FragmentCachePort>,

    // Collaborators
    pub captcha: Arc<dyn CaptchaPort>,
    pub transport: Arc<dyn SubmissionTransportPort>,

    // Presentation
    pub submission_events: Arc<dyn SubmissionEventPort>,
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_app_deps_is_just_a_struct() {
        // AppDeps is constructed by struct literal only; there is no
        // builder API to keep in sync with its fields.
        #[allow(dead_code)]
        fn assert_plain_struct<T: Sized>(_: &T) {}

        #[allow(dead_code)]
        fn assert_app_deps_is_plain(deps: &super::AppDeps) {
            assert_plain_struct(deps);
        }
    }
}
