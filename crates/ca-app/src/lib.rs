//! Company application orchestration layer
//!
//! Use cases for the final wizard step and the submission flow. Everything
//! here talks to storage, CAPTCHA and HTTP through the ports in `ca_core`.

pub mod app;
pub mod deps;
pub mod usecases;

pub use app::CompanyApplication;
pub use deps::AppDeps;
