mod submission_id;

pub use submission_id::SubmissionId;
