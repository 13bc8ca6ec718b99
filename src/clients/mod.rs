pub mod grader_client;

pub use grader_client::{GraderClient, GradingApi};
