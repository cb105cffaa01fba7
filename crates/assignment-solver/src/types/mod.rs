//! Core types for the assignment solver

pub mod response;
pub mod upload;

pub use response::{AnswerResponse, Resolution, ResolutionSource};
pub use upload::UploadedFile;
