#![deny(unsafe_code)]

use crate::ids::SubjectId;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid age window: min {min} must not exceed max {max}")]
    InvalidWindow { min: i32, max: i32 },

    #[error(
        "pre-birth age {pre_birth} must be negative and inside the window [{min}, {max}]"
    )]
    InvalidPreBirthAge { pre_birth: i32, min: i32, max: i32 },

    #[error("duplicate subject id {0}")]
    DuplicateSubject(SubjectId),

    #[error("invalid period configuration: {0}")]
    InvalidPeriods(String),

    #[error("invalid rescale rule for {variable}: {message}")]
    InvalidRescale { variable: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
