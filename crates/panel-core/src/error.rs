#![deny(unsafe_code)]

use panel_ingest::IngestError;
use panel_model::{InformantId, ModelError, SubjectId};

use crate::codec::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid legacy pattern `{pattern}`: {message}")]
    LegacyPattern { pattern: String, message: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("row {row} of table {table} has an empty subject id")]
    MissingSubjectId { table: String, row: usize },

    #[error("subject {subject} has no birth year")]
    MissingBirthYear { subject: SubjectId },

    #[error("row {row} of table {table} has an empty informant key")]
    MissingInformantKey { table: String, row: usize },

    #[error("duplicate informant key {informant} in table {table}")]
    DuplicateInformant {
        informant: InformantId,
        table: String,
    },

    #[error("subject {subject} has no informant link")]
    MissingInformantLink { subject: SubjectId },

    #[error("informant {informant} (linked from subject {subject}) is absent from table {table}")]
    UnknownInformant {
        informant: InformantId,
        subject: SubjectId,
        table: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
