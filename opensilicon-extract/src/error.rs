use thiserror::Error;

use opensilicon_core::TechnologyError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Extraction cancelled")]
    Cancelled,

    #[error("Extraction worker panicked")]
    WorkerPanicked,

    #[error("Invalid extraction options: {0}")]
    InvalidOptions(String),

    #[error("Invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Technology(#[from] TechnologyError),
}
