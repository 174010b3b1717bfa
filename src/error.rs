use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scanner::CidrError;

/// Fatal and reportable failures of a resolution run
#[derive(Debug, Error)]
pub enum Error {
    #[error("resolver initialization failed: {0}")]
    ResolverInit(String),

    #[error(transparent)]
    Parse(#[from] CidrError),

    #[error("range holds {total} addresses, more than the limit of {limit}")]
    RangeTooLarge { total: u64, limit: u64 },

    #[error("could not open {} for writing: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed writing results: {0}")]
    Write(#[from] io::Error),

    #[error("failed encoding results: {0}")]
    Encode(#[from] csv::Error),

    #[error("failed encoding results: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
