use thiserror::Error;

use crate::StorageError;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Unknown card type {0}")]
    UnknownCardType(u8),
    #[error("Grid shape does not match declared size")]
    InvalidGridShape,
    #[error("Corrupt save data: {0}")]
    CorruptSave(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, GameError>;
