use crate::model::ListKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_index - index {index} is out of range for {list} list of length {len}")]
    InvalidIndex {
        list: ListKind,
        index: usize,
        len: usize,
    },
    #[error("load_decode - {0}")]
    LoadDecode(String),
    #[error("storage_unavailable - {0}")]
    StorageUnavailable(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_index(list: ListKind, index: usize, len: usize) -> Self {
        Self::InvalidIndex { list, index, len }
    }

    pub fn load_decode<M: Into<String>>(message: M) -> Self {
        Self::LoadDecode(message.into())
    }

    pub fn storage_unavailable<M: Into<String>>(message: M) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidIndex { .. } => "invalid_index",
            Self::LoadDecode(_) => "load_decode",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    /// The error text without its code prefix.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message)
            | Self::LoadDecode(message)
            | Self::StorageUnavailable(message)
            | Self::InvalidData(message)
            | Self::Io(message) => message.clone(),
            Self::InvalidIndex { list, index, len } => {
                format!("index {index} is out of range for {list} list of length {len}")
            }
        }
    }
}
