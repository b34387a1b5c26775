#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] cartao_types::TextError),
    #[error("invalid application date '{value}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate { value: String },
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
    #[error("failed to create export directory: {0}")]
    ExportDirCreation(std::io::Error),
    #[error("failed to write CSV file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize card: {0}")]
    Serialization(serde_json::Error),
}

pub type CardResult<T> = std::result::Result<T, CardError>;
