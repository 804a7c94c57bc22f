use crate::error::AppError;
use crate::model::Task;

/// Encodes a list as a JSON array of strings.
pub fn encode(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Decodes a JSON array of strings. `null`, objects and non-string items fail.
pub fn decode(text: &str) -> Result<Vec<Task>, AppError> {
    serde_json::from_str(text).map_err(|err| AppError::load_decode(err.to_string()))
}
