use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("capability name must not be empty")]
    EmptyCapability,
    #[error("malformed result batch: {capabilities} capabilities but {flags} grant flags")]
    MalformedResultBatch { capabilities: usize, flags: usize },
}
