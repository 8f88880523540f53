/// Errors raised by the numeric core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RadicalError {
    /// Malformed input: negative coefficient, empty sequence, bad precision.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A target literal could not be parsed as a decimal number.
    #[error("Cannot parse target {text:?}: {reason}")]
    ParseTarget { text: String, reason: String },
}
