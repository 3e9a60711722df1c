use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("expression refers to non-existing property '{0}'")]
    UnknownProperty(String),
    #[error("interval predicates cannot be negated: {0}")]
    NegatedInterval(String),
    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
}
