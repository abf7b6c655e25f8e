use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskpulseError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream tracker request failed with an HTTP status of its own.
    /// The status is surfaced to the caller rather than masked as 500.
    #[error("upstream error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DeskpulseResult<T> = Result<T, DeskpulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status() {
        let err = DeskpulseError::Upstream {
            status: 429,
            detail: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "upstream error (429): rate limited");
    }

    #[test]
    fn config_display() {
        let err = DeskpulseError::Config("PORT is garbage".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
