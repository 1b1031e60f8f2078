/// Failures a lookup can surface to the user.
///
/// Every transport error, HTTP error status and malformed payload collapses
/// into [`LookupError::FetchFailed`]; the cause is logged, never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Please enter a username")]
    MissingInput,
    #[error("Failed to fetch data. Please try again.")]
    FetchFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_the_window_shows() {
        assert_eq!(LookupError::MissingInput.to_string(), "Please enter a username");
        assert_eq!(
            LookupError::FetchFailed.to_string(),
            "Failed to fetch data. Please try again."
        );
    }
}
