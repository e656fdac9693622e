//! Parsing of transfer tool output.

/// Last whitespace-separated token of `output`.
///
/// plowup prints the download URL last and plowdown prints the saved file
/// path last; everything before that is progress noise.
pub fn last_token(output: &str) -> Option<&str> {
    output.split_whitespace().last()
}
