/// Bounded, single-line preview of a document: newlines become spaces, then
/// the result is cut to the first `length` chars.
pub fn snippet(text: &str, length: usize) -> String {
    text.chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(length)
        .collect()
}
