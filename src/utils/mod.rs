pub mod json;
pub mod pagination;
pub mod query;

/// Escapes `%`, `_` and `\\` so user text matches literally inside a LIKE
/// pattern.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
