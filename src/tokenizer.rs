//! Line tokenizer for the raw (quoted) CSV.
//!
//! A `"` toggles the in-quotes state and is kept in the field; a delimiter
//! inside quotes is literal content. There is no escaping of embedded quotes,
//! so an unmatched quote leaves the rest of the line in the quoted state.

/// Split `line` on every unquoted `delimiter`.
///
/// The last field is always emitted, so an empty line yields one empty field
/// and a trailing delimiter yields a trailing empty field.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}
