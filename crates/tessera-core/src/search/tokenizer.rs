//! Script-aware tokenization for the lexical index.
//!
//! Text is lower-cased and split into maximal runs of word characters:
//! Unicode alphanumerics, `_`, and the Hebrew block (U+0590–U+05FF) plus the
//! Hebrew presentation forms (U+FB1D–U+FB4F). The Hebrew ranges are listed
//! explicitly so that points and cantillation marks, which are not
//! alphanumeric, stay attached to their word.
//!
//! Single-character tokens are dropped unless the character is Hebrew: a
//! lone Latin letter is almost always noise, while a one-letter Hebrew word
//! can carry meaning.

/// Returns `true` for characters in the Hebrew block or its presentation forms.
pub fn is_hebrew(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}' | '\u{FB1D}'..='\u{FB4F}')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_hebrew(c)
}

/// Converts text into index terms.
///
/// # Examples
///
/// ```
/// use tessera_core::search::tokenizer::tokenize;
///
/// assert_eq!(tokenize("The Quick-fox, a dog"), vec!["the", "quick", "fox", "dog"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| keep_token(token))
        .map(str::to_string)
        .collect()
}

fn keep_token(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(c), None) => is_hebrew(c),
        (Some(_), Some(_)) => true,
    }
}
