/// Words dropped from the description word cloud
pub const STOPWORDS: [&str; 9] = ["the", "and", "to", "in", "of", "for", "on", "a", "is"];

/// Splits a comma-separated tag field into trimmed, non-empty tags
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|tag| !tag.is_empty())
}

/// Lower-cases free text and splits it on whitespace
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Strips surrounding punctuation from a token, keeping inner apostrophes and hyphens
pub fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.iter().any(|stop| stop.eq_ignore_ascii_case(word))
}

/// Tokens used for the description word cloud: lower-cased, punctuation-trimmed, stopwords removed
pub fn cloud_tokens(text: &str) -> Vec<String> {
    tokenize_words(text)
        .iter()
        .map(|token| trim_punctuation(token))
        .filter(|token| !token.is_empty() && !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// Escapes text for embedding in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
