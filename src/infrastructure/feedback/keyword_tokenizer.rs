/// Split the keyword section on underscores, dropping blank pieces
pub fn tokenize_keywords(raw: &str) -> Vec<String> {
    raw.split('_')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}
