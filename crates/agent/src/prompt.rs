//! Prompt rendering
//!
//! Templates carry `{name}` placeholders. Substitution is a single pass, so
//! braces inside substituted values (user text, search results) are never
//! re-expanded, and unknown placeholders are left as written.

/// Fill `{name}` placeholders from `vars`
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let matched = vars
            .iter()
            .find(|(name, _)| tail.starts_with(name) && tail[name.len()..].starts_with('}'));

        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

/// History as shown to the model; absent or blank history uses `placeholder`
pub fn history_or<'a>(history: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match history {
        Some(text) if !text.trim().is_empty() => text,
        _ => placeholder,
    }
}
