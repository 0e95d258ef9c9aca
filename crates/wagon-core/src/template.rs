//! Campaign message template rendering.
//!
//! Templates use `{{placeholder}}` markers. Unknown placeholders are left
//! in place so a typo is visible in the delivered text rather than silently
//! dropped.

/// Render a template, substituting `{{key}}` (whitespace inside the braces
/// tolerated) for each `(key, value)` pair.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated marker, emit the remainder verbatim.
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}
