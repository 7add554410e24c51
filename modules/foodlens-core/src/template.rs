use anyhow::{bail, Result};
use std::collections::HashMap;

/// Fill `{{var}}` placeholders from a substitution map.
///
/// Substituted values are inserted verbatim and never re-scanned, so user text
/// containing `{{...}}` cannot expand into other variables. `\{{` renders a literal `{{`.
/// Unknown placeholders are left as-is for debugging.
pub fn resolve_runtime_vars(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'{') {
            chars.next(); // consume first {
            if chars.peek() == Some(&'{') {
                chars.next(); // consume second {
                result.push_str("{{");
            } else {
                result.push('\\');
                result.push('{');
            }
        } else if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // consume second {

            let mut var_name = String::new();
            loop {
                match chars.next() {
                    Some('}') if chars.peek() == Some(&'}') => {
                        chars.next();
                        break;
                    }
                    Some(ch) => var_name.push(ch),
                    None => {
                        // Malformed — just emit what we have
                        result.push_str("{{");
                        result.push_str(&var_name);
                        return result;
                    }
                }
            }

            let var_name = var_name.trim();
            if let Some(value) = vars.get(var_name) {
                result.push_str(value);
            } else {
                result.push_str("{{");
                result.push_str(var_name);
                result.push_str("}}");
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Validate that every `{{...}}` in a template names an allowed variable.
pub fn validate_template(template: &str, allowed: &[&str]) -> Result<()> {
    for name in placeholders(template)? {
        if !allowed.contains(&name.as_str()) {
            bail!(
                "Unknown template variable: {{{{{}}}}}. Allowed runtime vars: {:?}",
                name,
                allowed
            );
        }
    }
    Ok(())
}

/// Placeholder names in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'{') {
            chars.next();
            if chars.peek() == Some(&'{') {
                chars.next();
            }
            continue;
        }

        if c == '{' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_name = String::new();
            loop {
                match chars.next() {
                    Some('}') if chars.peek() == Some(&'}') => {
                        chars.next();
                        break;
                    }
                    Some(ch) => var_name.push(ch),
                    None => bail!("Unclosed template variable: {{{{{}", var_name),
                }
            }
            names.push(var_name.trim().to_string());
        }
    }

    Ok(names)
}
