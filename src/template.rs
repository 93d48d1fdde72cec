//! `{variable}` substitution for command templates.
//!
//! Used for the agent install command (`npm install -g pkg@{version}`).
//! `{{` and `}}` render literal braces. Undefined variables are an error, so
//! a typo in a configured template fails loudly instead of installing
//! `pkg@`.

use std::collections::HashMap;
use thiserror::Error;

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("undefined variable '{name}' at position {position} in template")]
    UndefinedVariable { name: String, position: usize },

    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedBrace { position: usize },

    #[error("empty variable name '{{}}' at position {position} in template")]
    EmptyVariableName { position: usize },
}

/// Render `template`, substituting `{name}` from `variables`.
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => name.push(c),
                        None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                    }
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }

                let value = variables.get(name).ok_or_else(|| TemplateError::UndefinedVariable {
                    name: name.to_string(),
                    position: pos,
                })?;
                out.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Build a variables map from key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_command_substitution() {
        let result = render_template(
            "npm install -g @github/copilot@{version}",
            &vars([("version", "0.0.365")]),
        )
        .unwrap();
        assert_eq!(result, "npm install -g @github/copilot@0.0.365");
    }

    #[test]
    fn test_escaped_braces() {
        let result = render_template(
            "docker ps --format {{{{.Status}}}}",
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(result, "docker ps --format {{.Status}}");
    }

    #[test]
    fn test_undefined_variable() {
        let err = render_template("pkg@{versoin}", &vars([("version", "1.0.0")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "versoin".to_string(),
                position: 4
            }
        );
    }

    #[test]
    fn test_unmatched_brace() {
        let err = render_template("pkg@{version", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedBrace { position: 4 });
        assert_eq!(err.to_string(), "unmatched '{' at position 4 in template");
    }

    #[test]
    fn test_empty_variable_name() {
        let err = render_template("pkg@{ }", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::EmptyVariableName { position: 4 });
    }

    #[test]
    fn test_whitespace_in_name_is_trimmed() {
        let result = render_template("v{ version }", &vars([("version", "2.0.0")])).unwrap();
        assert_eq!(result, "v2.0.0");
    }
}
