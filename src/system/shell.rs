// src/system/shell.rs

//! Per-shell rendering of resolved candidates.
//!
//! Each supported shell is one entry in [`FORMATTERS`]; the shell-side
//! snippet of that shell reads the printed text back.

use crate::{core::invoked::InvokedAction, models::RawValue};
use serde::Serialize;
use thiserror::Error;

/// Failures of rendering candidates for a shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// No formatter is registered under the requested name.
    #[error("Unsupported shell '{0}'. Supported shells: {supported}", supported = supported_shells().join(", "))]
    UnsupportedShell(String),
    /// JSON output could not be produced.
    #[error("Failed to serialize candidates to JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Defines how the candidates are printed for one shell.
pub struct ShellFormatter {
    /// Name passed on the command line.
    pub name: &'static str,
    /// Renders the candidates.
    pub format: fn(&InvokedAction) -> Result<String, ShellError>,
}

impl std::fmt::Debug for ShellFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellFormatter").field("name", &self.name).finish()
    }
}

/// The single source of truth for all supported shells.
pub static FORMATTERS: &[ShellFormatter] = &[
    ShellFormatter {
        name: "bash",
        format: format_bash,
    },
    ShellFormatter {
        name: "elvish",
        format: format_elvish,
    },
    ShellFormatter {
        name: "fish",
        format: format_fish,
    },
    ShellFormatter {
        name: "powershell",
        format: format_powershell,
    },
    ShellFormatter {
        name: "xonsh",
        format: format_xonsh,
    },
    ShellFormatter {
        name: "zsh",
        format: format_zsh,
    },
];

/// Names of all supported shells, in table order.
pub fn supported_shells() -> Vec<&'static str> {
    FORMATTERS.iter().map(|f| f.name).collect()
}

/// Renders `invoked` for `shell`.
pub fn format(shell: &str, invoked: &InvokedAction) -> Result<String, ShellError> {
    let formatter = FORMATTERS
        .iter()
        .find(|f| f.name == shell)
        .ok_or_else(|| ShellError::UnsupportedShell(shell.to_string()))?;
    (formatter.format)(invoked)
}

/// Separator the shell inserts after a candidate.
fn code_suffix(invoked: &InvokedAction) -> &'static str {
    if invoked.nospace { "" } else { " " }
}

/// Escapes characters bash would otherwise interpret.
fn escape_posix(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            ' ' | '"' | '\'' | '`' | '$' | '&' | '|' | ';' | '<' | '>' | '(' | ')' | '\\' | '*' | '?' | '!' | '#'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn format_bash(invoked: &InvokedAction) -> Result<String, ShellError> {
    // A lone complete candidate gets its separator here, bash cannot tell.
    if let [single] = invoked.raw_values.as_slice() {
        return Ok(format!(
            "{}{}",
            escape_posix(&single.value),
            code_suffix(invoked)
        ));
    }
    Ok(invoked
        .raw_values
        .iter()
        .map(|v| escape_posix(&v.value))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ElvishCandidate<'a> {
    #[serde(flatten)]
    raw: &'a RawValue,
    code_suffix: &'static str,
}

fn format_elvish(invoked: &InvokedAction) -> Result<String, ShellError> {
    let suffix = code_suffix(invoked);
    let candidates: Vec<ElvishCandidate<'_>> = invoked
        .raw_values
        .iter()
        .map(|raw| ElvishCandidate {
            raw,
            code_suffix: suffix,
        })
        .collect();
    Ok(serde_json::to_string(&candidates)?)
}

fn format_fish(invoked: &InvokedAction) -> Result<String, ShellError> {
    Ok(invoked
        .raw_values
        .iter()
        .map(|v| {
            let value = escape_posix(&v.value);
            if v.description.is_empty() {
                value
            } else {
                format!("{}\t{}", value, v.description.replace(['\t', '\n'], " "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Quotes a value for PowerShell unless it is a plain word.
fn quote_powershell(value: &str) -> String {
    if value.chars().any(|c| " \"'`$&|;(){}@,<>#".contains(c)) {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PowershellCandidate<'a> {
    completion_text: String,
    list_item_text: &'a str,
    tool_tip: &'a str,
}

fn format_powershell(invoked: &InvokedAction) -> Result<String, ShellError> {
    let suffix = code_suffix(invoked);
    let candidates: Vec<PowershellCandidate<'_>> = invoked
        .raw_values
        .iter()
        .map(|v| PowershellCandidate {
            completion_text: format!("{}{}", quote_powershell(&v.value), suffix),
            list_item_text: &v.display,
            // An empty tooltip is rejected by CompletionResult.
            tool_tip: if v.description.is_empty() {
                " "
            } else {
                v.description.as_str()
            },
        })
        .collect();
    Ok(serde_json::to_string(&candidates)?)
}

/// Python string literal.
fn python_literal(value: &str) -> String {
    format!(
        "'{}'",
        value
            .replace('\\', "\\\\")
            .replace('\'', "\\'")
            .replace('\n', "\\n")
    )
}

fn format_xonsh(invoked: &InvokedAction) -> Result<String, ShellError> {
    if invoked.raw_values.is_empty() {
        return Ok(String::new());
    }
    let suffix = code_suffix(invoked);
    let entries: Vec<String> = invoked
        .raw_values
        .iter()
        .map(|v| {
            format!(
                "RichCompletion({}, display={}, description={}, prefix_len=0)",
                python_literal(&format!("{}{}", v.value, suffix)),
                python_literal(&v.display),
                python_literal(&v.description)
            )
        })
        .collect();
    Ok(format!("{{{},}}", entries.join(",")))
}

fn format_zsh(invoked: &InvokedAction) -> Result<String, ShellError> {
    Ok(invoked
        .raw_values
        .iter()
        .map(|v| {
            // `_describe` splits value and description on the first unescaped colon.
            let value = v.value.replace('\\', "\\\\").replace(':', "\\:");
            let display = v.display.replace(':', "\\:");
            if v.description.is_empty() {
                format!("{value}\t{display}")
            } else {
                format!("{value}\t{display}:{}", v.description.replace('\n', " "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
