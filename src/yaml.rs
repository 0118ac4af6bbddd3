//! YAML output for Home Assistant.
//!
//! `serde_yaml` writes YAML 1.2, where `on`, `off`, `yes`, `no`, `y` and `n`
//! are plain strings. Home Assistant loads its configuration as YAML 1.1 and
//! reads those words as booleans, so every such plain scalar is single-quoted
//! before the document leaves the crate. Real booleans and nulls are already
//! `true`/`false`/`null` and are left alone.

use serde::Serialize;

use crate::error::Result;

const YAML11_BOOLEANS: [&str; 6] = ["y", "n", "yes", "no", "on", "off"];

/// Serializes `value` to YAML that YAML 1.1 and 1.2 loaders read the same way.
pub fn to_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(quote_yaml11_booleans(&yaml))
}

fn is_yaml11_boolean(scalar: &str) -> bool {
    YAML11_BOOLEANS
        .iter()
        .any(|word| scalar.eq_ignore_ascii_case(word))
}

fn quoted(scalar: &str) -> String {
    if is_yaml11_boolean(scalar) {
        format!("'{}'", scalar)
    } else {
        scalar.to_string()
    }
}

fn opens_block_scalar(value: &str) -> bool {
    value.starts_with('|') || value.starts_with('>')
}

/// Rewrites block-style YAML line by line. Bodies of `|`/`>` block scalars
/// are copied verbatim.
fn quote_yaml11_booleans(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    // indentation of the line that opened the current block scalar
    let mut block_opener: Option<usize> = None;

    for line in yaml.split_inclusive('\n') {
        let (text, newline) = match line.strip_suffix('\n') {
            Some(text) => (text, "\n"),
            None => (line, ""),
        };
        let indent = text.len() - text.trim_start_matches(' ').len();

        if let Some(opener) = block_opener {
            if text.trim().is_empty() || indent > opener {
                out.push_str(line);
                continue;
            }
            block_opener = None;
        }

        let (prefix, node) = split_sequence_markers(text);
        let rewritten = match split_mapping(node) {
            Some((key, "")) => format!("{}:", quoted(key)),
            Some((key, value)) => {
                if opens_block_scalar(value) {
                    block_opener = Some(indent);
                }
                format!("{}: {}", quoted(key), quoted(value))
            }
            None => {
                if opens_block_scalar(node) {
                    block_opener = Some(indent);
                }
                quoted(node)
            }
        };

        out.push_str(prefix);
        out.push_str(&rewritten);
        out.push_str(newline);
    }
    out
}

/// Splits off indentation and any `- ` sequence entry markers.
fn split_sequence_markers(text: &str) -> (&str, &str) {
    let mut node = text.trim_start_matches(' ');
    while let Some(rest) = node.strip_prefix("- ") {
        node = rest;
    }
    text.split_at(text.len() - node.len())
}

/// `key: value` or `key:` into `(key, value)`; `None` for a bare scalar.
fn split_mapping(node: &str) -> Option<(&str, &str)> {
    let key_len = match node.chars().next()? {
        quote @ ('\'' | '"') => quoted_len(node, quote)?,
        _ => match node.find(": ") {
            Some(end) => end,
            None => node.strip_suffix(':')?.len(),
        },
    };

    let (key, tail) = node.split_at(key_len);
    if tail == ":" {
        return Some((key, ""));
    }
    tail.strip_prefix(": ").map(|value| (key, value))
}

/// Byte length of the quoted scalar at the start of `node`, quotes included.
fn quoted_len(node: &str, quote: char) -> Option<usize> {
    let mut chars = node.char_indices().skip(1).peekable();
    while let Some((index, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return Some(index + 1);
        }
    }
    None
}
