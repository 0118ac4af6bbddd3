//! Icon glyph table.
//!
//! One `name codepoint` pair per line, codepoint in hex. A name resolves to
//! the single character at that codepoint of the icon font.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{PlateError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSet {
    glyphs: HashMap<String, char>,
}

impl IconSet {
    pub fn parse(table: &str) -> Result<Self> {
        let mut glyphs = HashMap::new();

        for (index, line) in table.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = || PlateError::MalformedIcons {
                line: index + 1,
                content: line.to_string(),
            };

            let mut parts = line.split_whitespace();
            let (Some(name), Some(point), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(malformed());
            };
            let glyph = u32::from_str_radix(point, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(malformed)?;

            glyphs.insert(name.to_string(), glyph);
        }

        Ok(Self { glyphs })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn get(&self, name: &str) -> Result<char> {
        self.glyphs
            .get(name)
            .copied()
            .ok_or_else(|| PlateError::UnknownIcon(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let icons = IconSet::parse("home e88a\nbed efdf\n\n").unwrap();
        assert_eq!(icons.len(), 2);
        assert_eq!(icons.get("home").unwrap(), '\u{e88a}');
        assert!(matches!(icons.get("sofa"), Err(PlateError::UnknownIcon(_))));
    }

    #[test]
    fn test_malformed_line_reported() {
        let err = IconSet::parse("home e88a\nbroken\n").unwrap_err();
        assert!(matches!(err, PlateError::MalformedIcons { line: 2, .. }));
        assert!(IconSet::parse("home zzzz").is_err());
    }
}
