//! Leading module metadata
//!
//! A module may start with comments and string-literal statements such as
//! `"format cjs";` or `'deps ./a';`. Each literal is read as `key value`;
//! repeated keys keep every value in order. Scanning stops at the first
//! token that is neither a comment nor a well-formed literal statement.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMetadata {
    entries: IndexMap<String, Vec<String>>,
}

impl ModuleMetadata {
    /// Parse the metadata prefix of a module
    pub fn parse(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut metadata = Self::default();
        let mut pos = 0;

        loop {
            while bytes.get(pos).map_or(false, u8::is_ascii_whitespace) {
                pos += 1;
            }

            match (bytes.get(pos), bytes.get(pos + 1)) {
                (Some(b'/'), Some(b'/')) => {
                    pos = source[pos..].find('\n').map_or(bytes.len(), |end| pos + end);
                },
                (Some(b'/'), Some(b'*')) => match source[pos + 2..].find("*/") {
                    Some(end) => pos += 2 + end + 2,
                    None => break,
                },
                (Some(&quote), _) if quote == b'"' || quote == b'\'' => {
                    match directive(source, pos, quote) {
                        Some((content, next)) => {
                            metadata.record(content);
                            pos = next;
                        },
                        None => break,
                    }
                },
                _ => break,
            }
        }

        metadata
    }

    fn record(&mut self, content: &str) {
        if let Some((key, value)) = content.split_once(' ') {
            if !key.is_empty() {
                self.entries
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }
    }

    /// All values recorded for a key
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Declared module format; the last declaration wins
    pub fn format(&self) -> Option<&str> {
        self.get("format")
            .and_then(|values| values.last())
            .map(|value| value.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read a string-literal statement at `start`, returning its content and
/// the offset after the statement
fn directive(source: &str, start: usize, quote: u8) -> Option<(&str, usize)> {
    let bytes = source.as_bytes();
    let close = bytes[start + 1..]
        .iter()
        .position(|&b| b == quote || b == b'\n')
        .map(|offset| start + 1 + offset)?;

    if bytes[close] != quote || close == start + 1 {
        return None;
    }

    let mut next = close + 1;
    while matches!(bytes.get(next), Some(b' ' | b'\t')) {
        next += 1;
    }
    if bytes.get(next) == Some(&b';') {
        next += 1;
    }

    // A literal followed by more expression is code, not a directive
    match (bytes.get(next), bytes.get(next + 1)) {
        (None, _) | (Some(b'\n' | b'\r' | b' ' | b'\t'), _) => {},
        (Some(b'/'), Some(b'/' | b'*')) => {},
        (Some(b'"' | b'\''), _) if bytes[next - 1] == b';' => {},
        _ => return None,
    }

    Some((&source[start + 1..close], next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_directive() {
        let metadata = ModuleMetadata::parse("\"format cjs\";\nmodule.exports = 1;");
        assert_eq!(metadata.format(), Some("cjs"));
    }

    #[test]
    fn test_comments_and_repeated_keys() {
        let source = "#!/x\n";
        assert!(ModuleMetadata::parse(source).is_empty());

        let source = "/* license\n * text */\n// note\n'deps ./a';\n\"deps ./b\"\n'format es6';\nvar x;";
        let metadata = ModuleMetadata::parse(source);
        assert_eq!(
            metadata.get("deps"),
            Some(&["./a".to_string(), "./b".to_string()][..])
        );
        assert_eq!(metadata.format(), Some("es6"));
    }

    #[test]
    fn test_use_strict_is_recorded_without_format() {
        let metadata = ModuleMetadata::parse("'use strict';\nrequire('x');");
        assert_eq!(metadata.get("use"), Some(&["strict".to_string()][..]));
        assert_eq!(metadata.format(), None);
    }

    #[test]
    fn test_malformed_literal_stops_scanning() {
        let metadata = ModuleMetadata::parse("'deps ./a';\n'unterminated\n'format amd';");
        assert_eq!(metadata.get("deps").map(<[String]>::len), Some(1));
        assert_eq!(metadata.format(), None);
    }

    #[test]
    fn test_literal_expression_is_not_metadata() {
        let metadata = ModuleMetadata::parse("'format amd' + suffix;");
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_metadata_after_code_is_ignored() {
        let metadata = ModuleMetadata::parse("var a = 1;\n'format amd';");
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_literal_without_space_is_skipped() {
        let metadata = ModuleMetadata::parse("'bundle';\n'format cjs';");
        assert_eq!(metadata.format(), Some("cjs"));
        assert!(metadata.get("bundle").is_none());
    }
}
