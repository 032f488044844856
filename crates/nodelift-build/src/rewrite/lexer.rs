//! Restricted JavaScript tokenizer
//!
//! Only distinguishes what the rewriter needs: identifiers, quoted strings,
//! template chunks, regex literals and single punctuation bytes. Comments
//! and whitespace are skipped. Offsets are byte offsets into the source and
//! always fall on ASCII delimiters, so slicing the source with them is safe.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// Quoted string; the span includes both quotes
    Str,
    /// A run of template literal text, up to a substitution or the closing backtick
    Template,
    Regex,
    Number,
    Punct(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Keywords after which a `/` starts a regex literal
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "delete", "void", "throw",
    "yield", "await",
];

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    previous: Option<Token>,
    /// One entry per open `{`; `true` when it opened a template substitution
    braces: Vec<bool>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            previous: None,
            braces: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek(0) {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => {
                    self.pos = find_byte(self.bytes, self.pos, b'\n').unwrap_or(self.bytes.len());
                },
                b'/' if self.peek(1) == Some(b'*') => {
                    self.pos = find_seq(self.bytes, self.pos + 2, b"*/")
                        .map_or(self.bytes.len(), |end| end + 2);
                },
                _ => break,
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.previous {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Punct(b')') | TokenKind::Punct(b']') | TokenKind::Punct(b'}') => false,
                TokenKind::Punct(_) => true,
                TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&token.text(self.source)),
                _ => false,
            },
        }
    }

    fn scan_string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(byte) = self.peek(0) {
            match byte {
                b'\\' => self.pos += 2,
                b'\n' => return,
                _ if byte == quote => {
                    self.pos += 1;
                    return;
                },
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Scan template text from the current position (just past `` ` `` or `}`)
    fn scan_template_text(&mut self) {
        while let Some(byte) = self.peek(0) {
            match byte {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return;
                },
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.braces.push(true);
                    return;
                },
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Scan a regex literal; falls back to `false` when the line ends first
    fn scan_regex(&mut self) -> bool {
        let mut pos = self.pos + 1;
        let mut in_class = false;

        while let Some(&byte) = self.bytes.get(pos) {
            match byte {
                b'\\' => pos += 2,
                b'\n' => return false,
                b'[' => {
                    in_class = true;
                    pos += 1;
                },
                b']' => {
                    in_class = false;
                    pos += 1;
                },
                b'/' if !in_class => {
                    pos += 1;
                    while self.bytes.get(pos).map_or(false, |b| is_ident_byte(*b)) {
                        pos += 1;
                    }
                    self.pos = pos;
                    return true;
                },
                _ => pos += 1,
            }
        }
        false
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        let start = self.pos;
        let byte = self.peek(0)?;

        let kind = match byte {
            b'"' | b'\'' => {
                self.scan_string(byte);
                TokenKind::Str
            },
            b'`' => {
                self.pos += 1;
                self.scan_template_text();
                TokenKind::Template
            },
            b'{' => {
                self.pos += 1;
                self.braces.push(false);
                TokenKind::Punct(b'{')
            },
            b'}' => {
                self.pos += 1;
                if self.braces.pop() == Some(true) {
                    self.scan_template_text();
                    TokenKind::Template
                } else {
                    TokenKind::Punct(b'}')
                }
            },
            b'/' if self.regex_allowed() && self.scan_regex() => TokenKind::Regex,
            b'0'..=b'9' => {
                while self.peek(0).map_or(false, |b| is_ident_byte(b) || b == b'.') {
                    self.pos += 1;
                }
                TokenKind::Number
            },
            _ if is_ident_start(byte) => {
                while self.peek(0).map_or(false, is_ident_byte) {
                    self.pos += 1;
                }
                TokenKind::Ident
            },
            _ => {
                self.pos += 1;
                TokenKind::Punct(byte)
            },
        };

        let token = Token {
            kind,
            start,
            end: self.pos.min(self.bytes.len()),
        };
        self.previous = Some(token);
        Some(token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Identifier bytes; non-ASCII bytes count so multi-byte characters stay whole
pub fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_ident_start(byte: u8) -> bool {
    is_ident_byte(byte) && !byte.is_ascii_digit()
}

/// Identifier tokens that are not the property of a member access
pub fn free_identifiers(source: &str) -> impl Iterator<Item = Token> + '_ {
    let mut previous: Option<Token> = None;
    Lexer::new(source).filter_map(move |token| {
        let after_dot = matches!(previous, Some(Token { kind: TokenKind::Punct(b'.'), .. }));
        previous = Some(token);
        (token.kind == TokenKind::Ident && !after_dot).then_some(token)
    })
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}

fn find_seq(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let from = from.min(bytes.len());
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(source)
            .map(|token| (token.kind, token.text(source)))
            .collect()
    }

    #[test]
    fn test_skips_comments() {
        let tokens = kinds("a // b\n/* c */ d");
        assert_eq!(tokens, vec![(TokenKind::Ident, "a"), (TokenKind::Ident, "d")]);
    }

    #[test]
    fn test_strings_with_escapes() {
        let tokens = kinds(r#"x = "a \" b" + 'c'"#);
        assert_eq!(tokens[2], (TokenKind::Str, r#""a \" b""#));
        assert_eq!(tokens[4], (TokenKind::Str, "'c'"));
    }

    #[test]
    fn test_regex_versus_division() {
        let tokens = kinds("x = a / b; y = /re'x/g.test(s)");
        assert!(tokens.contains(&(TokenKind::Punct(b'/'), "/")));
        assert!(tokens.contains(&(TokenKind::Regex, "/re'x/g")));
    }

    #[test]
    fn test_template_substitutions_are_tokenized() {
        let source = "`a ${require('x')} b` + c";
        let tokens = kinds(source);
        assert_eq!(tokens[0], (TokenKind::Template, "`a ${"));
        assert_eq!(tokens[1], (TokenKind::Ident, "require"));
        assert_eq!(tokens[3], (TokenKind::Str, "'x'"));
        assert_eq!(tokens[5], (TokenKind::Template, "} b`"));
        assert_eq!(tokens[7], (TokenKind::Ident, "c"));
    }

    #[test]
    fn test_nested_braces_inside_substitution() {
        let tokens = kinds("`${ {a: 1}.a }` + z");
        assert_eq!(tokens.last(), Some(&(TokenKind::Ident, "z")));
    }

    #[test]
    fn test_free_identifiers() {
        let source = "process.env; a.process; Buffer.from(x); obj. Buffer";
        let free: Vec<_> = free_identifiers(source).map(|t| t.text(source)).collect();
        assert_eq!(free, vec!["process", "a", "Buffer", "x", "obj"]);
    }

    #[test]
    fn test_unterminated_constructs_do_not_panic() {
        for source in ["'abc", "`abc ${", "/* open", "x = /abc", "\"a\\", "é = 'ü'"] {
            let _ = kinds(source);
        }
    }
}
