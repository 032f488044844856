//! `require('…')` call-site discovery and specifier splicing

use nodelift_core::error::LiftResult;

use super::lexer::{Lexer, Token, TokenKind};
use super::remap::ImportRemapper;

/// A string-literal `require` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireSite {
    /// Byte range of the specifier text, quotes excluded
    pub start: usize,
    pub end: usize,
    pub specifier: String,
}

/// Find `require(<string>)` calls that are not property accesses
pub fn find_requires(source: &str) -> Vec<RequireSite> {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    let mut sites = Vec::new();

    for (i, window) in tokens.windows(4).enumerate() {
        let [callee, open, arg, close] = window else {
            continue;
        };

        let is_call = callee.kind == TokenKind::Ident
            && callee.text(source) == "require"
            && open.kind == TokenKind::Punct(b'(')
            && arg.kind == TokenKind::Str
            && close.kind == TokenKind::Punct(b')');
        let is_member = i > 0 && tokens[i - 1].kind == TokenKind::Punct(b'.');
        if !is_call || is_member {
            continue;
        }

        let literal = arg.text(source);
        if literal.len() < 2 || literal.contains('\\') {
            continue;
        }

        sites.push(RequireSite {
            start: arg.start + 1,
            end: arg.end - 1,
            specifier: literal[1..literal.len() - 1].to_string(),
        });
    }

    sites
}

/// Apply a remapper to every call site, returning the new source and
/// whether any specifier changed
pub fn remap_requires(
    source: &str,
    file: &str,
    remapper: &dyn ImportRemapper,
) -> LiftResult<(String, bool)> {
    let mut output = String::with_capacity(source.len());
    let mut copied = 0;
    let mut changed = false;

    for site in find_requires(source) {
        let Some(replacement) = remapper.remap(&site.specifier, file)? else {
            continue;
        };
        if replacement == site.specifier {
            continue;
        }

        output.push_str(&source[copied..site.start]);
        output.push_str(&replacement);
        copied = site.end;
        changed = true;
    }

    output.push_str(&source[copied..]);
    Ok((output, changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(source: &str) -> Vec<String> {
        find_requires(source).into_iter().map(|site| site.specifier).collect()
    }

    #[test]
    fn test_finds_call_sites() {
        let source = "var a = require('a');\nconst b = require ( \"./b\" ).x;";
        assert_eq!(specifiers(source), vec!["a", "./b"]);
    }

    #[test]
    fn test_skips_non_calls() {
        let source = r#"
            // require('commented')
            /* require('block') */
            var s = "require('in-string')";
            var t = `require('in-template')`;
            obj.require('member');
            require(variable);
            require('a' + b);
            myrequire('prefixed');
        "#;
        assert!(specifiers(source).is_empty());
    }

    #[test]
    fn test_finds_calls_inside_template_substitutions() {
        assert_eq!(specifiers("`${require('x')}`"), vec!["x"]);
    }

    #[test]
    fn test_remap_splices_only_changed_sites() {
        let source = "require('fs'); require('lodash'); require(\"./a.js\");";
        let remapper = |specifier: &str, _file: &str| -> LiftResult<Option<String>> {
            Ok(match specifier {
                "fs" => Some("shim/fs".to_string()),
                "./a.js" => Some("./a".to_string()),
                _ => None,
            })
        };

        let (output, changed) = remap_requires(source, "index.js", &remapper).unwrap();
        assert!(changed);
        assert_eq!(output, "require('shim/fs'); require('lodash'); require(\"./a\");");
    }

    #[test]
    fn test_remap_unchanged_source() {
        let remapper = |_: &str, _: &str| -> LiftResult<Option<String>> { Ok(None) };
        let (output, changed) = remap_requires("require('x');", "index.js", &remapper).unwrap();
        assert!(!changed);
        assert_eq!(output, "require('x');");
    }

    #[test]
    fn test_remapper_errors_propagate() {
        let remapper = |specifier: &str, file: &str| -> LiftResult<Option<String>> {
            Err(nodelift_core::error::LiftError::rewrite(file, format!("cannot map {}", specifier)))
        };
        assert!(remap_requires("require('x');", "index.js", &remapper).is_err());
    }
}
