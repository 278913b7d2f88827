//! String literal masking for the extractors.
//!
//! Keywords inside string contents must never be mistaken for code
//! constructs, so every literal is swapped for a unique placeholder token
//! before the line-oriented scan and swapped back afterwards. Placeholders
//! contain no whitespace or newlines, so line splitting downstream is
//! unaffected.

use crate::core::Language;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Matches one single-line string literal, with an optional Objective-C `@`
/// prefix. The `"""` alternative is listed first so Swift multi-line string
/// delimiters are never consumed as an empty literal plus a stray quote.
static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"("""|@?"(?:\\.|[^"\\\n])*")"#).unwrap());

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__STRING_PLACEHOLDER_(\d+)__").unwrap());

/// Replaces string literals with `__STRING_PLACEHOLDER_<n>__` tokens and
/// restores them on demand.
///
/// Malformed or unterminated literals simply fail to match and pass through
/// unmodified.
#[derive(Debug, Default)]
pub struct StringLiteralProtector {
    originals: HashMap<usize, String>,
    counter: usize,
}

impl StringLiteralProtector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask every well-formed literal in `text`. The language parameter is
    /// part of the contract so a caller never has to know that both
    /// grammars share one literal pattern here.
    pub fn protect(&mut self, text: &str, _language: Language) -> String {
        STRING_LITERAL
            .replace_all(text, |caps: &Captures| {
                let matched = caps.get(1).unwrap().as_str();
                if matched == "\"\"\"" {
                    // Multi-line string delimiter; the extractor handles it.
                    return matched.to_string();
                }
                let index = self.counter;
                self.counter += 1;
                self.originals.insert(index, matched.to_string());
                format!("__STRING_PLACEHOLDER_{index}__")
            })
            .into_owned()
    }

    /// Substitute every placeholder back for its original literal.
    pub fn restore(&self, masked: &str) -> String {
        PLACEHOLDER
            .replace_all(masked, |caps: &Captures| {
                let index: usize = caps[1].parse().unwrap_or(usize::MAX);
                match self.originals.get(&index) {
                    Some(original) => original.clone(),
                    // Unknown placeholder: leave the token as found.
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Number of literals currently masked by this instance
    pub fn masked_count(&self) -> usize {
        self.originals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> String {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(text, Language::ObjectiveC);
        protector.restore(&masked)
    }

    #[test]
    fn masks_objc_literal_with_at_prefix() {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(r#"NSString *s = @"hello";"#, Language::ObjectiveC);
        assert_eq!(masked, "NSString *s = __STRING_PLACEHOLDER_0__;");
        assert_eq!(protector.masked_count(), 1);
    }

    #[test]
    fn masks_plain_literal() {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(r#"let s = "hello""#, Language::Swift);
        assert_eq!(masked, "let s = __STRING_PLACEHOLDER_0__");
    }

    #[test]
    fn keyword_inside_literal_disappears_from_masked_text() {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(
            r#"NSLog(@"@interface Fake : NSObject");"#,
            Language::ObjectiveC,
        );
        assert!(!masked.contains("@interface"));
    }

    #[test]
    fn restore_round_trips_exactly() {
        let source = r#"
            NSString *a = @"first";
            NSString *b = @"with \"escaped\" quotes";
            char *c = "plain";
        "#;
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn unterminated_literal_passes_through() {
        let source = r#"NSString *s = @"never closed;"#;
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(source, Language::ObjectiveC);
        assert_eq!(masked, source);
        assert_eq!(protector.masked_count(), 0);
    }

    #[test]
    fn triple_quote_delimiter_is_left_alone() {
        let source = "let s = \"\"\"";
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(source, Language::Swift);
        assert_eq!(masked, source);
    }

    #[test]
    fn placeholders_keep_line_structure() {
        let source = "a = @\"one\";\nb = @\"two\";\n";
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(source, Language::ObjectiveC);
        assert_eq!(masked.lines().count(), source.lines().count());
    }

    #[test]
    fn placeholders_are_unique_per_literal() {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(r#"@"a" @"a" @"a""#, Language::ObjectiveC);
        assert_eq!(
            masked,
            "__STRING_PLACEHOLDER_0__ __STRING_PLACEHOLDER_1__ __STRING_PLACEHOLDER_2__"
        );
    }
}
