//! Swift symbol extraction.
//!
//! Swift bodies are delimited by braces rather than an `@end` keyword, so
//! the scanner carries a brace depth alongside the line state, and type
//! headers must tolerate generic parameter lists (one level of nesting) and
//! trailing `where` clauses. Triple-quoted multi-line strings switch the
//! scanner off entirely until the closing delimiter.

use crate::config::Whitelist;
use crate::core::{Language, ParsedFile, Symbol, SymbolKind};
use crate::parsers::strings::StringLiteralProtector;
use crate::parsers::{strip_comments, LineState, SymbolParser};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:@testable\s+)?import\s+(\w+)").unwrap());
static TYPE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:open|public|internal|fileprivate|private|final|indirect)\s+)*(class|struct|enum|protocol|extension)\s+(\w+)\s*(<[^<>]*(?:<[^<>]*>[^<>]*)*>)?\s*(?::\s*([^{]+?))?\s*(?:where\b[^{]*)?\{?\s*$",
    )
    .unwrap()
});
static FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:open|public|internal|fileprivate|private|final|override|static|class|mutating|nonmutating|required|convenience)\s+)*func\s+(\w+)\s*(?:<[^<>]*(?:<[^<>]*>[^<>]*)*>)?\s*\(([^)]*)\)\s*(?:(?:async|throws|rethrows)\s*)*(?:->\s*([^{]+?))?\s*(?:where\b[^{]*)?\{?\s*$",
    )
    .unwrap()
});
static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:open|public|internal|fileprivate|private|static|class|weak|unowned|lazy|final|override)\s+)*(var|let)\s+(\w+)(?:\s*:\s*([^={]+?))?\s*(?:[={].*)?$",
    )
    .unwrap()
});
static ENUM_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:indirect\s+)?case\s+(.+)$").unwrap());
static ACCESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(open|public|internal|fileprivate|private)\b").unwrap());
static STATIC_MEMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:static|class)\s+func\b").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)").unwrap());

/// The type body currently being scanned
#[derive(Debug)]
struct TypeContext {
    name: String,
    kind: SymbolKind,
    /// Brace depth at which this body's members sit
    member_depth: i32,
}

pub struct SwiftParser {
    whitelist: Whitelist,
}

impl SwiftParser {
    pub fn new(whitelist: Whitelist) -> Self {
        Self { whitelist }
    }

    fn allowed(&self, name: &str) -> bool {
        !self.whitelist.is_whitelisted(name)
    }

    fn scan(&self, content: &str, path: &Path) -> ParsedFile {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(content, Language::Swift);

        let mut parsed = ParsedFile::new(path.to_path_buf(), Language::Swift);
        let mut state = LineState::Code;
        let mut in_multiline_string = false;
        let mut depth: i32 = 0;
        let mut body: Option<TypeContext> = None;

        for (index, raw) in masked.lines().enumerate() {
            let line_number = index + 1;

            if in_multiline_string {
                if raw.contains("\"\"\"") {
                    in_multiline_string = false;
                }
                continue;
            }

            if state == LineState::BlockComment {
                if raw.contains("*/") {
                    state = LineState::Code;
                }
                continue;
            }

            let stripped = strip_comments(raw, &mut state);
            let line = stripped.trim();

            if line.matches("\"\"\"").count() % 2 == 1 {
                in_multiline_string = true;
                // The opening line itself carries no member declarations.
                continue;
            }

            if line.is_empty() {
                continue;
            }

            self.scan_line(line, line_number, depth, &mut parsed, &mut body);

            depth += brace_delta(line);
            if depth <= 0 {
                depth = 0;
                body = None;
            }
        }

        parsed
    }

    fn scan_line(
        &self,
        line: &str,
        line_number: usize,
        depth: i32,
        parsed: &mut ParsedFile,
        body: &mut Option<TypeContext>,
    ) {
        if let Some(caps) = IMPORT.captures(line) {
            parsed.imports.insert(caps[1].to_string());
            return;
        }

        // Member declarations are only recognized directly inside a type
        // body, which keeps function-local variables and switch cases out.
        let at_member_depth = body
            .as_ref()
            .map(|ctx| depth == ctx.member_depth)
            .unwrap_or(false);

        if at_member_depth {
            if self.scan_member_line(line, line_number, parsed, body.as_ref().unwrap()) {
                return;
            }
        }

        if let Some(caps) = TYPE_HEADER.captures(line) {
            let keyword = caps[1].to_string();
            let name = caps[2].to_string();
            // `class func`/`class var` member lines also start with the
            // `class` keyword; those never reach here at member depth, but
            // guard the top-level shape anyway.
            if name == "func" || name == "var" || name == "let" {
                return;
            }
            let kind = match keyword.as_str() {
                "class" => SymbolKind::Class,
                "struct" => SymbolKind::Struct,
                "enum" => SymbolKind::Enum,
                "protocol" => SymbolKind::Protocol,
                _ => SymbolKind::Extension,
            };
            let parent = caps
                .get(4)
                .and_then(|m| first_inherited(m.as_str()))
                .filter(|_| kind == SymbolKind::Class);

            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name.clone(), kind, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_parent(parent)
                        .with_access_modifier(access_of(line)),
                );
            }

            *body = Some(TypeContext {
                name,
                kind,
                member_depth: depth + 1,
            });
        }
        // Anything else is ordinary code and is ignored.
    }

    /// Recognize one member declaration; returns whether the line was
    /// consumed.
    fn scan_member_line(
        &self,
        line: &str,
        line_number: usize,
        parsed: &mut ParsedFile,
        body: &TypeContext,
    ) -> bool {
        if let Some(caps) = FUNC.captures(line) {
            let name = caps[1].to_string();
            let parameters = parse_parameters(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
            let return_type = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "Void".to_string());
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Method, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_parent(Some(body.name.clone()))
                        .with_access_modifier(access_of(line))
                        .with_static(STATIC_MEMBER.is_match(line))
                        .with_return_type(return_type)
                        .with_parameters(parameters),
                );
            }
            return true;
        }

        if body.kind == SymbolKind::Enum {
            if let Some(caps) = ENUM_CASE.captures(line) {
                for name in parse_case_names(&caps[1]) {
                    if self.allowed(&name) {
                        parsed.symbols.push(
                            Symbol::new(
                                name,
                                SymbolKind::Constant,
                                parsed.file.clone(),
                                line_number,
                            )
                            .with_original_line(line)
                            .with_parent(Some(body.name.clone())),
                        );
                    }
                }
                return true;
            }
        }

        if let Some(caps) = VARIABLE.captures(line) {
            let keyword = caps[1].to_string();
            let name = caps[2].to_string();
            let var_type = caps.get(3).map(|m| m.as_str().trim().to_string());
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Property, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_parent(Some(body.name.clone()))
                        .with_access_modifier(access_of(line))
                        // Flags `let` immutability for Swift members.
                        .with_static(keyword == "let")
                        .with_return_type(var_type.unwrap_or_default()),
                );
            }
            return true;
        }

        false
    }
}

impl SymbolParser for SwiftParser {
    fn parse_source(&self, content: &str, path: &Path) -> ParsedFile {
        self.scan(content, path)
    }

    fn language(&self) -> Language {
        Language::Swift
    }
}

fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

fn access_of(line: &str) -> String {
    ACCESS
        .captures(line)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// First entry of an inheritance clause, generics stripped:
/// `Bar, P where T: Equatable` → `Bar`
fn first_inherited(clause: &str) -> Option<String> {
    let first = split_top_level(clause).into_iter().next()?;
    let first = first.split('<').next().unwrap_or(first);
    WORD.captures(first).map(|caps| caps[1].to_string())
}

/// Split on commas that sit outside angle brackets, parentheses and
/// brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut angle = 0i32;
    let mut paren = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => angle -= 1,
            '(' | '[' => paren += 1,
            ')' | ']' => paren -= 1,
            ',' if angle <= 0 && paren <= 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Parameter names from a `label name: Type` list; the internal name is the
/// identifier immediately before the colon.
fn parse_parameters(list: &str) -> Vec<String> {
    split_top_level(list)
        .into_iter()
        .filter_map(|segment| {
            let before_colon = segment.split(':').next()?;
            WORD.captures_iter(before_colon)
                .last()
                .map(|caps| caps[1].to_string())
        })
        .collect()
}

/// Case names from `a, b(Int), c = 3`, associated values stripped
fn parse_case_names(list: &str) -> Vec<String> {
    split_top_level(list)
        .into_iter()
        .filter_map(|segment| {
            let segment = segment.split('(').next().unwrap_or(segment);
            let segment = segment.split('=').next().unwrap_or(segment);
            WORD.captures(segment).map(|caps| caps[1].to_string())
        })
        .collect()
}
