//! Objective-C symbol extraction.
//!
//! A line-oriented scan over string-protected text. There is no grammar
//! here: the scanner keeps just enough state (comments, backslash
//! continuations, the enclosing type) to pull renameable identifiers out of
//! structural lines, and ignores everything it does not recognize.

use crate::config::Whitelist;
use crate::core::{Language, ParsedFile, Symbol, SymbolKind};
use crate::parsers::strings::StringLiteralProtector;
use crate::parsers::{strip_comments, LineState, SymbolParser};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^#\s*(?:import|include)\s*[<"]([^">]+)[">]"#).unwrap());
static FORWARD_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@class\s+([\w\s,]+);").unwrap());
static FORWARD_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@protocol\s+([\w\s,]+);").unwrap());
static INTERFACE_CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@interface\s+(\w+)\s*\(\s*(\w*)\s*\)").unwrap());
static INTERFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@interface\s+(\w+)(?:\s*:\s*(\w+))?").unwrap());
static IMPLEMENTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@implementation\s+(\w+)(?:\s*\(\s*(\w+)\s*\))?").unwrap());
static PROTOCOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@protocol\s+(\w+)").unwrap());
static PROPERTY_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@property\s*(?:\(([^)]*)\))?\s*([^(]*)\(\s*\^\s*(\w+)\s*\)").unwrap()
});
static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@property\s*(?:\(([^)]*)\))?\s*(.+?)\s*;").unwrap());
static METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-])\s*\(([^)]+)\)\s*(.*)$").unwrap());
static METHOD_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*:\s*\(([^)]*)\)\s*(\w+)").unwrap());
static NS_ENUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^typedef\s+NS_(?:ENUM|OPTIONS)\s*\(\s*(\w+)\s*,\s*(\w+)\s*\)").unwrap()
});
static TYPEDEF_BRACE_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+(enum|struct)\b[^{]*\{.*\}\s*(\w+)\s*;").unwrap());
static TYPEDEF_BRACE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+(enum|struct)\b[^;]*$").unwrap());
static BRACE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}\s*(\w+)\s*;").unwrap());
static TYPEDEF_FN_PTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+[^;{()]*\(\s*[*^]\s*(\w+)\s*\)\s*\(").unwrap());
static TYPEDEF_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+([^;{()]+);").unwrap());
static DEFINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s*define\s+(\w+)").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)").unwrap());

/// Macro prefixes owned by the system or the preprocessor
const RESERVED_MACRO_PREFIXES: &[&str] = &["__", "NS_", "UI_", "CG_", "CF_", "k"];

/// What a pending `typedef enum {`/`typedef struct {` will become once its
/// closing `} Name;` line arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingBrace {
    Enum,
    Struct,
}

/// Scanner context while inside an `@interface`/`@implementation`/
/// `@protocol` body
#[derive(Debug, Default)]
struct BodyContext {
    enclosing: Option<String>,
    in_protocol: bool,
}

impl BodyContext {
    fn enter(&mut self, name: &str, is_protocol: bool) {
        self.enclosing = Some(name.to_string());
        self.in_protocol = is_protocol;
    }

    fn clear(&mut self) {
        self.enclosing = None;
        self.in_protocol = false;
    }
}

pub struct ObjCParser {
    whitelist: Whitelist,
}

impl ObjCParser {
    pub fn new(whitelist: Whitelist) -> Self {
        Self { whitelist }
    }

    fn allowed(&self, name: &str) -> bool {
        !self.whitelist.is_whitelisted(name)
    }

    fn scan(&self, content: &str, path: &Path) -> ParsedFile {
        let mut protector = StringLiteralProtector::new();
        let masked = protector.protect(content, Language::ObjectiveC);

        let mut parsed = ParsedFile::new(path.to_path_buf(), Language::ObjectiveC);
        let mut state = LineState::Code;
        let mut body = BodyContext::default();
        let mut pending_brace: Option<PendingBrace> = None;

        for (index, raw) in masked.lines().enumerate() {
            let line_number = index + 1;
            let continues = raw.trim_end().ends_with('\\');

            match state {
                LineState::Continuation => {
                    if !continues {
                        state = LineState::Code;
                    }
                    continue;
                }
                LineState::BlockComment => {
                    if raw.contains("*/") {
                        state = LineState::Code;
                    }
                    continue;
                }
                LineState::Code => {}
            }

            let stripped = strip_comments(raw, &mut state);
            let line = stripped.trim();
            if line.is_empty() {
                if continues {
                    state = LineState::Continuation;
                }
                continue;
            }

            self.scan_line(line, line_number, &mut parsed, &mut body, &mut pending_brace);

            if continues {
                state = LineState::Continuation;
            }
        }

        parsed
    }

    fn scan_line(
        &self,
        line: &str,
        line_number: usize,
        parsed: &mut ParsedFile,
        body: &mut BodyContext,
        pending_brace: &mut Option<PendingBrace>,
    ) {
        if let Some(caps) = IMPORT.captures(line) {
            if let Some(module) = import_name(&caps[1]) {
                parsed.imports.insert(module);
            }
            return;
        }

        if let Some(caps) = FORWARD_CLASS.captures(line) {
            for name in split_names(&caps[1]) {
                parsed.forward_declarations.insert(name);
            }
            return;
        }

        if let Some(caps) = FORWARD_PROTOCOL.captures(line) {
            for name in split_names(&caps[1]) {
                parsed.forward_declarations.insert(name);
            }
            return;
        }

        if line.starts_with("@end") {
            body.clear();
            return;
        }

        if let Some(caps) = INTERFACE_CATEGORY.captures(line) {
            let class_name = caps[1].to_string();
            let category = caps[2].to_string();
            body.enter(&class_name, false);
            // Anonymous `()` class extensions reopen the class, no symbol
            if !category.is_empty() {
                let full = format!("{class_name}+{category}");
                if self.allowed(&full) {
                    parsed.symbols.push(
                        Symbol::new(full, SymbolKind::Category, parsed.file.clone(), line_number)
                            .with_original_line(line)
                            .with_parent(Some(class_name)),
                    );
                }
            }
            return;
        }

        if let Some(caps) = INTERFACE.captures(line) {
            let name = caps[1].to_string();
            let superclass = caps.get(2).map(|m| m.as_str().to_string());
            body.enter(&name, false);
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Class, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_parent(superclass),
                );
            }
            return;
        }

        if let Some(caps) = IMPLEMENTATION.captures(line) {
            let name = caps[1].to_string();
            body.enter(&name, false);
            match caps.get(2) {
                Some(category) => {
                    let full = format!("{name}+{}", category.as_str());
                    if self.allowed(&full) {
                        parsed.symbols.push(
                            Symbol::new(
                                full,
                                SymbolKind::Category,
                                parsed.file.clone(),
                                line_number,
                            )
                            .with_original_line(line)
                            .with_parent(Some(name)),
                        );
                    }
                }
                None => {
                    if self.allowed(&name) {
                        parsed.symbols.push(
                            Symbol::new(name, SymbolKind::Class, parsed.file.clone(), line_number)
                                .with_original_line(line),
                        );
                    }
                }
            }
            return;
        }

        if let Some(caps) = PROTOCOL.captures(line) {
            let name = caps[1].to_string();
            body.enter(&name, true);
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Protocol, parsed.file.clone(), line_number)
                        .with_original_line(line),
                );
            }
            return;
        }

        if body.enclosing.is_some() {
            self.scan_member_line(line, line_number, parsed, body);
            return;
        }

        if let Some(tag) = pending_brace.take() {
            if let Some(caps) = BRACE_CLOSE.captures(line) {
                let name = caps[1].to_string();
                let kind = match tag {
                    PendingBrace::Enum => SymbolKind::Enum,
                    PendingBrace::Struct => SymbolKind::Struct,
                };
                if self.allowed(&name) {
                    parsed.symbols.push(
                        Symbol::new(name, kind, parsed.file.clone(), line_number)
                            .with_original_line(line),
                    );
                }
            } else {
                // Still inside the braced body
                *pending_brace = Some(tag);
            }
            return;
        }

        if let Some(caps) = NS_ENUM.captures(line) {
            let base = caps[1].to_string();
            let name = caps[2].to_string();
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Enum, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_return_type(base),
                );
            }
            return;
        }

        if let Some(caps) = TYPEDEF_BRACE_INLINE.captures(line) {
            let kind = match &caps[1] {
                "enum" => SymbolKind::Enum,
                _ => SymbolKind::Struct,
            };
            let name = caps[2].to_string();
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, kind, parsed.file.clone(), line_number)
                        .with_original_line(line),
                );
            }
            return;
        }

        if let Some(caps) = TYPEDEF_BRACE_OPEN.captures(line) {
            *pending_brace = Some(match &caps[1] {
                "enum" => PendingBrace::Enum,
                _ => PendingBrace::Struct,
            });
            return;
        }

        if let Some(caps) = TYPEDEF_FN_PTR.captures(line) {
            let name = caps[1].to_string();
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Typedef, parsed.file.clone(), line_number)
                        .with_original_line(line),
                );
            }
            return;
        }

        if let Some(caps) = TYPEDEF_PLAIN.captures(line) {
            if let Some((old_type, name)) = split_typedef(&caps[1]) {
                if self.allowed(&name) {
                    parsed.symbols.push(
                        Symbol::new(name, SymbolKind::Typedef, parsed.file.clone(), line_number)
                            .with_original_line(line)
                            .with_return_type(old_type),
                    );
                }
            }
            return;
        }

        if let Some(caps) = DEFINE.captures(line) {
            let name = caps[1].to_string();
            if is_reserved_macro(&name) {
                return;
            }
            if self.allowed(&name) {
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Macro, parsed.file.clone(), line_number)
                        .with_original_line(line),
                );
            }
        }
        // Anything else is ordinary code and is ignored.
    }

    fn scan_member_line(
        &self,
        line: &str,
        line_number: usize,
        parsed: &mut ParsedFile,
        body: &BodyContext,
    ) {
        let parent = body.enclosing.clone();

        if let Some(caps) = PROPERTY_BLOCK.captures(line) {
            let name = caps[3].to_string();
            if self.allowed(&name) {
                let return_type = caps.get(2).map(|m| m.as_str().trim().to_string());
                parsed.symbols.push(
                    Symbol::new(name, SymbolKind::Property, parsed.file.clone(), line_number)
                        .with_original_line(line)
                        .with_parent(parent)
                        .with_return_type(return_type.unwrap_or_default()),
                );
            }
            return;
        }

        if let Some(caps) = PROPERTY.captures(line) {
            let declaration = caps[2].to_string();
            if let Some((type_part, name)) = split_declaration(&declaration) {
                if self.allowed(&name) {
                    parsed.symbols.push(
                        Symbol::new(name, SymbolKind::Property, parsed.file.clone(), line_number)
                            .with_original_line(line)
                            .with_parent(parent)
                            .with_return_type(type_part),
                    );
                }
            }
            return;
        }

        if let Some(caps) = METHOD.captures(line) {
            let is_static = &caps[1] == "+";
            let return_type = caps[2].trim().to_string();
            let tail = caps[3].to_string();
            if let Some((name, parameters)) = parse_selector(&tail) {
                if self.allowed(&name) {
                    parsed.symbols.push(
                        Symbol::new(name, SymbolKind::Method, parsed.file.clone(), line_number)
                            .with_original_line(line)
                            .with_parent(parent)
                            .with_static(is_static)
                            .with_return_type(return_type)
                            .with_parameters(parameters),
                    );
                }
            }
        }
    }
}

impl SymbolParser for ObjCParser {
    fn parse_source(&self, content: &str, path: &Path) -> ParsedFile {
        self.scan(content, path)
    }

    fn language(&self) -> Language {
        Language::ObjectiveC
    }
}

/// `#import <UIKit/UIKit.h>` → `UIKit`; the path prefix and extension drop
fn import_name(raw: &str) -> Option<String> {
    let file = raw.rsplit('/').next()?;
    let stem = file.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|part| WORD.captures(part).map(|c| c[1].to_string()))
        .collect()
}

/// Assemble the selector from a method tail.
///
/// `foo:(T)a bar:(U)b` yields `("foo:bar:", ["a", "b"])`; a tail with no
/// colon yields the leading identifier and no parameters.
fn parse_selector(tail: &str) -> Option<(String, Vec<String>)> {
    let mut labels = Vec::new();
    let mut parameters = Vec::new();
    for caps in METHOD_SEGMENT.captures_iter(tail) {
        labels.push(caps[1].to_string());
        parameters.push(caps[3].to_string());
    }

    if labels.is_empty() {
        let name = WORD.captures(tail)?.get(1)?.as_str().to_string();
        return Some((name, Vec::new()));
    }

    let mut name = labels.join(":");
    name.push(':');
    Some((name, parameters))
}

/// Split `NSDictionary<NSString *, NSNumber *> *map` into type and name:
/// the trailing identifier is the name, everything before it the type.
fn split_declaration(declaration: &str) -> Option<(String, String)> {
    let last = WORD.captures_iter(declaration).last()?;
    let m = last.get(1)?;
    // The name must be the trailing identifier, not a type token
    if !declaration[m.end()..].trim().is_empty() {
        return None;
    }
    let name = m.as_str().to_string();
    let type_part = declaration[..m.start()].trim().to_string();
    Some((type_part, name))
}

/// `typedef NSString *UserID` → `("NSString *", "UserID")`
fn split_typedef(body: &str) -> Option<(String, String)> {
    let (type_part, name) = split_declaration(body.trim())?;
    if type_part.is_empty() {
        return None;
    }
    Some((type_part, name))
}

fn is_reserved_macro(name: &str) -> bool {
    RESERVED_MACRO_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
