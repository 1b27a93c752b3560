//! Pattern text over grapheme stack classes, and its compiled form.
//!
//! A pattern is a whitespace separated sequence of terms:
//!
//! * `[:name:]` accepts one stack the class `name` accepts. Inside the
//!   brackets operands `:name:` and `:!name:` combine with `&&` and `||`,
//!   `&&` binding tighter. All operands test the same stack.
//! * `( a | b )` accepts the first alternative that lets the rest of the
//!   pattern match. `(?P<name> ... )` does the same and names the group.
//!   Every group captures, numbered by the position of its opening
//!   parenthesis, starting from 1; group 0 is the whole match.
//! * A term followed by `?` is optional. It is tried before it is skipped.
//! * `$` accepts only at the end of the input and consumes nothing.
//!
//! The pattern as a whole may itself be a `|` separated list of alternatives.

use crate::{
    class_registry::{is_valid_name, ClassRegistry, Predicate},
    error::PatternError,
    gstack_ty::GraphemeStack,
};
use std::{fmt, iter::Peekable, str::CharIndices};

#[derive(Clone)]
pub(crate) enum ClassExpr {
    Ref {
        name: String,
        negated: bool,
        predicate: Predicate,
    },
    And(Vec<ClassExpr>),
    Or(Vec<ClassExpr>),
}

impl ClassExpr {
    pub(crate) fn eval(&self, stack: &GraphemeStack) -> bool {
        match self {
            ClassExpr::Ref {
                negated, predicate, ..
            } => predicate(stack) != *negated,
            ClassExpr::And(operands) => operands.iter().all(|expr| expr.eval(stack)),
            ClassExpr::Or(operands) => operands.iter().any(|expr| expr.eval(stack)),
        }
    }
}

impl fmt::Debug for ClassExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, operands: &[ClassExpr], op: &str) -> fmt::Result {
            for (idx, expr) in operands.iter().enumerate() {
                if idx != 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{:?}", expr)?;
            }
            Ok(())
        }
        match self {
            ClassExpr::Ref { name, negated, .. } => {
                write!(f, ":{}{}:", if *negated { "!" } else { "" }, name)
            }
            ClassExpr::And(operands) => join(f, operands, "&&"),
            ClassExpr::Or(operands) => join(f, operands, "||"),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Class(ClassExpr),
    End,
    Group {
        index: usize,
        alternatives: Vec<Vec<Term>>,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct Term {
    pub(crate) node: Node,
    pub(crate) optional: bool,
}

/// A pattern compiled against a [`ClassRegistry`].
///
/// The pattern holds its own handles to the predicates it references, so it
/// stays usable after the registry is dropped and may be shared across
/// threads.
#[derive(Clone)]
pub struct CompiledPattern {
    source: String,
    pub(crate) root: Node,
    pub(crate) group_count: usize,
    pub(crate) group_names: Vec<(String, usize)>,
}

impl CompiledPattern {
    pub(crate) fn compile(
        registry: &ClassRegistry,
        source: &str,
    ) -> Result<CompiledPattern, PatternError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            registry,
            tokens: &tokens,
            pos: 0,
            group_count: 1,
            group_names: Vec::new(),
        };
        let alternatives = parser.parse_alternatives()?;
        if let Some(token) = parser.tokens.get(parser.pos) {
            return Err(syntax(token, "unbalanced `)`"));
        }
        log::trace!(
            "compiled pattern `{}` with {} groups",
            source,
            parser.group_count
        );
        Ok(CompiledPattern {
            source: source.to_owned(),
            root: Node::Group {
                index: 0,
                alternatives,
            },
            group_count: parser.group_count,
            group_names: parser.group_names,
        })
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of capture groups, counting group 0.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Index of the group called `name`.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.group_names
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, idx)| idx)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledPattern").field(&self.source).finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Class(Vec<ClassToken>),
    Open(Option<String>),
    Close,
    Bar,
    Question,
    Dollar,
}

#[derive(Clone, Debug, PartialEq)]
enum ClassToken {
    Operand { name: String, negated: bool },
    And,
    Or,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    text: String,
}

fn syntax(token: &Token, reason: &'static str) -> PatternError {
    PatternError::Syntax {
        token: token.text.clone(),
        reason,
    }
}

fn syntax_at(source: &str, start: usize, reason: &'static str) -> PatternError {
    let token = source[start..]
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_owned();
    PatternError::Syntax { token, reason }
}

fn take_name(chars: &mut Peekable<CharIndices<'_>>, source: &str, start: usize) -> String {
    let mut end = start;
    while let Some(&(idx, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            end = idx + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    source[start..end].to_owned()
}

fn tokenize(source: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '[' => {
                let end = source[start..]
                    .find(']')
                    .map(|off| start + off)
                    .ok_or_else(|| syntax_at(source, start, "unterminated `[`"))?;
                let body = tokenize_class(&source[start + 1..end])
                    .map_err(|reason| PatternError::Syntax {
                        token: source[start..=end].to_owned(),
                        reason,
                    })?;
                while chars.peek().map_or(false, |&(idx, _)| idx <= end) {
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Class(body),
                    text: source[start..=end].to_owned(),
                });
                continue;
            }
            '(' => {
                if source[start + 1..].starts_with("?P<") {
                    for _ in 0..3 {
                        chars.next();
                    }
                    let name_start = start + 4;
                    let name = take_name(&mut chars, source, name_start);
                    match chars.next() {
                        Some((gt, '>')) if !name.is_empty() => {
                            tokens.push(Token {
                                kind: TokenKind::Open(Some(name)),
                                text: source[start..=gt].to_owned(),
                            });
                            continue;
                        }
                        _ => return Err(syntax_at(source, start, "malformed group name")),
                    }
                }
                TokenKind::Open(None)
            }
            ')' => TokenKind::Close,
            '|' => TokenKind::Bar,
            '?' => TokenKind::Question,
            '$' => TokenKind::Dollar,
            _ => return Err(syntax_at(source, start, "unexpected character")),
        };
        tokens.push(Token {
            kind,
            text: c.to_string(),
        });
    }
    Ok(tokens)
}

fn tokenize_class(body: &str) -> Result<Vec<ClassToken>, &'static str> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            ':' => {
                let negated = chars.peek().map_or(false, |&(_, c)| c == '!');
                if negated {
                    chars.next();
                }
                let name_start = start + 1 + usize::from(negated);
                let name = take_name(&mut chars, body, name_start);
                if name.is_empty() {
                    return Err("expected a class name");
                }
                match chars.next() {
                    Some((_, ':')) => tokens.push(ClassToken::Operand { name, negated }),
                    _ => return Err("class name must end with `:`"),
                }
            }
            '&' | '|' => match chars.next() {
                Some((_, next)) if next == c => tokens.push(if c == '&' {
                    ClassToken::And
                } else {
                    ClassToken::Or
                }),
                _ => return Err("expected `&&` or `||`"),
            },
            _ => return Err("unexpected character in class expression"),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    registry: &'a ClassRegistry,
    tokens: &'a [Token],
    pos: usize,
    group_count: usize,
    group_names: Vec<(String, usize)>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn parse_alternatives(&mut self) -> Result<Vec<Vec<Term>>, PatternError> {
        let mut alternatives = Vec::new();
        loop {
            let sequence = self.parse_sequence()?;
            match self.peek() {
                Some(token) if sequence.is_empty() => {
                    return Err(syntax(token, "empty alternative"));
                }
                None if sequence.is_empty() => {
                    return Err(PatternError::Syntax {
                        token: String::new(),
                        reason: "empty alternative",
                    });
                }
                _ => alternatives.push(sequence),
            }
            match self.peek() {
                Some(Token {
                    kind: TokenKind::Bar,
                    ..
                }) => self.pos += 1,
                _ => return Ok(alternatives),
            }
        }
    }

    fn parse_sequence(&mut self) -> Result<Vec<Term>, PatternError> {
        let mut terms = Vec::new();
        while let Some(token) = self.peek() {
            let node = match &token.kind {
                TokenKind::Bar | TokenKind::Close => break,
                TokenKind::Question => return Err(syntax(token, "nothing to make optional")),
                TokenKind::Dollar => {
                    self.pos += 1;
                    Node::End
                }
                TokenKind::Class(body) => {
                    self.pos += 1;
                    Node::Class(self.build_class(token, body)?)
                }
                TokenKind::Open(name) => {
                    self.pos += 1;
                    self.parse_group(token, name.as_deref())?
                }
            };
            let optional = matches!(
                self.peek(),
                Some(Token {
                    kind: TokenKind::Question,
                    ..
                })
            );
            if optional {
                self.pos += 1;
            }
            terms.push(Term { node, optional });
        }
        Ok(terms)
    }

    fn parse_group(&mut self, open: &Token, name: Option<&str>) -> Result<Node, PatternError> {
        let index = self.group_count;
        self.group_count += 1;
        if let Some(name) = name {
            debug_assert!(is_valid_name(name));
            if self.group_names.iter().any(|(n, _)| n == name) {
                return Err(PatternError::DuplicateGroup(name.to_owned()));
            }
            self.group_names.push((name.to_owned(), index));
        }
        let alternatives = self.parse_alternatives()?;
        match self.peek() {
            Some(Token {
                kind: TokenKind::Close,
                ..
            }) => {
                self.pos += 1;
                Ok(Node::Group {
                    index,
                    alternatives,
                })
            }
            _ => Err(syntax(open, "unbalanced `(`")),
        }
    }

    fn build_class(&self, token: &Token, body: &[ClassToken]) -> Result<ClassExpr, PatternError> {
        let mut any_of = Vec::new();
        let mut all_of = Vec::new();
        let mut expect_operand = true;
        for class_token in body {
            match (class_token, expect_operand) {
                (ClassToken::Operand { name, negated }, true) => {
                    let predicate = self
                        .registry
                        .get(name)
                        .ok_or_else(|| PatternError::UndefinedClass(name.clone()))?;
                    all_of.push(ClassExpr::Ref {
                        name: name.clone(),
                        negated: *negated,
                        predicate: predicate.clone(),
                    });
                    expect_operand = false;
                }
                (ClassToken::And, false) => expect_operand = true,
                (ClassToken::Or, false) => {
                    any_of.push(collapse(std::mem::take(&mut all_of), ClassExpr::And));
                    expect_operand = true;
                }
                _ => return Err(syntax(token, "operands and operators must alternate")),
            }
        }
        if expect_operand {
            return Err(syntax(token, "class expression ends without an operand"));
        }
        any_of.push(collapse(all_of, ClassExpr::And));
        Ok(collapse(any_of, ClassExpr::Or))
    }
}

fn collapse(mut operands: Vec<ClassExpr>, wrap: fn(Vec<ClassExpr>) -> ClassExpr) -> ClassExpr {
    match operands.len() {
        1 => operands.remove(0),
        _ => wrap(operands),
    }
}
