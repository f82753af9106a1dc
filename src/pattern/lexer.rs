//! The lexer state machine.
//!
//! Parsing and generation are fused: each state consumes characters from
//! the cursor, builds a [`GeneratorNode`] when a construct is complete,
//! generates it at once and returns the next state. There is no parse tree.

use tracing::trace;

use crate::error::{ErrorKind, PatternError};

use super::char_class::{CharSet, ClassBuilder, digit_class, named_class, word_class};
use super::context::Context;
use super::cursor::Cursor;
use super::function;
use super::group;
use super::node::{GeneratorNode, Generated};
use super::repeat::{self, MAX_REPEAT, RepeatCount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Between constructs; literal characters are emitted directly.
    Literal,
    /// After `\`.
    Escape,
    /// After `[`.
    CharClass,
    /// After `{`.
    Repeat,
    /// After `(`.
    Group,
    /// After `$`.
    Function,
    Done,
}

struct Lexer<'c, 'r, 'i> {
    ctx: &'c mut Context<'r>,
    cursor: Cursor<'i>,
}

/// Interpret `input` against `ctx`, returning its output and entropy.
pub fn run(ctx: &mut Context<'_>, input: &[char]) -> Result<Generated, PatternError> {
    let mut lexer = Lexer {
        ctx,
        cursor: Cursor::new(input),
    };
    let mut state = LexState::Literal;
    while state != LexState::Done {
        trace!(?state, pos = lexer.cursor.pos(), "lex");
        state = lexer.step(state)?;
    }
    Ok(lexer.cursor.finish())
}

impl Lexer<'_, '_, '_> {
    fn step(&mut self, state: LexState) -> Result<LexState, PatternError> {
        match state {
            LexState::Literal => self.lex_literal(),
            LexState::Escape => self.lex_escape(),
            LexState::CharClass => self.lex_char_class(),
            LexState::Repeat => self.lex_repeat(),
            LexState::Group => self.lex_group(),
            LexState::Function => self.lex_function(),
            LexState::Done => Ok(LexState::Done),
        }
    }

    fn error(&self, kind: ErrorKind, pos: usize, len: usize, msg: impl Into<String>) -> PatternError {
        self.ctx.error(kind, pos, len, msg)
    }

    /// Generate `node`, append its output and make it the repeatable node.
    ///
    /// `group_base` is the last group id allocated before the construct was
    /// lexed. Building a node may already have allocated ids past it.
    fn emit(&mut self, node: GeneratorNode, group_base: u32) -> Result<LexState, PatternError> {
        let generated = repeat::generate_at(self.ctx, &node, group_base)?;
        self.cursor.emit(node, generated, group_base);
        Ok(LexState::Literal)
    }

    fn lex_literal(&mut self) -> Result<LexState, PatternError> {
        let start = self.cursor.pos();
        let Some(c) = self.cursor.next() else {
            return Ok(LexState::Done);
        };
        self.cursor.start_token(start);
        match c {
            '\\' => Ok(LexState::Escape),
            '[' => Ok(LexState::CharClass),
            '(' => Ok(LexState::Group),
            '{' => Ok(LexState::Repeat),
            '$' => Ok(LexState::Function),
            ')' | '}' => Err(self.error(ErrorKind::Syntax, start, 1, format!("unmatched '{c}'"))),
            _ => {
                let base = self.ctx.last_group_id();
                self.emit(GeneratorNode::Static(c.to_string()), base)
            }
        }
    }

    fn lex_escape(&mut self) -> Result<LexState, PatternError> {
        let start = self.cursor.token_start;
        let base = self.ctx.last_group_id();
        let Some(c) = self.cursor.next() else {
            return Err(self.error(ErrorKind::Syntax, start, 1, "pattern ends with a lone backslash"));
        };
        match c {
            'd' => self.emit(GeneratorNode::CharClass(CharSet::new(digit_class())), base),
            'w' => self.emit(GeneratorNode::CharClass(CharSet::new(word_class())), base),
            '0'..='9' => self.lex_backref(c),
            'u' | 'U' => {
                let ch = self.read_codepoint(start, if c == 'u' { 4 } else { 8 })?;
                self.emit(GeneratorNode::Static(ch.to_string()), base)
            }
            _ => self.emit(GeneratorNode::Static(simple_escape(c).to_string()), base),
        }
    }

    fn lex_backref(&mut self, first: char) -> Result<LexState, PatternError> {
        let start = self.cursor.token_start;
        let base = self.ctx.last_group_id();
        let mut digits = String::from(first);
        while let Some(d) = self.cursor.peek().filter(char::is_ascii_digit) {
            digits.push(d);
            self.cursor.next();
        }
        let text = digits
            .parse::<u32>()
            .ok()
            .and_then(|id| self.ctx.group_text(id))
            .map(str::to_string);
        match text {
            Some(text) => self.emit(GeneratorNode::Static(text), base),
            None => Err(self.error(
                ErrorKind::Value,
                start,
                self.cursor.token_len(),
                format!("invalid group id '{digits}'"),
            )),
        }
    }

    /// Read the hex digits of a `\u`/`\U` escape starting at `start`.
    fn read_codepoint(&mut self, start: usize, digits: usize) -> Result<char, PatternError> {
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.cursor.next() {
                Some(c) => hex.push(c),
                None => {
                    return Err(self.error(
                        ErrorKind::Syntax,
                        start,
                        self.cursor.pos() - start,
                        "incomplete unicode escape",
                    ));
                }
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                self.error(
                    ErrorKind::Value,
                    start,
                    self.cursor.pos() - start,
                    format!("invalid unicode escape '{hex}'"),
                )
            })
    }

    fn lex_char_class(&mut self) -> Result<LexState, PatternError> {
        let open = self.cursor.token_start;
        let base = self.ctx.last_group_id();
        let mut class = ClassBuilder::new();
        loop {
            let at = self.cursor.pos();
            let Some(c) = self.cursor.next() else {
                return Err(self.error(
                    ErrorKind::Syntax,
                    open,
                    self.cursor.token_len(),
                    "unterminated character class",
                ));
            };
            match c {
                ']' => break,
                '^' if class.is_fresh() => class.negate(),
                '[' => {
                    return Err(self.error(ErrorKind::Syntax, at, 1, "nested '[' in character class"));
                }
                '{' | '$' => {
                    return Err(self.error(
                        ErrorKind::Syntax,
                        at,
                        1,
                        format!("'{c}' is not allowed in a character class"),
                    ));
                }
                '\\' => self.lex_class_escape(&mut class, at)?,
                ':' => self.lex_class_name(&mut class, at)?,
                '-' => self.lex_class_range(&mut class, at)?,
                _ => class.push(c),
            }
        }
        self.emit(GeneratorNode::CharClass(class.finish()), base)
    }

    fn lex_class_escape(&mut self, class: &mut ClassBuilder, at: usize) -> Result<(), PatternError> {
        // A backslash at the very end is reported as an unterminated class.
        let Some(c) = self.cursor.next() else {
            return Ok(());
        };
        match c {
            'd' => class.extend(digit_class()),
            'w' => class.extend(word_class()),
            'u' => class.push(self.read_codepoint(at, 4)?),
            'U' => class.push(self.read_codepoint(at, 8)?),
            _ => class.push(simple_escape(c)),
        }
        Ok(())
    }

    /// `:name:` inside a class. A colon that does not start a well-formed
    /// name is a literal.
    fn lex_class_name(&mut self, class: &mut ClassBuilder, colon: usize) -> Result<(), PatternError> {
        let mut name = String::new();
        loop {
            match self.cursor.peek_at(name.len()) {
                Some(':') if !name.is_empty() => break,
                Some(c) if c.is_ascii_alphanumeric() => name.push(c),
                _ => {
                    class.push(':');
                    return Ok(());
                }
            }
        }
        self.cursor.seek(colon + name.len() + 2);
        match named_class(&name) {
            Some(chars) => {
                class.extend(chars);
                Ok(())
            }
            None => Err(self.error(
                ErrorKind::Value,
                colon,
                name.len() + 2,
                format!("invalid character class \"{name}\""),
            )),
        }
    }

    fn lex_class_range(&mut self, class: &mut ClassBuilder, dash: usize) -> Result<(), PatternError> {
        let next = self.cursor.peek().filter(|c| *c != ']');
        let (Some(_), Some(next)) = (class.range_start(), next) else {
            class.push('-');
            return Ok(());
        };
        let at = self.cursor.pos();
        match next {
            '[' => {
                return Err(self.error(ErrorKind::Syntax, at, 1, "nested '[' in character class"));
            }
            '{' | '$' => {
                return Err(self.error(
                    ErrorKind::Syntax,
                    at,
                    1,
                    format!("'{next}' is not allowed in a character class"),
                ));
            }
            _ => {}
        }
        self.cursor.next();
        let hi = match next {
            '\\' => {
                let Some(c) = self.cursor.next() else {
                    return Ok(());
                };
                match c {
                    'u' => self.read_codepoint(dash + 1, 4)?,
                    'U' => self.read_codepoint(dash + 1, 8)?,
                    'd' | 'w' => {
                        return Err(self.error(
                            ErrorKind::Value,
                            dash + 1,
                            2,
                            "a class escape cannot end a range",
                        ));
                    }
                    _ => simple_escape(c),
                }
            }
            c => c,
        };
        if class.close_range(hi) {
            Ok(())
        } else {
            Err(self.error(
                ErrorKind::Value,
                dash,
                self.cursor.pos() - dash,
                "invalid character range",
            ))
        }
    }

    fn lex_repeat(&mut self) -> Result<LexState, PatternError> {
        let open = self.cursor.token_start;
        loop {
            match self.cursor.next() {
                Some('}') => break,
                Some(c) => self.cursor.buf.push(c),
                None => {
                    return Err(self.error(
                        ErrorKind::Syntax,
                        open,
                        self.cursor.token_len(),
                        "unterminated repeat",
                    ));
                }
            }
        }
        let len = self.cursor.token_len();
        let body: String = self.cursor.buf.iter().collect();
        let count = RepeatCount::parse(&body).map_err(|msg| self.error(ErrorKind::Value, open, len, msg))?;
        let Some(last) = self.cursor.take_last() else {
            return Err(self.error(ErrorKind::Syntax, open, len, "nothing to repeat"));
        };
        if count.max().saturating_mul(last.node.multiplicity()) > MAX_REPEAT {
            return Err(self.error(ErrorKind::Value, open, len, "repeat count too large"));
        }
        let (emitted, extra) = repeat::realize(self.ctx, last, count)?;
        self.cursor.extend_output(extra);
        self.cursor.restore_last(emitted);
        Ok(LexState::Literal)
    }

    fn lex_group(&mut self) -> Result<LexState, PatternError> {
        let open = self.cursor.token_start;
        let base = self.ctx.last_group_id();
        let Some(close) = self.cursor.find_closing_paren(open) else {
            return Err(self.error(
                ErrorKind::Syntax,
                open,
                self.cursor.len() - open,
                "unterminated group",
            ));
        };
        let body = self.cursor.sub_pattern(open + 1, close);
        self.cursor.seek(close + 1);
        let node = group::build(self.ctx, body)?;
        self.emit(node, base)
    }

    fn lex_function(&mut self) -> Result<LexState, PatternError> {
        let dollar = self.cursor.token_start;
        let base = self.ctx.last_group_id();
        if self.cursor.peek() == Some('?') {
            self.cursor.next();
            self.cursor.buf.push('?');
        } else {
            while let Some(c) = self
                .cursor
                .peek()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            {
                self.cursor.buf.push(c);
                self.cursor.next();
            }
        }
        let name: String = self.cursor.buf.iter().collect();
        match self.cursor.peek() {
            Some('(') if !name.is_empty() => {}
            Some('(') => {
                return Err(self.error(ErrorKind::Syntax, dollar, 1, "missing function name"));
            }
            Some(_) => {
                return Err(self.error(
                    ErrorKind::Syntax,
                    dollar,
                    self.cursor.token_len() + 1,
                    "expected '(' after function name",
                ));
            }
            None => {
                return Err(self.error(
                    ErrorKind::Syntax,
                    dollar,
                    self.cursor.token_len(),
                    "unterminated function call",
                ));
            }
        }
        let open = self.cursor.pos();
        let Some(close) = self.cursor.find_closing_paren(open) else {
            return Err(self.error(
                ErrorKind::Syntax,
                dollar,
                self.cursor.len() - dollar,
                "unterminated function call",
            ));
        };
        let Some(func) = function::lookup(&name) else {
            return Err(self.error(
                ErrorKind::Value,
                dollar,
                open + 1 - dollar,
                format!("invalid function '{name}'"),
            ));
        };
        let call = function::CallSite {
            start: dollar,
            len: close + 1 - dollar,
        };
        let args = self.cursor.sub_pattern(open + 1, close);
        self.cursor.seek(close + 1);
        let node = function::build(self.ctx, func, &call, args)?;
        self.emit(node, base)
    }
}

/// Single-character escapes shared by patterns and class bodies.
fn simple_escape(c: char) -> char {
    match c {
        't' => '\t',
        'r' => '\r',
        'n' => '\n',
        'v' => '\u{b}',
        'f' => '\u{c}',
        _ => c,
    }
}

