//! Read cursor over one (sub-)pattern, plus the output it has produced so far.

use super::node::{GeneratorNode, Generated, SubPattern};

/// The most recently generated node and the entropy of that generation.
#[derive(Debug)]
pub struct Emitted {
    pub node: GeneratorNode,
    pub entropy: f64,
    /// Last group id allocated before the node was lexed. Replays rewind to it.
    pub group_base: u32,
}

pub struct Cursor<'i> {
    input: &'i [char],
    pos: usize,
    /// Characters of the token currently being assembled.
    pub buf: Vec<char>,
    /// Where the current token started.
    pub token_start: usize,
    last: Option<Emitted>,
    output: String,
    entropy: f64,
}

impl<'i> Cursor<'i> {
    pub fn new(input: &'i [char]) -> Self {
        Self {
            input,
            pos: 0,
            buf: Vec::new(),
            token_start: 0,
            last: None,
            output: String::new(),
            entropy: 0.0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    pub fn peek_at(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Jump to an absolute position in the input.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Begin assembling a token whose first character is at `start`.
    pub fn start_token(&mut self, start: usize) {
        self.token_start = start;
        self.buf.clear();
    }

    /// Characters consumed since the current token started.
    pub fn token_len(&self) -> usize {
        self.pos - self.token_start
    }

    /// Copy `[start, end)` of the input as a sub-pattern.
    pub fn sub_pattern(&self, start: usize, end: usize) -> SubPattern {
        SubPattern::new(self.input[start..end].to_vec(), start)
    }

    /// Index of the `)` matching the `(` at `open`, skipping escapes and
    /// bracket expressions.
    pub fn find_closing_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut in_bracket = false;
        let mut i = open;
        while i < self.input.len() {
            match self.input[i] {
                '\\' => {
                    i += 2;
                    continue;
                }
                ']' if in_bracket => in_bracket = false,
                _ if in_bracket => {}
                '[' => in_bracket = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Append generated output and remember the node that produced it.
    pub fn emit(&mut self, node: GeneratorNode, generated: Generated, group_base: u32) {
        self.output.push_str(&generated.text);
        self.entropy += generated.entropy;
        self.last = Some(Emitted {
            node,
            entropy: generated.entropy,
            group_base,
        });
    }

    /// Append output that extends the last node rather than replacing it.
    pub fn extend_output(&mut self, generated: Generated) {
        self.output.push_str(&generated.text);
        self.entropy += generated.entropy;
    }

    pub fn take_last(&mut self) -> Option<Emitted> {
        self.last.take()
    }

    pub fn restore_last(&mut self, emitted: Emitted) {
        self.last = Some(emitted);
    }

    pub fn finish(self) -> Generated {
        Generated::new(self.output, self.entropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn next_and_peek() {
        let input = chars("ab");
        let mut cursor = Cursor::new(&input);
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_at(1), Some('b'));
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn closing_paren_skips_nesting() {
        let input = chars("(a(b)c)d");
        let cursor = Cursor::new(&input);
        assert_eq!(cursor.find_closing_paren(0), Some(6));
        assert_eq!(cursor.find_closing_paren(2), Some(4));
    }

    #[test]
    fn closing_paren_skips_escapes_and_brackets() {
        let input = chars(r"(a\)[)]b)");
        let cursor = Cursor::new(&input);
        assert_eq!(cursor.find_closing_paren(0), Some(8));
    }

    #[test]
    fn closing_paren_missing() {
        let input = chars(r"(abc\)");
        let cursor = Cursor::new(&input);
        assert_eq!(cursor.find_closing_paren(0), None);
    }

    #[test]
    fn emit_accumulates() {
        let input = chars("");
        let mut cursor = Cursor::new(&input);
        cursor.emit(
            GeneratorNode::Static("ab".into()),
            Generated::fixed("ab".into()),
            0,
        );
        cursor.extend_output(Generated::new("c".into(), 1.5));
        assert!(cursor.take_last().is_some());
        assert!(cursor.take_last().is_none());
        let out = cursor.finish();
        assert_eq!(out.text, "abc");
        assert_eq!(out.entropy, 1.5);
    }
}
