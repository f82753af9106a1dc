//! Character classes: named sets, bracket expression assembly and sampling.

use itertools::Itertools;
use phf::{Map, phf_map};

use super::context::Context;
use super::node::Generated;

/// Named classes usable as `[:name:]`, written in range notation.
/// Please keep names sorted alphabetically.
const NAMED_CLASSES: Map<&'static str, &'static str> = phf_map! {
    "alnum" => "A-Za-z0-9",
    "alpha" => "A-Za-z",
    "ascii" => "\u{0}-\u{7f}",
    "base32" => "A-Z2-7",
    "base32hex" => "0-9A-V",
    "base64" => "A-Za-z0-9+/",
    "base64url" => "A-Za-z0-9_-",
    "blank" => " \t",
    "cntrl" => "\u{0}-\u{1f}\u{7f}",
    "digit" => "0-9",
    "graph" => "!-~",
    "lower" => "a-z",
    "print" => " -~",
    "punct" => "!-/:-@[-`{-~",
    "space" => " \t\n\r\u{b}\u{c}",
    "upper" => "A-Z",
    "word" => "A-Za-z0-9_",
    "xdigit" => "0-9a-fA-F",
};

/// Negated classes are taken relative to printable ASCII.
const NEGATION_UNIVERSE: std::ops::RangeInclusive<char> = ' '..='~';

/// Look up a named class, expanded to its members.
pub fn named_class(name: &str) -> Option<Vec<char>> {
    NAMED_CLASSES.get(name).map(|ranges| expand_ranges(ranges))
}

/// Members of `\d`.
pub fn digit_class() -> Vec<char> {
    expand_ranges("0-9")
}

/// Members of `\w`.
pub fn word_class() -> Vec<char> {
    expand_ranges("A-Za-z0-9_")
}

fn expand_ranges(ranges: &str) -> Vec<char> {
    let chars: Vec<char> = ranges.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            out.extend(chars[i]..=chars[i + 2]);
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// A deduplicated set of code points sampled uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    chars: Vec<char>,
}

impl CharSet {
    /// Build a set, dropping duplicates so repeated members carry no extra weight.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().unique().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Bits contributed by one sample.
    pub fn entropy(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.len() as f64).log2()
        }
    }

    /// Draw one member. An empty set yields nothing.
    pub fn sample(&self, ctx: &mut Context<'_>) -> Generated {
        if self.is_empty() {
            return Generated::empty();
        }
        let c = self.chars[ctx.uniform(self.len())];
        Generated::new(c.to_string(), self.entropy())
    }
}

/// Accumulates the members of a `[...]` expression as it is lexed.
#[derive(Debug, Default)]
pub struct ClassBuilder {
    chars: Vec<char>,
    negated: bool,
    /// Last single character added; the low end of a following `-` range.
    range_start: Option<char>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until anything (including negation) has been recorded.
    pub fn is_fresh(&self) -> bool {
        self.chars.is_empty() && !self.negated
    }

    pub fn negate(&mut self) {
        self.negated = true;
    }

    pub fn push(&mut self, c: char) {
        self.chars.push(c);
        self.range_start = Some(c);
    }

    pub fn extend(&mut self, chars: impl IntoIterator<Item = char>) {
        self.chars.extend(chars);
        self.range_start = None;
    }

    pub fn range_start(&self) -> Option<char> {
        self.range_start
    }

    /// Complete the range started by the last single character.
    ///
    /// Returns false when `hi` sorts before the start.
    pub fn close_range(&mut self, hi: char) -> bool {
        let Some(lo) = self.range_start.take() else {
            return false;
        };
        if hi < lo {
            return false;
        }
        self.chars.extend(lo..=hi);
        true
    }

    pub fn finish(self) -> CharSet {
        if self.negated {
            let excluded = CharSet::new(self.chars);
            CharSet::new(NEGATION_UNIVERSE.filter(|c| !excluded.contains(*c)))
        } else {
            CharSet::new(self.chars)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_classes_expand() {
        assert_eq!(named_class("lower").unwrap().len(), 26);
        assert_eq!(named_class("alnum").unwrap().len(), 62);
        assert_eq!(named_class("xdigit").unwrap().len(), 22);
        assert_eq!(named_class("punct").unwrap().len(), 32);
        assert_eq!(named_class("print").unwrap().len(), 95);
        assert_eq!(named_class("graph").unwrap().len(), 94);
        assert_eq!(named_class("ascii").unwrap().len(), 128);
        assert_eq!(named_class("cntrl").unwrap().len(), 33);
        assert_eq!(named_class("base32").unwrap().len(), 32);
        assert_eq!(named_class("base32hex").unwrap().len(), 32);
        assert_eq!(named_class("base64").unwrap().len(), 64);
        assert_eq!(named_class("base64url").unwrap().len(), 64);
        assert!(named_class("base64url").unwrap().contains(&'-'));
    }

    #[test]
    fn unknown_name() {
        assert!(named_class("nope").is_none());
    }

    #[test]
    fn duplicates_are_removed() {
        let set = CharSet::new("aabbbc".chars());
        assert_eq!(set.len(), 3);
        assert!((set.entropy() - 3f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn empty_set_has_no_entropy() {
        let set = CharSet::new(std::iter::empty());
        assert!(set.is_empty());
        assert_eq!(set.entropy(), 0.0);
    }

    #[test]
    fn builder_range() {
        let mut b = ClassBuilder::new();
        b.push('a');
        assert!(b.close_range('e'));
        let set = b.finish();
        assert_eq!(set.len(), 5);
        assert!(set.contains('c'));
    }

    #[test]
    fn builder_rejects_reversed_range() {
        let mut b = ClassBuilder::new();
        b.push('z');
        assert!(!b.close_range('a'));
    }

    #[test]
    fn range_after_splice_has_no_start() {
        let mut b = ClassBuilder::new();
        b.extend(digit_class());
        assert_eq!(b.range_start(), None);
    }

    #[test]
    fn negation_is_relative_to_printable_ascii() {
        let mut b = ClassBuilder::new();
        assert!(b.is_fresh());
        b.negate();
        assert!(!b.is_fresh());
        b.extend(named_class("alnum").unwrap());
        let set = b.finish();
        assert_eq!(set.len(), 95 - 62);
        assert!(set.contains('!'));
        assert!(!set.contains('a'));
        assert!(!set.contains('\u{e9}'));
    }
}
