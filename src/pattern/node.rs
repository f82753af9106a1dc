//! Generator nodes.
//!
//! A node is what the lexer builds for one generating construct. It is
//! generated once as soon as it has been lexed, and kept around as the
//! cursor's last node so a following `{n}` quantifier can replay it.

use crate::error::PatternError;
use crate::transform::Transform;

use super::char_class::CharSet;
use super::context::Context;
use super::function::{self, Align, RandomCall};
use super::group;
use super::repeat::{self, RepeatCount};

/// Text produced by a pattern (or part of one) and the entropy, in bits,
/// of the random choices that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub text: String,
    pub entropy: f64,
}

impl Generated {
    pub fn new(text: String, entropy: f64) -> Self {
        Self { text, entropy }
    }

    /// Deterministic text.
    pub fn fixed(text: String) -> Self {
        Self { text, entropy: 0.0 }
    }

    pub fn empty() -> Self {
        Self::fixed(String::new())
    }
}

/// A slice of the enclosing input evaluated as a pattern in its own right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPattern {
    pub text: Vec<char>,
    /// Start of `text` within the enclosing input.
    pub offset: usize,
}

impl SubPattern {
    pub fn new(text: Vec<char>, offset: usize) -> Self {
        Self { text, offset }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum GeneratorNode {
    /// Literal text, escapes and back-references.
    Static(String),
    CharClass(CharSet),
    Group {
        id: u32,
        body: SubPattern,
    },
    /// A group whose body has top-level `|` branches.
    Alternation {
        id: u32,
        parts: Vec<SubPattern>,
    },
    Repeat {
        child: Box<GeneratorNode>,
        count: RepeatCount,
        group_base: u32,
    },
    /// `$name(...)` with a deterministic transform.
    Encode {
        transform: Transform,
        arg: SubPattern,
    },
    /// `$name(...)` that draws its own randomness.
    Random(RandomCall),
    /// `$?(...)`
    OnceOrNone(SubPattern),
    /// `$rjust`, `$ljust` and `$center`.
    Justify {
        align: Align,
        arg: SubPattern,
        width: usize,
        fill: char,
    },
}

impl GeneratorNode {
    pub fn generate(&self, ctx: &mut Context<'_>) -> Result<Generated, PatternError> {
        match self {
            Self::Static(text) => Ok(Generated::fixed(text.clone())),
            Self::CharClass(set) => Ok(set.sample(ctx)),
            Self::Group { id, body } => group::generate(ctx, *id, std::slice::from_ref(body)),
            Self::Alternation { id, parts } => group::generate(ctx, *id, parts),
            Self::Repeat {
                child,
                count,
                group_base,
            } => repeat::generate_repeat(ctx, child, *count, *group_base),
            Self::Encode { transform, arg } => function::generate_encode(ctx, transform, arg),
            Self::Random(call) => call.generate(ctx),
            Self::OnceOrNone(arg) => function::generate_once_or_none(ctx, arg),
            Self::Justify {
                align,
                arg,
                width,
                fill,
            } => function::generate_justify(ctx, *align, arg, *width, *fill),
        }
    }

    /// Upper bound on how many copies of its innermost node one `generate` emits.
    pub fn multiplicity(&self) -> usize {
        match self {
            Self::Repeat { child, count, .. } => count.max().saturating_mul(child.multiplicity()),
            _ => 1,
        }
    }
}
