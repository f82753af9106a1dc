//! `{n}` and `{min,max}` quantifiers.

use tracing::debug;

use crate::error::PatternError;

use super::context::Context;
use super::cursor::Emitted;
use super::node::{GeneratorNode, Generated};

/// Ceiling on the number of copies a quantifier (or chain of them) may emit.
pub const MAX_REPEAT: usize = 1 << 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    Exact(usize),
    /// Inclusive bounds.
    Between(usize, usize),
}

impl RepeatCount {
    /// Parse the text between the braces.
    pub fn parse(text: &str) -> Result<Self, String> {
        let count = match text.split_once(',') {
            Some((min, max)) => Self::Between(parse_bound(min)?, parse_bound(max)?),
            None => Self::Exact(parse_bound(text)?),
        };
        let (min, max) = count.bounds();
        if min == 0 {
            return Err("repeat count must be at least 1".to_string());
        }
        if max < min {
            return Err(format!("invalid repeat range {{{min},{max}}}"));
        }
        if max > MAX_REPEAT {
            return Err("repeat count too large".to_string());
        }
        Ok(count)
    }

    fn bounds(&self) -> (usize, usize) {
        match *self {
            Self::Exact(n) => (n, n),
            Self::Between(min, max) => (min, max),
        }
    }

    pub fn max(&self) -> usize {
        self.bounds().1
    }

    /// Pick the number of instances for one realization.
    pub fn draw(&self, ctx: &mut Context<'_>) -> usize {
        match *self {
            Self::Exact(n) => n,
            Self::Between(min, max) => min + ctx.uniform(max - min + 1),
        }
    }
}

fn parse_bound(text: &str) -> Result<usize, String> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid number '{text}'"));
    }
    text.parse()
        .map_err(|_| "repeat count too large".to_string())
}

/// Generate `node` with the group counter rewound to `group_base`, so
/// every realization allocates the same group ids.
pub fn generate_at(
    ctx: &mut Context<'_>,
    node: &GeneratorNode,
    group_base: u32,
) -> Result<Generated, PatternError> {
    let resume = ctx.last_group_id();
    ctx.set_last_group_id(group_base);
    let generated = node.generate(ctx)?;
    ctx.set_last_group_id(resume.max(ctx.last_group_id()));
    Ok(generated)
}

/// Apply a quantifier to the node the cursor generated last.
///
/// That node has already produced its first instance, so only the
/// remaining ones are generated here. Returns the repeat node that replaces
/// it as the cursor's last node, together with the extra output.
pub fn realize(
    ctx: &mut Context<'_>,
    last: Emitted,
    count: RepeatCount,
) -> Result<(Emitted, Generated), PatternError> {
    let n = count.draw(ctx);
    let mut extra = Generated::empty();
    for _ in 1..n {
        let generated = generate_at(ctx, &last.node, last.group_base)?;
        extra.text.push_str(&generated.text);
        extra.entropy += generated.entropy;
    }
    debug!(instances = n, entropy = last.entropy + extra.entropy, "repeat");
    let emitted = Emitted {
        entropy: last.entropy + extra.entropy,
        group_base: last.group_base,
        node: GeneratorNode::Repeat {
            child: Box::new(last.node),
            count,
            group_base: last.group_base,
        },
    };
    Ok((emitted, extra))
}

/// Generate a repeat node from scratch, as a chained quantifier does.
pub fn generate_repeat(
    ctx: &mut Context<'_>,
    child: &GeneratorNode,
    count: RepeatCount,
    group_base: u32,
) -> Result<Generated, PatternError> {
    let n = count.draw(ctx);
    let mut out = Generated::empty();
    for _ in 0..n {
        let generated = generate_at(ctx, child, group_base)?;
        out.text.push_str(&generated.text);
        out.entropy += generated.entropy;
    }
    Ok(out)
}
