//! Groups, alternation and the group-id bookkeeping behind back-references.
//!
//! Group ids are textual: a group's id is fixed by the position of its
//! opening parenthesis, whichever alternation branches are chosen. Groups
//! in branches that were not chosen are recorded as empty text.

use tracing::debug;

use crate::error::{ErrorKind, PatternError};
use crate::split;

use super::context::Context;
use super::node::{GeneratorNode, Generated, SubPattern};

/// Build the node for a `(...)` whose body has been scanned.
pub fn build(ctx: &mut Context<'_>, body: SubPattern) -> Result<GeneratorNode, PatternError> {
    let id = ctx.open_group();
    let parts = split::split(&body.text, '|')
        .map_err(|err| ctx.error(ErrorKind::Syntax, body.offset + err.pos(), 1, err.to_string()))?;
    if parts.len() == 1 {
        return Ok(GeneratorNode::Group { id, body });
    }
    let parts: Vec<SubPattern> = parts
        .into_iter()
        .map(|part| SubPattern::new(part.text, body.offset + part.offset))
        .collect();
    debug!(id, branches = parts.len(), "alternation");
    Ok(GeneratorNode::Alternation { id, parts })
}

/// Generate group `id` from its body (one part) or its branches, and
/// record the result for back-references.
pub fn generate(
    ctx: &mut Context<'_>,
    id: u32,
    parts: &[SubPattern],
) -> Result<Generated, PatternError> {
    let resume = ctx.last_group_id();
    ctx.set_last_group_id(id);
    let generated = match parts {
        [body] => ctx.evaluate(body)?,
        _ => alternate(ctx, parts)?,
    };
    ctx.set_last_group_id(resume.max(ctx.last_group_id()));
    debug!(id, text_len = generated.text.len(), entropy = generated.entropy, "group");
    ctx.record_group(id, generated.text.clone());
    Ok(generated)
}

/// Choose one branch uniformly.
///
/// Entropy is a lower bound: `log2(branches)` plus the smallest entropy of
/// any branch. Every other branch is measured by a probe against a copy of
/// the context, taken before the chosen branch is generated.
fn alternate(ctx: &mut Context<'_>, parts: &[SubPattern]) -> Result<Generated, PatternError> {
    let base = ctx.last_group_id();
    let counts: Vec<u32> = parts.iter().map(|part| count_groups(&part.text)).collect();
    let firsts: Vec<u32> = counts
        .iter()
        .scan(base, |next, count| {
            let first = *next;
            *next += count;
            Some(first)
        })
        .collect();

    let choice = ctx.uniform(parts.len());
    let mut min_entropy = f64::INFINITY;
    for (k, (part, &first)) in parts.iter().zip(&firsts).enumerate() {
        if k != choice {
            min_entropy = min_entropy.min(ctx.estimate_entropy(part, first)?);
        }
    }

    ctx.set_last_group_id(firsts[choice]);
    let chosen = ctx.evaluate(&parts[choice])?;
    min_entropy = min_entropy.min(chosen.entropy);

    for (k, (&first, &count)) in firsts.iter().zip(&counts).enumerate() {
        if k != choice {
            for id in first + 1..=first + count {
                ctx.record_group(id, String::new());
            }
        }
    }
    ctx.set_last_group_id(base + counts.iter().sum::<u32>());

    let entropy = (parts.len() as f64).log2() + min_entropy;
    Ok(Generated::new(chosen.text, entropy))
}

/// Number of groups a pattern opens, counted over its text.
///
/// Escaped parens, parens inside brackets and the argument list of a
/// function call are not groups.
pub fn count_groups(text: &[char]) -> u32 {
    let mut count = 0;
    let mut in_bracket = false;
    let mut i = 0;
    while i < text.len() {
        match text[i] {
            '\\' => {
                i += 2;
                continue;
            }
            ']' if in_bracket => in_bracket = false,
            _ if in_bracket => {}
            '[' => in_bracket = true,
            '$' => {
                i += 1;
                if text.get(i) == Some(&'?') {
                    i += 1;
                } else {
                    while text.get(i).is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_') {
                        i += 1;
                    }
                }
                if text.get(i) == Some(&'(') {
                    i += 1;
                }
                continue;
            }
            '(' => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn counts_plain_and_nested_groups() {
        assert_eq!(count_groups(&chars("abc")), 0);
        assert_eq!(count_groups(&chars("(a)(b(c))")), 3);
    }

    #[test]
    fn escapes_and_brackets_are_not_groups() {
        assert_eq!(count_groups(&chars(r"\(a\)")), 0);
        assert_eq!(count_groups(&chars("[()](x)")), 1);
    }

    #[test]
    fn function_parens_are_not_groups() {
        assert_eq!(count_groups(&chars("$hex((a))")), 1);
        assert_eq!(count_groups(&chars("$?(b)$byte()")), 0);
    }
}
