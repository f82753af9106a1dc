//! `$name(...)` calls: the function catalog, argument checking and the
//! functions that draw their own randomness.

use chrono::{Datelike, Days, NaiveDate};
use itertools::Itertools;
use phf::{Map, phf_map};
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{ErrorKind, PatternError};
use crate::split;
use crate::transform::Transform;

use super::context::Context;
use super::group::count_groups;
use super::node::{GeneratorNode, Generated, SubPattern};
use super::repeat::MAX_REPEAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Hex,
    HexUpper,
    Base64,
    Base64Url,
    Base32,
    Base32Upper,
    Base32Std,
    Hex2Dec,
    PyHex,
    Escape,
    Json,
    Space,
    Expand,
    Bip39Encode,
    Romaji,
    Byte,
    ByteUpper,
    Bip39Word,
    Date,
    Shuffle,
    OnceOrNone,
    RJust,
    LJust,
    Center,
}

/// Please keep names sorted alphabetically (uppercase first).
const FUNCTIONS: Map<&'static str, Function> = phf_map! {
    "?" => Function::OnceOrNone,
    "BASE32" => Function::Base32Upper,
    "BYTE" => Function::ByteUpper,
    "HEX" => Function::HexUpper,
    "base32" => Function::Base32,
    "base32std" => Function::Base32Std,
    "base64" => Function::Base64,
    "base64url" => Function::Base64Url,
    "bip39encode" => Function::Bip39Encode,
    "bip39word" => Function::Bip39Word,
    "byte" => Function::Byte,
    "center" => Function::Center,
    "date" => Function::Date,
    "escape" => Function::Escape,
    "expand" => Function::Expand,
    "hex" => Function::Hex,
    "hex2dec" => Function::Hex2Dec,
    "json" => Function::Json,
    "ljust" => Function::LJust,
    "pyhex" => Function::PyHex,
    "rjust" => Function::RJust,
    "romaji" => Function::Romaji,
    "shuffle" => Function::Shuffle,
    "space" => Function::Space,
};

pub fn lookup(name: &str) -> Option<Function> {
    FUNCTIONS.get(name).copied()
}

/// Span of a whole call, `$` through `)`, local to the calling pattern.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Functions with their own entropy model.
#[derive(Debug, Clone)]
pub enum RandomCall {
    /// One byte as two hex digits.
    Byte { upper: bool },
    /// Words from the BIP-39 English list.
    Bip39Words(usize),
    /// A day in `[first, first + days)`.
    Date {
        first: NaiveDate,
        days: usize,
        sep: String,
    },
    /// The argument's output with its characters permuted.
    Shuffle(SubPattern),
}

impl RandomCall {
    pub fn generate(&self, ctx: &mut Context<'_>) -> Result<Generated, PatternError> {
        match self {
            Self::Byte { upper } => {
                let byte = ctx.uniform(256);
                let text = if *upper {
                    format!("{byte:02X}")
                } else {
                    format!("{byte:02x}")
                };
                Ok(Generated::new(text, 8.0))
            }
            Self::Bip39Words(n) => {
                let words = bip39::Language::English.word_list();
                let text = (0..*n).map(|_| words[ctx.uniform(words.len())]).join(" ");
                Ok(Generated::new(text, *n as f64 * (words.len() as f64).log2()))
            }
            Self::Date { first, days, sep } => {
                let offset = ctx.uniform(*days) as u64;
                let date = first
                    .checked_add_days(Days::new(offset))
                    .ok_or_else(|| PatternError::new(ErrorKind::Unknown, "date out of range"))?;
                let text = format!(
                    "{:04}{sep}{:02}{sep}{:02}",
                    date.year(),
                    date.month(),
                    date.day()
                );
                Ok(Generated::new(text, (*days as f64).log2()))
            }
            Self::Shuffle(arg) => {
                let generated = ctx.evaluate(arg)?;
                let mut chars: Vec<char> = generated.text.chars().collect();
                chars.shuffle(ctx.rng());
                Ok(Generated::new(chars.into_iter().collect(), generated.entropy))
            }
        }
    }
}

/// Validate a call's arguments and build its node.
pub fn build(
    ctx: &mut Context<'_>,
    func: Function,
    call: &CallSite,
    args: SubPattern,
) -> Result<GeneratorNode, PatternError> {
    debug!(?func, "function call");
    let encode = |transform: Transform| -> Result<GeneratorNode, PatternError> {
        Ok(GeneratorNode::Encode {
            transform,
            arg: args.clone(),
        })
    };
    match func {
        Function::Hex => encode(Transform::Hex),
        Function::HexUpper => encode(Transform::HexUpper),
        Function::Base64 => encode(Transform::Base64),
        Function::Base64Url => encode(Transform::Base64Url),
        Function::Base32 => encode(Transform::Base32),
        Function::Base32Upper => encode(Transform::Base32Upper),
        Function::Base32Std => encode(Transform::Base32Std),
        Function::Hex2Dec => encode(Transform::Hex2Dec),
        Function::PyHex => encode(Transform::PyHex),
        Function::Escape => encode(Transform::Escape),
        Function::Json => encode(Transform::Json),
        Function::Space => encode(Transform::Expand(" ".to_string())),
        Function::Bip39Encode => encode(Transform::Bip39Encode),
        Function::Romaji => encode(Transform::Romaji),
        Function::Expand => {
            let [arg, sep] = fixed_args::<2>(ctx, call, &args, "expand expects 2 arguments")?;
            reserve_groups(ctx, &arg);
            let sep = literal_arg(ctx, &sep, "separator")?;
            Ok(GeneratorNode::Encode {
                transform: Transform::Expand(sep),
                arg,
            })
        }
        Function::Byte | Function::ByteUpper => {
            if !args.is_empty() {
                return Err(ctx.error(
                    ErrorKind::Argument,
                    call.start,
                    call.len,
                    "byte takes no arguments",
                ));
            }
            Ok(GeneratorNode::Random(RandomCall::Byte {
                upper: func == Function::ByteUpper,
            }))
        }
        Function::Bip39Word => {
            let n = if args.is_empty() {
                1
            } else {
                let text = literal_arg(ctx, &args, "word count")?;
                parse_number(ctx, &args, &text)?
            };
            if n == 0 || n > MAX_REPEAT {
                return Err(ctx.error(
                    ErrorKind::Value,
                    args.offset,
                    args.len(),
                    format!("invalid word count {n}"),
                ));
            }
            Ok(GeneratorNode::Random(RandomCall::Bip39Words(n)))
        }
        Function::Date => build_date(ctx, call, &args),
        Function::Shuffle => Ok(GeneratorNode::Random(RandomCall::Shuffle(args))),
        Function::OnceOrNone => Ok(GeneratorNode::OnceOrNone(args)),
        Function::RJust => build_justify(ctx, call, args, Align::Right),
        Function::LJust => build_justify(ctx, call, args, Align::Left),
        Function::Center => build_justify(ctx, call, args, Align::Center),
    }
}

fn split_args(ctx: &Context<'_>, args: &SubPattern) -> Result<Vec<SubPattern>, PatternError> {
    let parts = split::split(&args.text, ',')
        .map_err(|err| ctx.error(ErrorKind::Syntax, args.offset + err.pos(), 1, err.to_string()))?;
    Ok(parts
        .into_iter()
        .map(|part| SubPattern::new(part.text, args.offset + part.offset))
        .collect())
}

fn fixed_args<const N: usize>(
    ctx: &Context<'_>,
    call: &CallSite,
    args: &SubPattern,
    msg: &str,
) -> Result<[SubPattern; N], PatternError> {
    split_args(ctx, args)?
        .try_into()
        .map_err(|_| ctx.error(ErrorKind::Argument, call.start, call.len, msg))
}

/// Skip the group ids of a pattern argument that is generated after the
/// arguments following it have been evaluated.
fn reserve_groups(ctx: &mut Context<'_>, arg: &SubPattern) {
    ctx.set_last_group_id(ctx.last_group_id() + count_groups(&arg.text));
}

/// Evaluate an argument that must not be random.
fn literal_arg(ctx: &mut Context<'_>, arg: &SubPattern, what: &str) -> Result<String, PatternError> {
    let generated = ctx.evaluate(arg)?;
    if generated.entropy > 0.0 {
        return Err(ctx.error(
            ErrorKind::Value,
            arg.offset,
            arg.len(),
            format!("{what} must not be random"),
        ));
    }
    Ok(generated.text)
}

fn parse_number<T: std::str::FromStr>(
    ctx: &Context<'_>,
    arg: &SubPattern,
    text: &str,
) -> Result<T, PatternError> {
    text.parse()
        .map_err(|_| ctx.error(ErrorKind::Value, arg.offset, arg.len(), format!("invalid number '{text}'")))
}

fn build_date(
    ctx: &mut Context<'_>,
    call: &CallSite,
    args: &SubPattern,
) -> Result<GeneratorNode, PatternError> {
    let parts = split_args(ctx, args)?;
    if !(2..=3).contains(&parts.len()) {
        return Err(ctx.error(
            ErrorKind::Argument,
            call.start,
            call.len,
            "date expects a start year, an end year and an optional separator",
        ));
    }
    let mut years = Vec::with_capacity(2);
    for part in &parts[..2] {
        let text = literal_arg(ctx, part, "year")?;
        years.push(parse_number::<i32>(ctx, part, &text)?);
    }
    let (start, end) = (years[0], years[1]);
    let span = parts[1].offset + parts[1].len() - parts[0].offset;
    let range_err = |msg: String| ctx.error(ErrorKind::Value, parts[0].offset, span, msg);
    if end < start {
        return Err(range_err(format!("end year {end} is before start year {start}")));
    }
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(start, 1, 1),
        NaiveDate::from_ymd_opt(end, 12, 31),
    ) else {
        return Err(range_err(format!("year out of range {start}..{end}")));
    };
    let sep = match parts.get(2) {
        Some(part) => literal_arg(ctx, part, "separator")?,
        None => "-".to_string(),
    };
    let days = (last - first).num_days() as usize + 1;
    Ok(GeneratorNode::Random(RandomCall::Date { first, days, sep }))
}

fn build_justify(
    ctx: &mut Context<'_>,
    call: &CallSite,
    args: SubPattern,
    align: Align,
) -> Result<GeneratorNode, PatternError> {
    let mut parts = split_args(ctx, &args)?;
    if !(2..=3).contains(&parts.len()) {
        return Err(ctx.error(
            ErrorKind::Argument,
            call.start,
            call.len,
            "expected a pattern, a width and an optional fill character",
        ));
    }
    reserve_groups(ctx, &parts[0]);
    let width_text = literal_arg(ctx, &parts[1], "width")?;
    let width: usize = parse_number(ctx, &parts[1], &width_text)?;
    let fill = match parts.get(2) {
        Some(part) => {
            let text = literal_arg(ctx, part, "fill")?;
            match text.chars().exactly_one() {
                Ok(c) => c,
                Err(_) => {
                    return Err(ctx.error(
                        ErrorKind::Value,
                        part.offset,
                        part.len(),
                        "fill must be a single character",
                    ));
                }
            }
        }
        None => ' ',
    };
    if width > MAX_REPEAT {
        return Err(ctx.error(ErrorKind::Value, parts[1].offset, parts[1].len(), "width too large"));
    }
    let arg = parts.swap_remove(0);
    Ok(GeneratorNode::Justify {
        align,
        arg,
        width,
        fill,
    })
}

/// Evaluate the argument, then pass its output through `transform`.
pub fn generate_encode(
    ctx: &mut Context<'_>,
    transform: &Transform,
    arg: &SubPattern,
) -> Result<Generated, PatternError> {
    let generated = ctx.evaluate(arg)?;
    let text = transform.apply(&generated.text).map_err(|err| {
        ctx.error(ErrorKind::Value, arg.offset, arg.len(), err.to_string())
            .prepend(transform.name())
    })?;
    Ok(Generated::new(text, generated.entropy))
}

/// `$?(p)`: the argument is always evaluated and kept on a coin flip.
pub fn generate_once_or_none(
    ctx: &mut Context<'_>,
    arg: &SubPattern,
) -> Result<Generated, PatternError> {
    let generated = ctx.evaluate(arg)?;
    let text = if ctx.uniform(2) == 1 {
        generated.text
    } else {
        String::new()
    };
    Ok(Generated::new(text, 1.0))
}

pub fn generate_justify(
    ctx: &mut Context<'_>,
    align: Align,
    arg: &SubPattern,
    width: usize,
    fill: char,
) -> Result<Generated, PatternError> {
    let generated = ctx.evaluate(arg)?;
    let pad = width.saturating_sub(generated.text.chars().count());
    let (left, right) = match align {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };
    let fill = fill.to_string();
    let text = format!("{}{}{}", fill.repeat(left), generated.text, fill.repeat(right));
    Ok(Generated::new(text, generated.entropy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        assert_eq!(lookup("hex"), Some(Function::Hex));
        assert_eq!(lookup("HEX"), Some(Function::HexUpper));
        assert_eq!(lookup("?"), Some(Function::OnceOrNone));
        assert_eq!(lookup("Hex"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn every_function_is_reachable() {
        assert_eq!(FUNCTIONS.len(), 24);
    }
}
