//! Splitting argument text on a separator.
//!
//! Separators nested inside `()`, `[]` or `{}`, or escaped with a backslash,
//! do not split. Escapes are kept verbatim in the returned parts so that
//! each part is an exact slice of the input and can be evaluated as a
//! sub-pattern.

use thiserror::Error;

/// One part of a split argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Offset of the first character of the part within the split text.
    pub offset: usize,
    pub text: Vec<char>,
}

impl Part {
    pub fn to_text(&self) -> String {
        self.text.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("unexpected '{found}'")]
    Unexpected { pos: usize, found: char },
    #[error("unterminated '{open}'")]
    Unterminated { pos: usize, open: char },
}

impl SplitError {
    /// Position of the offending character within the split text.
    pub fn pos(&self) -> usize {
        match self {
            Self::Unexpected { pos, .. } | Self::Unterminated { pos, .. } => *pos,
        }
    }
}

/// Split `text` on top-level occurrences of `sep`.
///
/// An empty input yields a single empty part.
pub fn split(text: &[char], sep: char) -> Result<Vec<Part>, SplitError> {
    let mut parts = Vec::new();
    // (opening char, position)
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < text.len() {
        let c = text[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        match stack.last() {
            // Inside a bracket expression only `]` is structural, except for
            // a `[:` that the character-class engine will reject itself.
            Some(('[', _)) => {
                if c == ']' {
                    stack.pop();
                }
            }
            _ => match c {
                '(' | '[' | '{' => stack.push((c, i)),
                ')' | '}' => match stack.pop() {
                    Some((open, _)) if closer(open) == c => {}
                    _ => return Err(SplitError::Unexpected { pos: i, found: c }),
                },
                _ if c == sep && stack.is_empty() => {
                    parts.push(Part {
                        offset: start,
                        text: text[start..i].to_vec(),
                    });
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }

    if let Some((open, pos)) = stack.pop() {
        return Err(SplitError::Unterminated { pos, open });
    }
    parts.push(Part {
        offset: start,
        text: text[start..].to_vec(),
    });
    Ok(parts)
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn texts(parts: &[Part]) -> Vec<String> {
        parts.iter().map(Part::to_text).collect()
    }

    #[test]
    fn simple_split() {
        let parts = split(&chars("a|bc|d"), '|').unwrap();
        assert_eq!(texts(&parts), vec!["a", "bc", "d"]);
        assert_eq!(parts[1].offset, 2);
        assert_eq!(parts[2].offset, 5);
    }

    #[test]
    fn empty_input_is_one_empty_part() {
        let parts = split(&[], ',').unwrap();
        assert_eq!(texts(&parts), vec![""]);
    }

    #[test]
    fn trailing_separator_gives_empty_part() {
        let parts = split(&chars("a,"), ',').unwrap();
        assert_eq!(texts(&parts), vec!["a", ""]);
    }

    #[test]
    fn nested_separators_do_not_split() {
        let parts = split(&chars("(a|b)|[|]|{1,2}|c"), '|').unwrap();
        assert_eq!(texts(&parts), vec!["(a|b)", "[|]", "{1,2}", "c"]);
    }

    #[test]
    fn escaped_separator_is_kept() {
        let parts = split(&chars(r"a\,b,c"), ',').unwrap();
        assert_eq!(texts(&parts), vec![r"a\,b", "c"]);
    }

    #[test]
    fn paren_inside_bracket_is_literal() {
        let parts = split(&chars("[(],x"), ',').unwrap();
        assert_eq!(texts(&parts), vec!["[(]", "x"]);
    }

    #[test]
    fn mismatched_closer() {
        let err = split(&chars("(a}"), ',').unwrap_err();
        assert_eq!(err, SplitError::Unexpected { pos: 2, found: '}' });
        assert_eq!(err.to_string(), "unexpected '}'");
    }

    #[test]
    fn unterminated_opener() {
        let err = split(&chars("a,(b"), ',').unwrap_err();
        assert_eq!(err, SplitError::Unterminated { pos: 2, open: '(' });
        assert_eq!(err.pos(), 2);
    }
}
