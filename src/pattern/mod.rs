//! Pattern interpreter.
//!
//! A pattern is parsed and generated in one pass: each construct is
//! generated as soon as it has been lexed, and its entropy is added to the
//! running total.
//!
//! # Pattern syntax
//!
//! | Token              | Meaning                                            |
//! |--------------------|----------------------------------------------------|
//! | `x`                | Literal character                                  |
//! | `\t \r \n \v \f`   | Control characters                                 |
//! | `\d`               | One ASCII digit                                    |
//! | `\w`               | One word character `[A-Za-z0-9_]`                  |
//! | `\uXXXX`           | Code point, four hex digits                        |
//! | `\UXXXXXXXX`       | Code point, eight hex digits                       |
//! | `\N`               | Back-reference to the text of group N              |
//! | `\x`               | Any other character, literally                     |
//! | `[abc]`            | One character from the set                         |
//! | `[a-z]`            | Inclusive range                                    |
//! | `[:name:]`         | Named class, e.g. `[:alnum:]`, `[:base32:]`        |
//! | `[^…]`             | Printable ASCII minus the set                      |
//! | `X{n}`             | Exactly n instances of X                           |
//! | `X{m,n}`           | Between m and n instances                          |
//! | `(…)`              | Group, numbered by its opening parenthesis         |
//! | `(A\|B\|C)`        | One branch, chosen uniformly                       |
//! | `$name(…)`         | Function call                                      |
//!
//! Every `[`, `(`, `{` and `$` is structural. Write `\[`, `\(`, `\{` and
//! `\$` for the literal characters.
//!
//! # Functions
//!
//! | Function                    | Output                                    | Entropy            |
//! |-----------------------------|-------------------------------------------|--------------------|
//! | `hex(p)` `HEX(p)`           | Hex of the UTF-8 bytes of `p`             | of `p`             |
//! | `base64(p)` `base64url(p)`  | Base64 of the hex-decoded `p`             | of `p`             |
//! | `base32(p)` `BASE32(p)` `base32std(p)` | Base32 of the hex-decoded `p`  | of `p`             |
//! | `hex2dec(p)`                | Decimal value of hex `p`                  | of `p`             |
//! | `pyhex(p)`                  | `b'\x..'` byte literal of hex `p`         | of `p`             |
//! | `escape(p)` `json(p)`       | String-literal escaping                   | of `p`             |
//! | `space(p)` `expand(p,sep)`  | Characters joined by a separator          | of `p`             |
//! | `bip39encode(p)`            | BIP-39 mnemonic of hex `p`                | of `p`             |
//! | `romaji(p)`                 | Kana transliterated to romaji             | of `p`             |
//! | `byte()` `BYTE()`           | One random byte as two hex digits         | 8                  |
//! | `bip39word(n)`              | n random mnemonic words                   | 11 × n             |
//! | `date(y1,y2[,sep])`         | A random day in years y1..=y2             | log2(days)         |
//! | `shuffle(p)`                | `p` with its characters permuted          | of `p`             |
//! | `?(p)`                      | `p` or nothing                            | 1                  |
//! | `rjust` `ljust` `center(p,width[,fill])` | `p` padded to width          | of `p`             |

mod char_class;
mod context;
mod cursor;
mod function;
mod group;
mod lexer;
mod node;
mod repeat;


use rand::RngCore;
use tracing::debug;

use crate::error::{ErrorKind, PatternError};

pub use char_class::named_class;
pub use node::Generated;
pub use repeat::MAX_REPEAT;

use context::Context;
use node::SubPattern;

/// Longest pattern, in characters, that will be interpreted.
pub const MAX_PATTERN_LEN: usize = 1000;

/// Interpret `pattern`, drawing randomness from `rng`.
pub fn generate_with(pattern: &str, rng: &mut dyn RngCore) -> Result<Generated, PatternError> {
    let input: Vec<char> = pattern.chars().collect();
    if input.len() > MAX_PATTERN_LEN {
        return Err(PatternError::new(ErrorKind::Value, "pattern is too long"));
    }
    let mut ctx = Context::new(rng);
    let generated = ctx.evaluate(&SubPattern::new(input, 0))?;
    debug!(
        pattern_len = pattern.chars().count(),
        output_len = generated.text.chars().count(),
        entropy = generated.entropy,
        "generated"
    );
    Ok(generated)
}
