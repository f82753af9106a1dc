//! Kana to romaji transliteration.
//!
//! Katakana is folded onto hiragana first, so the tables only list hiragana.
//! Characters that are not kana pass through unchanged.

use phf::{Map, phf_map};

/// Two-kana combinations, checked before single kana.
/// Please keep grouped by leading kana.
const DIGRAPHS: Map<&'static str, &'static str> = phf_map! {
    "きゃ" => "kya", "きゅ" => "kyu", "きょ" => "kyo",
    "ぎゃ" => "gya", "ぎゅ" => "gyu", "ぎょ" => "gyo",
    "しゃ" => "sha", "しゅ" => "shu", "しょ" => "sho", "しぇ" => "she",
    "じゃ" => "ja", "じゅ" => "ju", "じょ" => "jo", "じぇ" => "je",
    "ちゃ" => "cha", "ちゅ" => "chu", "ちょ" => "cho", "ちぇ" => "che",
    "ぢゃ" => "ja", "ぢゅ" => "ju", "ぢょ" => "jo",
    "てぃ" => "ti", "でぃ" => "di",
    "にゃ" => "nya", "にゅ" => "nyu", "にょ" => "nyo",
    "ひゃ" => "hya", "ひゅ" => "hyu", "ひょ" => "hyo",
    "びゃ" => "bya", "びゅ" => "byu", "びょ" => "byo",
    "ぴゃ" => "pya", "ぴゅ" => "pyu", "ぴょ" => "pyo",
    "ふぁ" => "fa", "ふぃ" => "fi", "ふぇ" => "fe", "ふぉ" => "fo",
    "みゃ" => "mya", "みゅ" => "myu", "みょ" => "myo",
    "りゃ" => "rya", "りゅ" => "ryu", "りょ" => "ryo",
    "うぃ" => "wi", "うぇ" => "we",
    "ゔぁ" => "va", "ゔぃ" => "vi", "ゔぇ" => "ve", "ゔぉ" => "vo",
};

const KANA: Map<char, &'static str> = phf_map! {
    'あ' => "a", 'い' => "i", 'う' => "u", 'え' => "e", 'お' => "o",
    'か' => "ka", 'き' => "ki", 'く' => "ku", 'け' => "ke", 'こ' => "ko",
    'が' => "ga", 'ぎ' => "gi", 'ぐ' => "gu", 'げ' => "ge", 'ご' => "go",
    'さ' => "sa", 'し' => "shi", 'す' => "su", 'せ' => "se", 'そ' => "so",
    'ざ' => "za", 'じ' => "ji", 'ず' => "zu", 'ぜ' => "ze", 'ぞ' => "zo",
    'た' => "ta", 'ち' => "chi", 'つ' => "tsu", 'て' => "te", 'と' => "to",
    'だ' => "da", 'ぢ' => "ji", 'づ' => "zu", 'で' => "de", 'ど' => "do",
    'な' => "na", 'に' => "ni", 'ぬ' => "nu", 'ね' => "ne", 'の' => "no",
    'は' => "ha", 'ひ' => "hi", 'ふ' => "fu", 'へ' => "he", 'ほ' => "ho",
    'ば' => "ba", 'び' => "bi", 'ぶ' => "bu", 'べ' => "be", 'ぼ' => "bo",
    'ぱ' => "pa", 'ぴ' => "pi", 'ぷ' => "pu", 'ぺ' => "pe", 'ぽ' => "po",
    'ま' => "ma", 'み' => "mi", 'む' => "mu", 'め' => "me", 'も' => "mo",
    'や' => "ya", 'ゆ' => "yu", 'よ' => "yo",
    'ら' => "ra", 'り' => "ri", 'る' => "ru", 'れ' => "re", 'ろ' => "ro",
    'わ' => "wa", 'ゐ' => "wi", 'ゑ' => "we", 'を' => "wo", 'ん' => "n",
    'ぁ' => "a", 'ぃ' => "i", 'ぅ' => "u", 'ぇ' => "e", 'ぉ' => "o",
    'ゃ' => "ya", 'ゅ' => "yu", 'ょ' => "yo", 'ゎ' => "wa",
    'ゔ' => "vu",
};

const SMALL_TSU: char = 'っ';
const LONG_VOWEL: char = 'ー';

/// Transliterate kana in `input` to romaji.
pub fn to_romaji(input: &str) -> String {
    let kana: Vec<char> = input.chars().map(katakana_to_hiragana).collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < kana.len() {
        let c = kana[i];
        if c == SMALL_TSU {
            // Double the consonant of the next syllable; `ch` doubles as `tch`.
            if let Some((next, _)) = syllable_at(&kana, i + 1) {
                match next.chars().next() {
                    Some('c') => out.push('t'),
                    Some(first) if !is_vowel(first) => out.push(first),
                    _ => {}
                }
            }
            i += 1;
            continue;
        }
        if c == LONG_VOWEL {
            if let Some(last) = out.chars().last()
                && is_vowel(last)
            {
                out.push(last);
            }
            i += 1;
            continue;
        }
        match syllable_at(&kana, i) {
            Some((romaji, used)) => {
                out.push_str(romaji);
                i += used;
            }
            None => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Romaji of the syllable starting at `i`, and how many kana it spans.
fn syllable_at(kana: &[char], i: usize) -> Option<(&'static str, usize)> {
    if i + 1 < kana.len() {
        let pair: String = kana[i..i + 2].iter().collect();
        if let Some(romaji) = DIGRAPHS.get(pair.as_str()) {
            return Some((*romaji, 2));
        }
    }
    kana.get(i).and_then(|c| KANA.get(c)).map(|romaji| (*romaji, 1))
}

fn katakana_to_hiragana(c: char) -> char {
    match c {
        '\u{30a1}'..='\u{30f6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_hiragana() {
        assert_eq!(to_romaji("さくら"), "sakura");
        assert_eq!(to_romaji("しんぶん"), "shinbun");
    }

    #[test]
    fn digraphs() {
        assert_eq!(to_romaji("きょう"), "kyou");
        assert_eq!(to_romaji("ちゃ"), "cha");
    }

    #[test]
    fn small_tsu_doubles_consonant() {
        assert_eq!(to_romaji("がっこう"), "gakkou");
        assert_eq!(to_romaji("マッチ"), "matchi");
    }

    #[test]
    fn katakana_and_long_vowel() {
        assert_eq!(to_romaji("ラーメン"), "raamen");
        assert_eq!(to_romaji("ティー"), "tii");
    }

    #[test]
    fn non_kana_passes_through() {
        assert_eq!(to_romaji("abc-123"), "abc-123");
        assert_eq!(to_romaji("ねこ!"), "neko!");
    }

    #[test]
    fn trailing_small_tsu_is_dropped() {
        assert_eq!(to_romaji("あっ"), "a");
    }
}
