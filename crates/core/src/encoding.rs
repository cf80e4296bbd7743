//! The windows-1250/windows-1252 mismatch repair and the Polish character
//! tables used to detect it.
//!
//! The corruption this tool targets: text encoded as windows-1250 (Central
//! European) was decoded as windows-1252 (Western), turning Polish diacritics
//! into visually-wrong but valid characters (`ą` becomes `¹`, `ś` becomes
//! `œ`, ...). Reversing the mistake is the same round trip run backwards:
//! encode the mangled text as windows-1252, decode the bytes as windows-1250.

use std::collections::BTreeSet;

use encoding_rs::{WINDOWS_1250, WINDOWS_1252};
use once_cell::sync::Lazy;

use crate::error::EncodingError;

const POLISH_LOWER: &str = "ąćęłńóśźż";
// Uppercase Ź is left out: its windows-1250 byte (0x8F) has no windows-1252
// character, so the misdecoded form never appears in affected files.
const POLISH_UPPER_SAFE: &str = "ĄĆĘŁŃÓŚŻ";

/// Character tables, computed once from the code pages themselves.
pub struct Charset {
    /// Polish diacritics (lower + safe upper).
    pub polish: BTreeSet<char>,
    /// What those diacritics look like after the 1250-as-1252 misdecode.
    pub misdecoded: BTreeSet<char>,
    /// Polish diacritics that survive the misdecode unchanged (`ó`, `Ó`)
    /// removed; only these prove the text is intact.
    pub polish_distinct: BTreeSet<char>,
    /// Misdecode artifacts with the self-mapping characters removed; only
    /// these prove the text is mangled.
    pub misdecoded_distinct: BTreeSet<char>,
}

pub static CHARSET: Lazy<Charset> = Lazy::new(|| {
    let polish: BTreeSet<char> = POLISH_LOWER.chars().chain(POLISH_UPPER_SAFE.chars()).collect();
    let misdecoded: BTreeSet<char> = polish
        .iter()
        .map(|&ch| {
            let mut buf = [0u8; 4];
            let s = ch.encode_utf8(&mut buf);
            let (bytes, _, _) = WINDOWS_1250.encode(s);
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
            text.chars().collect::<Vec<_>>()
        })
        .flatten()
        .collect();
    let polish_distinct = polish.difference(&misdecoded).copied().collect();
    let misdecoded_distinct = misdecoded.difference(&polish).copied().collect();
    Charset {
        polish,
        misdecoded,
        polish_distinct,
        misdecoded_distinct,
    }
});

/// True iff `text` contains at least one misdecode artifact and no intact
/// Polish diacritic. Characters shared by both tables (like `ó`) count for
/// neither side.
pub fn looks_misdecoded(text: &str) -> bool {
    let cs = &*CHARSET;
    let mut saw_artifact = false;
    for ch in text.chars() {
        if cs.polish_distinct.contains(&ch) {
            return false;
        }
        if cs.misdecoded_distinct.contains(&ch) {
            saw_artifact = true;
        }
    }
    saw_artifact
}

/// Undo the misdecode: encode as windows-1252, decode as windows-1250.
/// Characters with no windows-1252 encoding are replaced with `?`.
pub fn fix_text(text: &str) -> String {
    let bytes = encode_1252_lossy(text);
    let (fixed, _) = WINDOWS_1250.decode_without_bom_handling(&bytes);
    fixed.into_owned()
}

/// Strict variant of [`fix_text`]: any character with no windows-1252
/// encoding fails instead of being replaced.
pub fn fix_text_strict(text: &str) -> Result<String, EncodingError> {
    for ch in text.chars() {
        if !char_maps_to_1252(ch) {
            return Err(EncodingError::Unmappable { ch });
        }
    }
    Ok(fix_text(text))
}

// encoding_rs replaces unmappable characters with HTML numeric references on
// encode; we want plain `?`, so unmappable characters are caught per char.
fn encode_1252_lossy(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let s = ch.encode_utf8(&mut buf);
        let (bytes, _, had_errors) = WINDOWS_1252.encode(s);
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

fn char_maps_to_1252(ch: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
    !had_errors
}
