//! Module implement cleaning of the plain-text corpus, character
//! normalization and tokenization.

use lazy_static::lazy_static;
use regex::Regex;

use std::{
    ffi,
    io::{self, BufRead, Write},
};

use crate::{util, Result};

mod chars;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref TOKEN: Regex = Regex::new(r"(?:\p{L}|\d)+|\S").unwrap();
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

// fold a single character, override table first, unidecode and the
// ascii remap otherwise.
fn fold_char(ch: char, out: &mut String) {
    match chars::overridden(ch) {
        Some(s) => out.push_str(s),
        None if (ch as u32) < 0x80 => out.push_str(chars::MAPPED[ch as usize]),
        None if (ch as u32) > 0xEFFFF => (),
        None => {
            for c in deunicode::deunicode_char(ch).unwrap_or("").chars() {
                if (c as u32) < 0x80 {
                    out.push_str(chars::MAPPED[c as usize]);
                }
            }
        }
    }
}

/// Replace rare/non-latin characters by a simplified latin
/// representation, collapse whitespace runs to a single space and trim.
/// Never fails, unknown code points fold to nothing.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        fold_char(ch, &mut folded);
    }
    WHITESPACE.replace_all(&folded, " ").trim().to_string()
}

/// Split `text` into word and punctuation tokens, either a maximal run
/// of letters-or-digits or a single non-whitespace character.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase `token` and fold every digit run to a single `0`.
pub fn simplify(token: &str) -> String {
    DIGITS.replace_all(&token.to_lowercase(), "0").to_string()
}

/// Normalize `input` into `output`, line by line, keeping lines at
/// least `min_length` characters long after normalization. Return
/// `(kept, total)` line counts.
pub fn normalize_file(
    input: &ffi::OsStr,
    output: &ffi::OsStr,
    min_length: usize,
) -> Result<(usize, usize)> {
    let rdr = io::BufReader::new(util::open_file_r(input)?);
    let mut out = io::BufWriter::new(util::create_file_w(output)?);

    let pb = indicatif::ProgressBar::new_spinner();
    let (mut n_kept, mut n_total) = (0, 0);
    for line in rdr.lines() {
        let line = err_at!(IOError, line)?;
        n_total += 1;

        let line = normalize(&line);
        if line.chars().count() >= min_length {
            err_at!(IOError, out.write_all(line.as_bytes()))?;
            err_at!(IOError, out.write_all(b"\n"))?;
            n_kept += 1;
        }
        pb.inc(1);
    }
    pb.finish();

    err_at!(IOError, out.flush())?;
    Ok((n_kept, n_total))
}

/// Tokenize `input` into `output`, line by line, writing simplified
/// tokens joined by a single space and keeping lines with at least
/// `min_tokens` tokens. Return `(kept, total)` line counts.
pub fn tokenize_file(
    input: &ffi::OsStr,
    output: &ffi::OsStr,
    min_tokens: usize,
) -> Result<(usize, usize)> {
    let rdr = io::BufReader::new(util::open_file_r(input)?);
    let mut out = io::BufWriter::new(util::create_file_w(output)?);

    let pb = indicatif::ProgressBar::new_spinner();
    let (mut n_kept, mut n_total) = (0, 0);
    for line in rdr.lines() {
        let line = err_at!(IOError, line)?;
        n_total += 1;

        let tokens: Vec<String> = tokenize(&line).iter().map(|t| simplify(t)).collect();
        if tokens.len() >= min_tokens {
            err_at!(IOError, out.write_all(tokens.join(" ").as_bytes()))?;
            err_at!(IOError, out.write_all(b"\n"))?;
            n_kept += 1;
        }
        pb.inc(1);
    }
    pb.finish();

    err_at!(IOError, out.flush())?;
    Ok((n_kept, n_total))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
