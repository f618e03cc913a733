//! Package implement extraction of a plain-text corpus from wikipedia
//! zim archives.
//!
//! The pipeline has three stages:
//!
//! * _extract_, parse the zim binary archive, decode each article's html
//!   body into a normalized semantic tree and stream the whole snapshot
//!   into a single gzipped xml document, [zimf] and [wiki] modules.
//! * _convert_, walk the semantic xml and emit one paragraph of UTF-8
//!   text per line, [wiki::to_plain_text].
//! * _clean_, fold unicode text to a restricted alphabet and optionally
//!   tokenize, [nltk] module.
//!
//! Stages communicate through files, refer to the `extract`, `convert`
//! and `nltk` binaries.

#[macro_use]
mod error;
pub mod nltk;
pub mod util;
pub mod wiki;
pub mod zimf;

pub use crate::error::{Error, Result};
