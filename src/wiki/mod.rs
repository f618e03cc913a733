//! Module implement transformation of wikipedia articles, html to
//! semantic-xml, and the extraction pipeline over a whole zim archive.
//!
//! Per article the transformation is a four step affair:
//!
//! ```text
//! html bytes -> [Decoder] -> semantic tree
//!            -> [flatten] -> event stream
//!            -> [clean]   -> event stream, paragraphs normalized
//!            -> [encode_article] -> xml element tree
//! ```

mod decode;
mod encode;
mod events;
mod export;
mod text;

pub use decode::{Decoder, Fragment, Node, Tag};
pub use encode::{encode_article, CorpusWriter, XmlElement, XmlNode};
pub use events::{clean, flatten, Event};
pub use export::{export, ExportStats};
pub use text::to_plain_text;
