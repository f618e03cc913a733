//! Module implement zim web-archive parser.

mod reader;
mod zim;

pub use reader::Reader;
pub use zim::{ArticleRef, ClusterData, Compression, Header, Mime, Redirect, Scan, Zimf, MAGIC};
