use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use std::{collections::BTreeMap, convert::TryFrom};

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new("^h([0-9]+)$").unwrap();
}

// wikipedia page element holding the article body.
const CONTENT_ID: &str = "#mw-content-text";

/// Normalized tag vocabulary for the semantic tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    /// Synthetic article root, only in the encoded stream.
    Root { url: String, title: String },
    Para,
    Header { level: u32 },
    Blockquote,
    Ul,
    Ol,
    Dl,
    Li,
    Dt,
    Dd,
    Link { href: String },
    Abbr { title: Option<String> },
    Time { datetime: Option<String> },
    Cite,
    Quote,
    Sub,
    Sup,
    Code,
    Math,
    Br,
}

impl Tag {
    pub fn is_para(&self) -> bool {
        matches!(self, Tag::Para)
    }

    /// Structural tags split the enclosing paragraph, refer
    /// [crate::wiki::flatten].
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Tag::Header { .. }
                | Tag::Blockquote
                | Tag::Ul
                | Tag::Ol
                | Tag::Dl
                | Tag::Li
                | Tag::Dt
                | Tag::Dd
        )
    }
}

/// Ordered content of a semantic node, either raw text or a nested node.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Text(String),
    Node(Node),
}

/// Node in the semantic tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub tag: Tag,
    pub content: Vec<Fragment>,
}

impl Node {
    fn new(tag: Tag, content: Vec<Fragment>) -> Node {
        Node { tag, content }
    }
}

/// Decode raw html bytes of wikipedia articles into semantic trees.
/// Keeps count of unknown tags across articles, for debug purpose.
pub struct Decoder {
    content_sel: Selector,
    unknown_tags: BTreeMap<String, usize>,
}

impl Default for Decoder {
    fn default() -> Decoder {
        Decoder {
            content_sel: Selector::try_from(CONTENT_ID).unwrap(),
            unknown_tags: BTreeMap::new(),
        }
    }
}

impl Decoder {
    pub fn new() -> Decoder {
        Decoder::default()
    }

    /// Parse `data` and decode the subtree under the article content
    /// container. Missing container means empty article. The returned
    /// node is an enclosing paragraph, ready for [crate::wiki::flatten].
    pub fn decode(&mut self, data: &[u8]) -> Node {
        let text = String::from_utf8_lossy(data);
        let doc = Html::parse_document(&text);

        let content = match doc.select(&self.content_sel).next() {
            Some(el) => self.decode_children(el),
            None => vec![],
        };
        Node::new(Tag::Para, content)
    }

    /// Tag names that were dropped because they are not part of the
    /// normalized vocabulary, with occurrence counts.
    pub fn as_unknown_tags(&self) -> &BTreeMap<String, usize> {
        &self.unknown_tags
    }

    // walk child nodes in document order; trailing text between two
    // elements lands after the leading element's encoding.
    fn decode_children(&mut self, el: ElementRef) -> Vec<Fragment> {
        let mut content = vec![];
        for child in el.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    content.push(Fragment::Text(text.text.to_string()))
                }
                scraper::Node::Element(_) => {
                    let child = ElementRef::wrap(child).unwrap();
                    content.extend(self.decode_element(child));
                }
                _ => (), // comments and other non-content nodes
            }
        }
        content
    }

    fn decode_element(&mut self, el: ElementRef) -> Vec<Fragment> {
        let name = el.value().name();

        if let Some(caps) = HEADER_RE.captures(name) {
            if let Ok(level) = caps[1].parse::<u32>() {
                let node = Node::new(Tag::Header { level }, self.decode_children(el));
                return vec![Fragment::Node(node)];
            }
        }

        let tag = match name {
            "blockquote" => Some(Tag::Blockquote),
            "ul" => Some(Tag::Ul),
            "ol" => Some(Tag::Ol),
            "dl" => Some(Tag::Dl),
            "li" => Some(Tag::Li),
            "dt" => Some(Tag::Dt),
            "dd" => Some(Tag::Dd),
            "div" | "p" => Some(Tag::Para),
            "a" => Some(Tag::Link {
                href: el.value().attr("href").unwrap_or("").to_string(),
            }),
            "abbr" => Some(Tag::Abbr {
                title: el.value().attr("title").map(|s| s.to_string()),
            }),
            "time" => Some(Tag::Time {
                datetime: el.value().attr("datetime").map(|s| s.to_string()),
            }),
            "cite" => Some(Tag::Cite),
            "q" => Some(Tag::Quote),
            "sub" => Some(Tag::Sub),
            "sup" => Some(Tag::Sup),
            "code" | "kbd" | "tt" | "var" => Some(Tag::Code),
            _ => None,
        };
        if let Some(tag) = tag {
            return vec![Fragment::Node(Node::new(tag, self.decode_children(el)))];
        }

        match name {
            // marker tags, children and inner text are discarded.
            "br" => vec![Fragment::Node(Node::new(Tag::Br, vec![]))],
            "math" => vec![Fragment::Node(Node::new(Tag::Math, vec![]))],
            // formatting tags are stripped, keeping text and children.
            "b" | "bdi" | "big" | "del" | "dfn" | "em" | "font" | "i" | "ins" | "mark"
            | "rb" | "ruby" | "s" | "small" | "span" | "strong" | "u" | "wbr" => {
                self.decode_children(el)
            }
            // dropped with all their content.
            "audio" | "center" | "hr" | "img" | "meta" | "pre" | "rp" | "rt" | "rtc"
            | "table" => vec![],
            _ => {
                *self.unknown_tags.entry(name.to_string()).or_insert(0) += 1;
                vec![]
            }
        }
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
