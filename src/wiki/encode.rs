use log::warn;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;

use std::{ffi, fs, io};

use crate::{
    util,
    wiki::{Event, Tag},
    Result,
};

// articles whose trailing paragraph starts with this are carrying the
// license footer, which is stripped.
const LICENSE_PREFIX: &str = "This article is issued from";

/// Element in the article xml tree. Interleaved text and child elements
/// are kept as one ordered content list.
#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    pub name: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Elem(XmlElement),
    Text(String),
}

impl XmlElement {
    fn new(name: &'static str) -> XmlElement {
        XmlElement {
            name,
            attrs: vec![],
            children: vec![],
        }
    }

    fn attr(mut self, key: &'static str, value: String) -> XmlElement {
        self.attrs.push((key, value));
        self
    }

    /// Serialize this element, with children, into xml text.
    pub fn to_xml(&self) -> Result<String> {
        let mut wr = Writer::new(io::Cursor::new(Vec::new()));
        write_element(&mut wr, self)?;
        let bytes = wr.into_inner().into_inner();
        err_at!(DecodeFail, String::from_utf8(bytes))
    }
}

/// Rebuild an xml element tree from the cleaned event stream of one
/// article. The stream is wrapped in a synthetic root emitting as
/// `<article title=".." url="..">`.
pub fn encode_article(url: &str, title: &str, seq: Vec<Event>) -> XmlElement {
    let root = Tag::Root {
        url: url.to_string(),
        title: title.to_string(),
    };

    let mut full = Vec::with_capacity(seq.len() + 2);
    full.push(Event::Open(root.clone()));
    full.extend(seq);
    full.push(Event::Close(root));

    let (mut element, _) = build(&full, 0, url);
    strip_license_footer(&mut element);
    element
}

fn element_for(tag: &Tag) -> XmlElement {
    match tag {
        Tag::Root { url, title } => XmlElement::new("article")
            .attr("title", title.clone())
            .attr("url", url.clone()),
        Tag::Para => XmlElement::new("p"),
        Tag::Header { level } => XmlElement::new("h").attr("level", level.to_string()),
        Tag::Blockquote => XmlElement::new("blockquote"),
        Tag::Ul => XmlElement::new("ul"),
        Tag::Ol => XmlElement::new("ol"),
        Tag::Dl => XmlElement::new("dl"),
        Tag::Li => XmlElement::new("li"),
        Tag::Dt => XmlElement::new("dt"),
        Tag::Dd => XmlElement::new("dd"),
        Tag::Link { href } => XmlElement::new("a").attr("href", href.clone()),
        Tag::Abbr { title } => match title {
            Some(title) => XmlElement::new("abbr").attr("title", title.clone()),
            None => XmlElement::new("abbr"),
        },
        Tag::Time { datetime } => match datetime {
            Some(datetime) => XmlElement::new("time").attr("datetime", datetime.clone()),
            None => XmlElement::new("time"),
        },
        Tag::Cite => XmlElement::new("cite"),
        Tag::Quote => XmlElement::new("q"),
        Tag::Sub => XmlElement::new("sub"),
        Tag::Sup => XmlElement::new("sup"),
        Tag::Code => XmlElement::new("code"),
        Tag::Math => XmlElement::new("math"),
        Tag::Br => XmlElement::new("br"),
    }
}

// build the element starting at the open marker `seq[index]`, return it
// along with the position past its close marker. Any close marker
// terminates the element, the cleaner's output pairs them up.
fn build(seq: &[Event], mut index: usize, url: &str) -> (XmlElement, usize) {
    let mut element = match &seq[index] {
        Event::Open(tag) => element_for(tag),
        _ => unreachable!(),
    };
    index += 1;

    if let Some(Event::Text(text)) = seq.get(index) {
        element.children.push(XmlNode::Text(text.clone()));
        index += 1;
    }

    while let Some(Event::Open(_)) = seq.get(index) {
        let (child, next) = build(seq, index, url);
        index = next;
        element.children.push(XmlNode::Elem(child));
        if let Some(Event::Text(text)) = seq.get(index) {
            element.children.push(XmlNode::Text(text.clone()));
            index += 1;
        }
    }

    // a header, or a definition term, acts as a paragraph itself.
    if matches!(element.name, "h" | "dt") {
        inline_paragraph(&mut element, url);
    }

    (element, index + 1)
}

// the single paragraph child gives its content to the header/term;
// when there are more, only the first one is kept.
fn inline_paragraph(element: &mut XmlElement, url: &str) {
    let is_elem = |child: &&XmlNode| matches!(child, XmlNode::Elem(_));
    let n = element.children.iter().filter(is_elem).count();
    if n == 0 {
        return;
    }
    if n > 1 {
        warn!("{} has more than one paragraph ({})", element.name, url);
    }

    let first = element
        .children
        .iter()
        .position(|child| matches!(child, XmlNode::Elem(_)))
        .unwrap();
    let children = match &element.children[first] {
        XmlNode::Elem(e) if e.name == "p" => e.children.clone(),
        _ => return,
    };
    element.children = children;
}

fn strip_license_footer(article: &mut XmlElement) {
    let strip = match article.children.last() {
        Some(XmlNode::Elem(e)) if e.name == "p" => match e.children.first() {
            Some(XmlNode::Text(text)) => text.starts_with(LICENSE_PREFIX),
            _ => false,
        },
        _ => false,
    };
    if strip {
        article.children.pop();
    }
}

fn write_element<W>(wr: &mut Writer<W>, element: &XmlElement) -> Result<()>
where
    W: io::Write,
{
    let mut start = BytesStart::new(element.name);
    for (key, value) in element.attrs.iter() {
        start.push_attribute((*key, value.as_str()));
    }

    if element.children.is_empty() {
        err_at!(IOError, wr.write_event(XmlEvent::Empty(start)))?;
        return Ok(());
    }

    err_at!(IOError, wr.write_event(XmlEvent::Start(start)))?;
    for child in element.children.iter() {
        match child {
            XmlNode::Text(text) => {
                err_at!(IOError, wr.write_event(XmlEvent::Text(BytesText::new(text))))?
            }
            XmlNode::Elem(e) => write_element(wr, e)?,
        }
    }
    err_at!(IOError, wr.write_event(XmlEvent::End(BytesEnd::new(element.name))))?;
    Ok(())
}

/// Streams redirections and articles into a single gzipped xml document
/// under one `<wikipedia>` root. The writer owns the output stream for
/// the whole run.
pub struct CorpusWriter<W>
where
    W: io::Write,
{
    wr: Writer<W>,
}

impl CorpusWriter<flate2::write::GzEncoder<io::BufWriter<fs::File>>> {
    /// Create the corpus file at `loc`, write the xml declaration and
    /// the root element carrying article/redirect counts.
    pub fn create(
        loc: &ffi::OsStr,
        n_articles: usize,
        n_redirects: usize,
        lang: &str,
    ) -> Result<Self> {
        let fd = util::create_file_w(loc)?;
        let gz = flate2::write::GzEncoder::new(
            io::BufWriter::new(fd),
            flate2::Compression::best(),
        );
        CorpusWriter::from_writer(gz, n_articles, n_redirects, lang)
    }
}

impl<W> CorpusWriter<W>
where
    W: io::Write,
{
    pub fn from_writer(
        w: W,
        n_articles: usize,
        n_redirects: usize,
        lang: &str,
    ) -> Result<CorpusWriter<W>> {
        let mut wr = Writer::new(w);
        let decl = BytesDecl::new("1.0", Some("utf-8"), None);
        err_at!(IOError, wr.write_event(XmlEvent::Decl(decl)))?;

        let mut root = BytesStart::new("wikipedia");
        root.push_attribute(("article", n_articles.to_string().as_str()));
        root.push_attribute(("redirect", n_redirects.to_string().as_str()));
        root.push_attribute(("lang", lang));
        err_at!(IOError, wr.write_event(XmlEvent::Start(root)))?;

        let mut val = CorpusWriter { wr };
        val.newline()?;
        Ok(val)
    }

    pub fn write_redirect(&mut self, url: &str, title: &str, target: &str) -> Result<()> {
        let mut e = BytesStart::new("redirect");
        e.push_attribute(("url", url));
        e.push_attribute(("title", title));
        e.push_attribute(("target", target));
        err_at!(IOError, self.wr.write_event(XmlEvent::Empty(e)))?;
        self.newline()
    }

    pub fn write_article(&mut self, element: &XmlElement) -> Result<()> {
        write_element(&mut self.wr, element)?;
        self.newline()
    }

    /// Close the root element and hand back the underlying stream, for
    /// the caller to finish.
    pub fn close(self) -> Result<W> {
        let mut wr = self.wr;
        err_at!(IOError, wr.write_event(XmlEvent::End(BytesEnd::new("wikipedia"))))?;
        Ok(wr.into_inner())
    }

    fn newline(&mut self) -> Result<()> {
        let nl = BytesText::from_escaped("\n");
        err_at!(IOError, self.wr.write_event(XmlEvent::Text(nl)))
    }
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod encode_test;
