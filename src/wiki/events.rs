use crate::wiki::{Fragment, Node, Tag};

/// Linearized semantic tree. Paragraphs can be split around structural
/// boundaries, something the nested form cannot express.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Open(Tag),
    Close(Tag),
    Text(String),
}

/// Flatten the semantic tree rooted at `root` into an event stream.
///
/// Whenever a paragraph or a structural node starts, the inner-most open
/// paragraph is closed and reopened around it, so that paragraph events
/// never nest in the output.
pub fn flatten(root: Node) -> Vec<Event> {
    let mut fl = Flatten::default();
    fl.traverse(vec![Fragment::Node(root)]);
    fl.seq
}

// Every paragraph event carries the identical attribute-less Tag::Para,
// so the stack of open paragraphs degenerates to a depth count.
#[derive(Default)]
struct Flatten {
    seq: Vec<Event>,
    depth: usize,
}

impl Flatten {
    fn traverse(&mut self, content: Vec<Fragment>) {
        for fragment in content.into_iter() {
            match fragment {
                Fragment::Text(text) => self.seq.push(Event::Text(text)),
                Fragment::Node(node) if node.tag.is_para() => {
                    if self.depth > 0 {
                        self.seq.push(Event::Close(Tag::Para));
                    }
                    self.depth += 1;
                    self.seq.push(Event::Open(Tag::Para));
                    self.traverse(node.content);
                    self.seq.push(Event::Close(Tag::Para));
                    self.depth -= 1;
                    if self.depth > 0 {
                        self.seq.push(Event::Open(Tag::Para));
                    }
                }
                Fragment::Node(node) if node.tag.is_structural() => {
                    if self.depth > 0 {
                        self.seq.push(Event::Close(Tag::Para));
                    }
                    self.seq.push(Event::Open(node.tag.clone()));
                    if self.depth > 0 {
                        self.seq.push(Event::Open(Tag::Para));
                    }
                    self.traverse(node.content);
                    if self.depth > 0 {
                        self.seq.push(Event::Close(Tag::Para));
                    }
                    self.seq.push(Event::Close(node.tag));
                    if self.depth > 0 {
                        self.seq.push(Event::Open(Tag::Para));
                    }
                }
                Fragment::Node(node) => {
                    self.seq.push(Event::Open(node.tag.clone()));
                    self.traverse(node.content);
                    self.seq.push(Event::Close(node.tag));
                }
            }
        }
    }
}

/// Re-emit only structural events and accepted paragraphs.
///
/// Text inside a paragraph is concatenated with whitespace runs collapsed
/// to a single space; paragraphs that trim down to nothing, and hold no
/// inline marks, are pruned.
pub fn clean(seq: Vec<Event>) -> Vec<Event> {
    let mut result = vec![];
    let mut start: Option<usize> = None;

    for (index, event) in seq.iter().enumerate() {
        match event {
            Event::Open(Tag::Para) => start = Some(index + 1),
            Event::Close(Tag::Para) => {
                if let Some(s) = start.take() {
                    accept(&seq[s..index], &mut result);
                }
            }
            Event::Open(_) | Event::Close(_) if start.is_none() => result.push(event.clone()),
            _ => (), // interior events are handled by accept
        }
    }

    result
}

// finalize a single paragraph, `interior` excludes its open/close events.
fn accept(interior: &[Event], result: &mut Vec<Event>) {
    let mut has = false;
    let mut buffer = String::new();

    for event in interior.iter() {
        match event {
            Event::Text(text) => push_collapsed(&mut buffer, text),
            event => {
                if !has {
                    has = true;
                    result.push(Event::Open(Tag::Para));
                    let text = buffer.trim_start();
                    if !text.is_empty() {
                        result.push(Event::Text(text.to_string()));
                    }
                } else if !buffer.is_empty() {
                    result.push(Event::Text(buffer.clone()));
                }
                buffer.clear();
                result.push(event.clone());
            }
        }
    }

    if has {
        let text = buffer.trim_end();
        if !text.is_empty() {
            result.push(Event::Text(text.to_string()));
        }
        result.push(Event::Close(Tag::Para));
    } else {
        let text = buffer.trim();
        if !text.is_empty() {
            result.push(Event::Open(Tag::Para));
            result.push(Event::Text(text.to_string()));
            result.push(Event::Close(Tag::Para));
        }
    }
}

fn is_collapsible(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\x0C' | '\r' | '\n' | '\u{200B}')
}

// append text, collapsing whitespace runs, also across run boundaries.
fn push_collapsed(buffer: &mut String, text: &str) {
    for ch in text.chars() {
        if is_collapsible(ch) {
            if !buffer.ends_with(' ') {
                buffer.push(' ');
            }
        } else {
            buffer.push(ch);
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
