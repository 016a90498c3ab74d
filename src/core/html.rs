// src/core/html.rs
// Tolerant markup parser: turns HTML (or the datastore's XML) into a small
// arena tree that the locator engine can walk.
//
// Never fails. Broken markup is repaired the way libxml2's HTML parser roughly
// does it: unknown end tags are dropped, a handful of elements close their open
// siblings implicitly, and whatever is still open at EOF gets closed.
//
// Tag and attribute names are ASCII-lowercased. Node ids are handed out in
// document order, so sorting ids sorts nodes in document order.

use super::sanitize::normalize_entities;

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { name: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT: &[&str] = &["script", "style"];

/// Elements whose start tag closes an open `<p>`.
const P_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

fn closes_on_open(top: &str, opening: &str) -> bool {
    match top {
        "p" => P_CLOSERS.contains(&opening),
        "li" => opening == "li",
        "dt" | "dd" => matches!(opening, "dt" | "dd"),
        "option" => matches!(opening, "option" | "optgroup"),
        "td" | "th" => matches!(opening, "td" | "th" | "tr" | "thead" | "tbody" | "tfoot"),
        "tr" => matches!(opening, "tr" | "thead" | "tbody" | "tfoot"),
        "thead" | "tbody" | "tfoot" => matches!(opening, "thead" | "tbody" | "tfoot"),
        _ => false,
    }
}

impl Tree {
    pub const ROOT: NodeId = 0;

    pub fn parse(src: &str) -> Tree {
        let mut b = Builder::new();
        b.run(src);
        Tree { nodes: b.nodes }
    }

    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.len() <= 1 }

    pub fn node(&self, id: NodeId) -> &Node { &self.nodes[id] }
    pub fn children(&self, id: NodeId) -> &[NodeId] { &self.nodes[id].children }
    pub fn parent(&self, id: NodeId) -> Option<NodeId> { self.nodes[id].parent }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { .. })
    }

    /// Element name, `None` for text and the document node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id].kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// XPath string-value: own text, or every descendant text node concatenated.
    pub fn string_value(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return s!(t);
        }
        let mut out = String::new();
        for d in self.descendants(id) {
            if let Some(t) = self.text(d) {
                out.push_str(t);
            }
        }
        out
    }

    /// Descendants of `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }
}

struct Builder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl Builder {
    fn new() -> Self {
        let root = Node { kind: NodeKind::Document, parent: None, children: Vec::new() };
        Self { nodes: vec![root], stack: vec![Tree::ROOT] }
    }

    fn current(&self) -> NodeId {
        *self.stack.last().unwrap_or(&Tree::ROOT)
    }

    fn current_name(&self) -> Option<&str> {
        match &self.nodes[self.current()].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = self.nodes.len();
        self.nodes.push(Node { kind, parent: Some(parent), children: Vec::new() });
        self.nodes[parent].children.push(id);
        id
    }

    fn push_text(&mut self, raw: &str, decode: bool) {
        if raw.is_empty() {
            return;
        }
        let text = if decode { normalize_entities(raw) } else { s!(raw) };
        let parent = self.current();
        // Adjacent text (e.g. split by a comment) merges into one node
        if let Some(&last) = self.nodes[parent].children.last() {
            if let NodeKind::Text(t) = &mut self.nodes[last].kind {
                t.push_str(&text);
                return;
            }
        }
        self.append(NodeKind::Text(text));
    }

    fn open(&mut self, name: String, attrs: Vec<(String, String)>, self_closing: bool) {
        while self.stack.len() > 1 {
            let implied = matches!(self.current_name(), Some(top) if closes_on_open(top, &name));
            if !implied {
                break;
            }
            self.stack.pop();
        }
        let void = self_closing || VOID.contains(&name.as_str());
        let id = self.append(NodeKind::Element { name, attrs });
        if !void {
            self.stack.push(id);
        }
    }

    fn close(&mut self, name: &str) {
        let hit = self.stack.iter().rposition(|&id| {
            matches!(&self.nodes[id].kind, NodeKind::Element { name: n, .. } if n == name)
        });
        // Unmatched end tags are dropped
        if let Some(k) = hit {
            if k > 0 {
                self.stack.truncate(k);
            }
        }
    }

    fn run(&mut self, src: &str) {
        let b = src.as_bytes();
        let n = b.len();
        let mut i = 0usize;
        let mut text_start = 0usize;

        while i < n {
            if b[i] != b'<' {
                i += 1;
                continue;
            }
            let next = b.get(i + 1).copied();
            match next {
                Some(b'!') => {
                    self.push_text(&src[text_start..i], true);
                    if src[i..].starts_with("<!--") {
                        i = find_from(src, i + 4, "-->").map_or(n, |p| p + 3);
                    } else if src[i..].starts_with("<![CDATA[") {
                        let body = i + 9;
                        let end = find_from(src, body, "]]>");
                        self.push_text(&src[body..end.unwrap_or(n)], false);
                        i = end.map_or(n, |p| p + 3);
                    } else {
                        i = find_from(src, i, ">").map_or(n, |p| p + 1);
                    }
                    text_start = i;
                }
                Some(b'?') => {
                    self.push_text(&src[text_start..i], true);
                    i = find_from(src, i, ">").map_or(n, |p| p + 1);
                    text_start = i;
                }
                Some(b'/') if b.get(i + 2).is_some_and(|c| c.is_ascii_alphabetic()) => {
                    self.push_text(&src[text_start..i], true);
                    let name_start = i + 2;
                    let name_end = scan_name(b, name_start);
                    let name = src[name_start..name_end].to_ascii_lowercase();
                    i = find_from(src, name_end, ">").map_or(n, |p| p + 1);
                    text_start = i;
                    self.close(&name);
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.push_text(&src[text_start..i], true);
                    let (name, attrs, self_closing, end) = parse_start_tag(src, i + 1);
                    i = end;
                    text_start = i;
                    let raw = !self_closing && RAW_TEXT.contains(&name.as_str());
                    let raw_name = if raw { Some(name.clone()) } else { None };
                    self.open(name, attrs, self_closing);
                    if let Some(tag) = raw_name {
                        let close_pat = format!("</{tag}");
                        let end = find_ci_from(src, i, &close_pat).unwrap_or(n);
                        self.push_text(&src[i..end], false);
                        self.close(&tag);
                        i = if end < n { find_from(src, end, ">").map_or(n, |p| p + 1) } else { n };
                        text_start = i;
                    }
                }
                // Stray '<' is literal text
                _ => i += 1,
            }
        }
        self.push_text(&src[text_start..n], true);
    }
}

fn find_from(s: &str, from: usize, pat: &str) -> Option<usize> {
    s.get(from..)?.find(pat).map(|p| p + from)
}

fn find_ci_from(s: &str, from: usize, pat: &str) -> Option<usize> {
    let hay = s.get(from..)?.to_ascii_lowercase();
    hay.find(pat).map(|p| p + from)
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.')
}

fn scan_name(b: &[u8], from: usize) -> usize {
    let mut j = from;
    while j < b.len() && is_name_byte(b[j]) {
        j += 1;
    }
    j
}

/// Parse `name attr=value ...>` starting right after the `<`.
/// Returns (name, attrs, self_closing, index past the closing `>`).
fn parse_start_tag(src: &str, from: usize) -> (String, Vec<(String, String)>, bool, usize) {
    let b = src.as_bytes();
    let n = b.len();
    let name_end = scan_name(b, from);
    let name = src[from..name_end].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut j = name_end;

    loop {
        while j < n && b[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= n {
            return (name, attrs, false, n);
        }
        match b[j] {
            b'>' => return (name, attrs, false, j + 1),
            b'/' if b.get(j + 1) == Some(&b'>') => return (name, attrs, true, j + 2),
            b'/' => { j += 1; continue; }
            _ => {}
        }

        let key_start = j;
        while j < n && !b[j].is_ascii_whitespace() && !matches!(b[j], b'=' | b'>' | b'/') {
            j += 1;
        }
        let key = src[key_start..j].to_ascii_lowercase();
        if key.is_empty() {
            // Lone '=' or similar junk
            j += 1;
            continue;
        }

        let mut k = j;
        while k < n && b[k].is_ascii_whitespace() {
            k += 1;
        }
        let mut value = s!();
        if k < n && b[k] == b'=' {
            k += 1;
            while k < n && b[k].is_ascii_whitespace() {
                k += 1;
            }
            match b.get(k) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let quote = if q == b'"' { "\"" } else { "'" };
                    let v_start = k + 1;
                    // Missing close quote: fall back to the end of the tag
                    let v_end = find_from(src, v_start, quote)
                        .or_else(|| find_from(src, v_start, ">"))
                        .unwrap_or(n);
                    value = normalize_entities(&src[v_start..v_end]);
                    k = if v_end < n && b[v_end] != b'>' { v_end + 1 } else { v_end };
                }
                _ => {
                    let v_start = k;
                    while k < n && !b[k].is_ascii_whitespace() && b[k] != b'>' {
                        k += 1;
                    }
                    value = normalize_entities(&src[v_start..k]);
                }
            }
            j = k;
        }

        // First occurrence wins on duplicate attributes
        if !attrs.iter().any(|(a, _)| *a == key) {
            attrs.push((key, value));
        }
    }
}
