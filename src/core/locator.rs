// src/core/locator.rs
//! Structural locators: the XPath 1.0 subset the checked pages need.
//!
//! Supported:
//! - absolute `/a/b`, descendant `//a`, `//` between steps, relative paths
//!   (evaluated from the document node)
//! - node tests `name`, `*`, `text()`, `node()`, `.`, `..`, `@name`, `@*`
//! - explicit axes `child::`, `descendant::`, `descendant-or-self::`,
//!   `self::`, `parent::`, `attribute::`
//! - predicates `[n]`, `[last()]`, `[@id]`, `[@id="x"]`, `[@id!='x']`,
//!   `[text()="x"]`, `[span="x"]`, `[contains(@class, "x")]`,
//!   `[starts-with(., "x")]`, `[normalize-space()="x"]`, `not(..)`,
//!   `and` / `or`, parentheses; predicates chain.
//!
//! `//tr[1]` keeps XPath meaning: every `tr` that is the first `tr` child of
//! its parent, not the first `tr` in the document.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::html::{NodeId, Tree};
use super::sanitize::normalize_space;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("bad locator `{locator}` at byte {pos}: {reason}")]
pub struct LocatorError {
    pub locator: String,
    pub pos: usize,
    pub reason: String,
}

/// A selected thing: a tree node, or attribute `idx` of element `NodeId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    Node(NodeId),
    Attr(NodeId, usize),
}

impl Item {
    fn order_key(self) -> (NodeId, usize) {
        match self {
            Item::Node(id) => (id, 0),
            Item::Attr(id, idx) => (id, idx + 1),
        }
    }

    /// XPath string-value of the item.
    pub fn string_value(self, tree: &Tree) -> String {
        match self {
            Item::Node(id) => tree.string_value(id),
            Item::Attr(id, idx) => tree.attrs(id).get(idx).map(|(_, v)| v.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfNode,
    Parent,
    Attribute,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    Any,
    Text,
    Node,
}

#[derive(Clone, Debug, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    preds: Vec<Predicate>,
}

impl Step {
    fn descendant_or_self() -> Self {
        Step { axis: Axis::DescendantOrSelf, test: NodeTest::Node, preds: Vec::new() }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Predicate {
    Position(usize),
    Last,
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Exists(Operand),
    Cmp { lhs: Operand, negate: bool, rhs: Value },
    Contains(Operand, String),
    StartsWith(Operand, String),
}

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Attr(String),
    Text,
    Dot,
    Child(String),
    NormalizeSpace(Option<Box<Operand>>),
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Locator {
    src: String,
    steps: Vec<Step>,
}

impl Locator {
    pub fn parse(src: &str) -> Result<Locator, LocatorError> {
        let steps = Parser::new(src).path()?;
        Ok(Locator { src: s!(src.trim()), steps })
    }

    pub fn as_str(&self) -> &str {
        &self.src
    }

    /// New locator with `suffix` appended to this one's text, e.g. `"/text()"`.
    pub fn join(&self, suffix: &str) -> Result<Locator, LocatorError> {
        Locator::parse(&format!("{}{suffix}", self.src))
    }

    /// Every match, in document order, without duplicates.
    pub fn select(&self, tree: &Tree) -> Vec<Item> {
        let mut ctx = vec![Item::Node(Tree::ROOT)];
        for step in &self.steps {
            let mut next = Vec::new();
            for &item in &ctx {
                let mut cands: Vec<Item> = axis_items(tree, step.axis, item)
                    .into_iter()
                    .filter(|&c| test_matches(tree, &step.test, step.axis, c))
                    .collect();
                for pred in &step.preds {
                    cands = apply_predicate(tree, pred, cands);
                }
                next.extend(cands);
            }
            next.sort_by_key(|i| i.order_key());
            next.dedup();
            ctx = next;
            if ctx.is_empty() {
                break;
            }
        }
        ctx
    }

    /// String-values of every match, in document order.
    pub fn select_strings(&self, tree: &Tree) -> Vec<String> {
        self.select(tree).into_iter().map(|i| i.string_value(tree)).collect()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.src)
    }
}

impl FromStr for Locator {
    type Err = LocatorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

/* ---------------- evaluation ---------------- */

fn axis_items(tree: &Tree, axis: Axis, item: Item) -> Vec<Item> {
    match (axis, item) {
        (Axis::Child, Item::Node(id)) => tree.children(id).iter().map(|&c| Item::Node(c)).collect(),
        (Axis::Descendant, Item::Node(id)) => tree.descendants(id).into_iter().map(Item::Node).collect(),
        (Axis::DescendantOrSelf, Item::Node(id)) => {
            let mut v = vec![Item::Node(id)];
            v.extend(tree.descendants(id).into_iter().map(Item::Node));
            v
        }
        (Axis::Attribute, Item::Node(id)) => (0..tree.attrs(id).len()).map(|i| Item::Attr(id, i)).collect(),
        (Axis::Parent, Item::Node(id)) => tree.parent(id).map(Item::Node).into_iter().collect(),
        (Axis::Parent, Item::Attr(id, _)) => vec![Item::Node(id)],
        (Axis::SelfNode, it) | (Axis::DescendantOrSelf, it @ Item::Attr(..)) => vec![it],
        _ => Vec::new(),
    }
}

fn test_matches(tree: &Tree, test: &NodeTest, axis: Axis, item: Item) -> bool {
    match item {
        Item::Attr(id, idx) => {
            // Names and `*` only select attributes on the attribute axis
            match test {
                NodeTest::Node => true,
                NodeTest::Any => axis == Axis::Attribute,
                NodeTest::Name(n) => {
                    axis == Axis::Attribute && tree.attrs(id).get(idx).is_some_and(|(k, _)| k == n)
                }
                NodeTest::Text => false,
            }
        }
        Item::Node(id) => match test {
            NodeTest::Node => true,
            NodeTest::Text => tree.text(id).is_some(),
            NodeTest::Any => axis != Axis::Attribute && tree.is_element(id),
            NodeTest::Name(n) => axis != Axis::Attribute && tree.name(id) == Some(n.as_str()),
        },
    }
}

fn apply_predicate(tree: &Tree, pred: &Predicate, cands: Vec<Item>) -> Vec<Item> {
    match pred {
        Predicate::Position(n) => cands.get(n.wrapping_sub(1)).copied().into_iter().collect(),
        Predicate::Last => cands.last().copied().into_iter().collect(),
        Predicate::Expr(e) => cands.into_iter().filter(|&c| eval(tree, e, c)).collect(),
    }
}

fn eval(tree: &Tree, e: &Expr, item: Item) -> bool {
    match e {
        Expr::Or(a, b) => eval(tree, a, item) || eval(tree, b, item),
        Expr::And(a, b) => eval(tree, a, item) && eval(tree, b, item),
        Expr::Not(a) => !eval(tree, a, item),
        Expr::Exists(op) => !operand_values(tree, op, item).is_empty(),
        Expr::Cmp { lhs, negate, rhs } => operand_values(tree, lhs, item)
            .iter()
            .any(|v| value_eq(v, rhs) != *negate),
        Expr::Contains(op, needle) => first_value(tree, op, item).contains(needle.as_str()),
        Expr::StartsWith(op, prefix) => first_value(tree, op, item).starts_with(prefix.as_str()),
    }
}

fn value_eq(v: &str, rhs: &Value) -> bool {
    match rhs {
        Value::Str(s) => v == s,
        Value::Num(x) => v.trim().parse::<f64>().is_ok_and(|n| n == *x),
    }
}

/// XPath converts a node-set to a string by taking its first node.
fn first_value(tree: &Tree, op: &Operand, item: Item) -> String {
    operand_values(tree, op, item).into_iter().next().unwrap_or_default()
}

fn operand_values(tree: &Tree, op: &Operand, item: Item) -> Vec<String> {
    let id = match item {
        Item::Node(id) => id,
        Item::Attr(..) => {
            return match op {
                Operand::Dot => vec![item.string_value(tree)],
                Operand::NormalizeSpace(None) => vec![normalize_space(&item.string_value(tree))],
                _ => Vec::new(),
            };
        }
    };
    match op {
        Operand::Attr(name) => tree.attr(id, name).map(|v| vec![s!(v)]).unwrap_or_default(),
        Operand::Text => tree
            .children(id)
            .iter()
            .filter_map(|&c| tree.text(c).map(|t| s!(t)))
            .collect(),
        Operand::Dot => vec![tree.string_value(id)],
        Operand::Child(name) => tree
            .children(id)
            .iter()
            .filter(|&&c| tree.name(c) == Some(name.as_str()))
            .map(|&c| tree.string_value(c))
            .collect(),
        Operand::NormalizeSpace(inner) => {
            let raw = match inner {
                Some(op) => first_value(tree, op, item),
                None => tree.string_value(id),
            };
            vec![normalize_space(&raw)]
        }
    }
}

/* ---------------- parsing ---------------- */

struct Parser<'a> {
    src: &'a str,
    b: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, b: src.as_bytes(), pos: 0 }
    }

    fn err<T>(&self, reason: impl Into<String>) -> Result<T, LocatorError> {
        Err(LocatorError { locator: s!(self.src), pos: self.pos, reason: reason.into() })
    }

    fn skip_ws(&mut self) {
        while self.pos < self.b.len() && self.b[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.b.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.b.len()
    }

    fn eat(&mut self, tok: &str) -> bool {
        if self.src[self.pos..].starts_with(tok) {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    /// Like `eat`, but `tok` must not run on into a longer name.
    fn eat_keyword(&mut self, tok: &str) -> bool {
        let rest = &self.src[self.pos..];
        let boundary = rest.as_bytes().get(tok.len()).is_none_or(|&c| !is_name_byte(c));
        if rest.starts_with(tok) && boundary {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &str) -> Result<(), LocatorError> {
        self.skip_ws();
        if self.eat(tok) { Ok(()) } else { self.err(format!("expected `{tok}`")) }
    }

    fn name(&mut self) -> Option<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {}
            _ => return None,
        }
        while self.peek().is_some_and(is_name_byte) {
            // `::` ends a name (axis separator), a single `:` is a prefix
            if self.src[self.pos..].starts_with("::") {
                break;
            }
            self.pos += 1;
        }
        Some(self.src[start..self.pos].to_ascii_lowercase())
    }

    fn path(&mut self) -> Result<Vec<Step>, LocatorError> {
        self.skip_ws();
        if self.at_end() {
            return self.err("empty locator");
        }
        let mut steps = Vec::new();
        if self.eat("//") {
            steps.push(Step::descendant_or_self());
        } else if self.eat("/") {
            self.skip_ws();
            if self.at_end() {
                // "/" alone selects the document node
                return Ok(steps);
            }
        }
        loop {
            steps.push(self.step()?);
            self.skip_ws();
            if self.eat("//") {
                steps.push(Step::descendant_or_self());
            } else if !self.eat("/") {
                break;
            }
        }
        self.skip_ws();
        if !self.at_end() {
            return self.err("unexpected trailing input");
        }
        Ok(steps)
    }

    fn step(&mut self) -> Result<Step, LocatorError> {
        self.skip_ws();
        if self.eat("..") {
            return Ok(Step { axis: Axis::Parent, test: NodeTest::Node, preds: self.predicates()? });
        }
        if self.eat(".") {
            return Ok(Step { axis: Axis::SelfNode, test: NodeTest::Node, preds: self.predicates()? });
        }

        let mut axis = Axis::Child;
        if self.eat("@") {
            axis = Axis::Attribute;
        } else {
            let save = self.pos;
            if let Some(word) = self.name() {
                if self.eat("::") {
                    axis = match word.as_str() {
                        "child" => Axis::Child,
                        "descendant" => Axis::Descendant,
                        "descendant-or-self" => Axis::DescendantOrSelf,
                        "self" => Axis::SelfNode,
                        "parent" => Axis::Parent,
                        "attribute" => Axis::Attribute,
                        other => return self.err(format!("unsupported axis `{other}`")),
                    };
                } else {
                    self.pos = save;
                }
            }
        }

        let test = self.node_test()?;
        let preds = self.predicates()?;
        Ok(Step { axis, test, preds })
    }

    fn node_test(&mut self) -> Result<NodeTest, LocatorError> {
        if self.eat("*") {
            return Ok(NodeTest::Any);
        }
        if self.eat("text()") {
            return Ok(NodeTest::Text);
        }
        if self.eat("node()") {
            return Ok(NodeTest::Node);
        }
        match self.name() {
            Some(n) => Ok(NodeTest::Name(n)),
            None => self.err("expected a node test"),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Predicate>, LocatorError> {
        let mut preds = Vec::new();
        loop {
            self.skip_ws();
            if !self.eat("[") {
                return Ok(preds);
            }
            preds.push(self.predicate()?);
        }
    }

    fn predicate(&mut self) -> Result<Predicate, LocatorError> {
        self.skip_ws();
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let n = match self.src[start..self.pos].parse::<usize>() {
                Ok(n) => n,
                Err(_) => return self.err("position out of range"),
            };
            self.expect("]")?;
            return Ok(Predicate::Position(n));
        }
        if self.eat("last()") {
            self.expect("]")?;
            return Ok(Predicate::Last);
        }
        let e = self.or_expr()?;
        self.expect("]")?;
        Ok(Predicate::Expr(e))
    }

    fn or_expr(&mut self) -> Result<Expr, LocatorError> {
        let mut lhs = self.and_expr()?;
        loop {
            self.skip_ws();
            if !self.eat_keyword("or") {
                return Ok(lhs);
            }
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
    }

    fn and_expr(&mut self) -> Result<Expr, LocatorError> {
        let mut lhs = self.unary()?;
        loop {
            self.skip_ws();
            if !self.eat_keyword("and") {
                return Ok(lhs);
            }
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, LocatorError> {
        self.skip_ws();
        if self.eat("not(") {
            let inner = self.or_expr()?;
            self.expect(")")?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.eat("contains(") {
            let (op, lit) = self.call_args()?;
            return Ok(Expr::Contains(op, lit));
        }
        if self.eat("starts-with(") {
            let (op, lit) = self.call_args()?;
            return Ok(Expr::StartsWith(op, lit));
        }
        if self.eat("(") {
            let inner = self.or_expr()?;
            self.expect(")")?;
            return Ok(inner);
        }

        let lhs = self.operand()?;
        self.skip_ws();
        if self.eat("!=") {
            let rhs = self.value()?;
            return Ok(Expr::Cmp { lhs, negate: true, rhs });
        }
        if self.eat("=") {
            let rhs = self.value()?;
            return Ok(Expr::Cmp { lhs, negate: false, rhs });
        }
        Ok(Expr::Exists(lhs))
    }

    fn call_args(&mut self) -> Result<(Operand, String), LocatorError> {
        let op = self.operand()?;
        self.expect(",")?;
        self.skip_ws();
        let lit = self.literal()?;
        self.expect(")")?;
        Ok((op, lit))
    }

    fn operand(&mut self) -> Result<Operand, LocatorError> {
        self.skip_ws();
        if self.eat("@") {
            return match self.name() {
                Some(n) => Ok(Operand::Attr(n)),
                None => self.err("expected attribute name"),
            };
        }
        if self.eat("text()") {
            return Ok(Operand::Text);
        }
        if self.eat("normalize-space(") {
            self.skip_ws();
            let inner = if self.peek() == Some(b')') { None } else { Some(Box::new(self.operand()?)) };
            self.expect(")")?;
            return Ok(Operand::NormalizeSpace(inner));
        }
        if self.eat(".") {
            return Ok(Operand::Dot);
        }
        match self.name() {
            Some(n) => Ok(Operand::Child(n)),
            None => self.err("expected operand"),
        }
    }

    fn value(&mut self) -> Result<Value, LocatorError> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') | Some(b'\'') => Ok(Value::Str(self.literal()?)),
            Some(c) if c.is_ascii_digit() || c == b'-' => {
                let start = self.pos;
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == b'.') {
                    self.pos += 1;
                }
                match self.src[start..self.pos].parse::<f64>() {
                    Ok(x) => Ok(Value::Num(x)),
                    Err(_) => self.err("bad number"),
                }
            }
            _ => self.err("expected a string or number"),
        }
    }

    fn literal(&mut self) -> Result<String, LocatorError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return self.err("expected a quoted string"),
        };
        let start = self.pos + 1;
        match self.b[start..].iter().position(|&c| c == quote) {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(s!(&self.src[start..start + len]))
            }
            None => self.err("unterminated string"),
        }
    }
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.')
}
