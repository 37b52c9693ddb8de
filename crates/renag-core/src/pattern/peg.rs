//! Parsing-expression grammars.
//!
//! A [`Grammar`] is a start expression plus named rules that expressions may
//! reference (recursively). Grammars are built from [`Expr`] combinators and
//! compiled once into a [`GrammarMatcher`]:
//!
//! ```ignore
//! use renag_core::{Expr, Grammar};
//!
//! // pprint(...) with balanced parentheses, ignoring `#` comments.
//! let grammar = Grammar::new(Expr::literal("pprint").then(Expr::rule("parens")))
//!     .nested("parens", "(", ")")
//!     .ignore(Expr::regex(r"#[^\n]*"))
//!     .skip_whitespace(true);
//! ```
//!
//! Matching is ordered choice with unlimited backtracking inside a single
//! attempt; the scanner tries an attempt at every position and, on success,
//! resumes after the match.

use regex::Regex;
use std::cell::Cell;
use std::collections::HashMap;

use super::{next_boundary, Matcher, Matches, PatternError};
use crate::types::Span;

/// Deepest rule nesting a single match attempt may reach.
///
/// An attempt that needs more fails, and its start offset is reported in
/// [`Matches::abandoned`] instead of being dropped silently.
pub const MAX_NESTING: usize = 512;

/// Internal name of the start expression.
const START: &str = "<start>";

/// A grammar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Exact text.
    Literal(String),
    /// Regex terminal, anchored at the current position.
    Regex(String),
    /// Any single character.
    Any,
    /// All expressions, in order.
    Seq(Vec<Expr>),
    /// The first expression that matches.
    Choice(Vec<Expr>),
    /// Between `min` and `max` (unbounded if `None`) repetitions.
    Repeat {
        /// Repeated expression.
        expr: Box<Expr>,
        /// Minimum repetitions.
        min: usize,
        /// Maximum repetitions.
        max: Option<usize>,
    },
    /// Succeeds without consuming if the expression matches here.
    Ahead(Box<Expr>),
    /// Succeeds without consuming if the expression does not match here.
    NotAhead(Box<Expr>),
    /// Reference to a named rule.
    Rule(String),
}

impl Expr {
    /// Exact text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Regex terminal.
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Self::Regex(source.into())
    }

    /// Any single character.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// Reference to a named rule.
    #[must_use]
    pub fn rule(name: impl Into<String>) -> Self {
        Self::Rule(name.into())
    }

    /// Sequence of expressions.
    #[must_use]
    pub fn seq(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::Seq(items.into_iter().collect())
    }

    /// Ordered choice between expressions.
    #[must_use]
    pub fn choice(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::Choice(items.into_iter().collect())
    }

    /// Positive lookahead.
    #[must_use]
    pub fn ahead(expr: Expr) -> Self {
        Self::Ahead(Box::new(expr))
    }

    /// Negative lookahead.
    #[must_use]
    pub fn not_ahead(expr: Expr) -> Self {
        Self::NotAhead(Box::new(expr))
    }

    /// Appends `next` to this expression as a sequence.
    #[must_use]
    pub fn then(self, next: Expr) -> Self {
        match self {
            Self::Seq(mut items) => {
                items.push(next);
                Self::Seq(items)
            }
            first => Self::Seq(vec![first, next]),
        }
    }

    /// Adds `alternative` to this expression as an ordered choice.
    #[must_use]
    pub fn or(self, alternative: Expr) -> Self {
        match self {
            Self::Choice(mut items) => {
                items.push(alternative);
                Self::Choice(items)
            }
            first => Self::Choice(vec![first, alternative]),
        }
    }

    /// Repeats this expression between `min` and `max` times.
    #[must_use]
    pub fn repeat(self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            expr: Box::new(self),
            min,
            max,
        }
    }

    /// Zero or more repetitions.
    #[must_use]
    pub fn zero_or_more(self) -> Self {
        self.repeat(0, None)
    }

    /// One or more repetitions.
    #[must_use]
    pub fn one_or_more(self) -> Self {
        self.repeat(1, None)
    }

    /// Zero or one occurrence.
    #[must_use]
    pub fn optional(self) -> Self {
        self.repeat(0, Some(1))
    }
}

/// A parsing-expression grammar used as a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: Expr,
    rules: Vec<(String, Expr)>,
    ignore: Vec<Expr>,
    skip_whitespace: bool,
}

impl Grammar {
    /// Creates a grammar whose matches are matches of `start`.
    #[must_use]
    pub fn new(start: Expr) -> Self {
        Self {
            start,
            rules: Vec::new(),
            ignore: Vec::new(),
            skip_whitespace: false,
        }
    }

    /// Defines (or redefines) a named rule.
    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, expr: Expr) -> Self {
        let name = name.into();
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = expr,
            None => self.rules.push((name, expr)),
        }
        self
    }

    /// Defines `name` as a balanced `open ... close` block that may nest.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, open: &str, close: &str) -> Self {
        let name = name.into();
        let filler = Expr::not_ahead(Expr::literal(open))
            .then(Expr::not_ahead(Expr::literal(close)))
            .then(Expr::any());
        let body = Expr::literal(open)
            .then(Expr::rule(name.clone()).or(filler).zero_or_more())
            .then(Expr::literal(close));
        self.rule(name, body)
    }

    /// Declares a region (comment, string literal, ...) that terminals and
    /// the scanner step over as if it were not there.
    #[must_use]
    pub fn ignore(mut self, expr: Expr) -> Self {
        self.ignore.push(expr);
        self
    }

    /// Skips leading whitespace before every terminal.
    #[must_use]
    pub fn skip_whitespace(mut self, skip: bool) -> Self {
        self.skip_whitespace = skip;
        self
    }

    /// Compiles the grammar.
    ///
    /// # Errors
    ///
    /// Returns an error for undefined rule references, invalid regex
    /// terminals and left-recursive rules.
    pub fn compile(&self) -> Result<GrammarMatcher, PatternError> {
        let mut names = vec![START.to_string()];
        names.extend(self.rules.iter().map(|(n, _)| n.clone()));
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut rules = Vec::with_capacity(names.len());
        rules.push(lower(&self.start, START, &index)?);
        for (name, expr) in &self.rules {
            rules.push(lower(expr, name, &index)?);
        }
        let ignore = self
            .ignore
            .iter()
            .map(|e| lower(e, "<ignore>", &index))
            .collect::<Result<Vec<_>, _>>()?;

        check_left_recursion(&rules, &names)?;

        Ok(GrammarMatcher {
            rules,
            ignore,
            skip_whitespace: self.skip_whitespace,
        })
    }
}

/// Compiled grammar expression; rule references are indexes.
#[derive(Debug, Clone)]
enum Node {
    Literal(String),
    Regex(Regex),
    Any,
    Seq(Vec<Node>),
    Choice(Vec<Node>),
    Repeat {
        node: Box<Node>,
        min: usize,
        max: Option<usize>,
    },
    Ahead(Box<Node>),
    NotAhead(Box<Node>),
    Rule(usize),
}

fn lower(expr: &Expr, rule: &str, index: &HashMap<&str, usize>) -> Result<Node, PatternError> {
    let lower_all = |items: &[Expr]| {
        items
            .iter()
            .map(|e| lower(e, rule, index))
            .collect::<Result<Vec<_>, _>>()
    };
    Ok(match expr {
        Expr::Literal(text) => Node::Literal(text.clone()),
        Expr::Regex(source) => {
            let regex = Regex::new(&format!(r"\A(?:{source})")).map_err(|e| {
                PatternError::Terminal {
                    rule: rule.to_string(),
                    pattern: source.clone(),
                    source: e,
                }
            })?;
            Node::Regex(regex)
        }
        Expr::Any => Node::Any,
        Expr::Seq(items) => Node::Seq(lower_all(items)?),
        Expr::Choice(items) => Node::Choice(lower_all(items)?),
        Expr::Repeat { expr, min, max } => Node::Repeat {
            node: Box::new(lower(expr, rule, index)?),
            min: *min,
            max: *max,
        },
        Expr::Ahead(e) => Node::Ahead(Box::new(lower(e, rule, index)?)),
        Expr::NotAhead(e) => Node::NotAhead(Box::new(lower(e, rule, index)?)),
        Expr::Rule(target) => match index.get(target.as_str()) {
            Some(&i) if target != START => Node::Rule(i),
            _ => {
                return Err(PatternError::UndefinedRule {
                    rule: rule.to_string(),
                    target: target.clone(),
                })
            }
        },
    })
}

/// Whether `node` can succeed without consuming input, given per-rule answers.
fn nullable(node: &Node, rules: &[bool]) -> bool {
    match node {
        Node::Literal(text) => text.is_empty(),
        Node::Regex(regex) => regex.is_match(""),
        Node::Any => false,
        Node::Seq(items) => items.iter().all(|n| nullable(n, rules)),
        Node::Choice(items) => items.iter().any(|n| nullable(n, rules)),
        Node::Repeat { node, min, .. } => *min == 0 || nullable(node, rules),
        Node::Ahead(_) | Node::NotAhead(_) => true,
        Node::Rule(i) => rules[*i],
    }
}

/// Rules that `node` may invoke before consuming any input.
fn leftmost_rules(node: &Node, rules: &[bool], out: &mut Vec<usize>) {
    match node {
        Node::Literal(_) | Node::Regex(_) | Node::Any => {}
        Node::Seq(items) => {
            for item in items {
                leftmost_rules(item, rules, out);
                if !nullable(item, rules) {
                    break;
                }
            }
        }
        Node::Choice(items) => {
            for item in items {
                leftmost_rules(item, rules, out);
            }
        }
        Node::Repeat { node, .. } | Node::Ahead(node) | Node::NotAhead(node) => {
            leftmost_rules(node, rules, out);
        }
        Node::Rule(i) => out.push(*i),
    }
}

fn check_left_recursion(rules: &[Node], names: &[String]) -> Result<(), PatternError> {
    // Fixpoint over rule nullability.
    let mut nullable_rules = vec![false; rules.len()];
    loop {
        let mut changed = false;
        for (i, node) in rules.iter().enumerate() {
            if !nullable_rules[i] && nullable(node, &nullable_rules) {
                nullable_rules[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let edges: Vec<Vec<usize>> = rules
        .iter()
        .map(|node| {
            let mut out = Vec::new();
            leftmost_rules(node, &nullable_rules, &mut out);
            out
        })
        .collect();

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; rules.len()];
    fn visit(i: usize, edges: &[Vec<usize>], state: &mut [u8]) -> Option<usize> {
        state[i] = 1;
        for &next in &edges[i] {
            match state[next] {
                1 => return Some(next),
                0 => {
                    if let Some(cycle) = visit(next, edges, state) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }
        state[i] = 2;
        None
    }

    for i in 0..rules.len() {
        if state[i] == 0 {
            if let Some(rule) = visit(i, &edges, &mut state) {
                return Err(PatternError::LeftRecursion(names[rule].clone()));
            }
        }
    }
    Ok(())
}

/// A compiled grammar.
#[derive(Debug, Clone)]
pub struct GrammarMatcher {
    rules: Vec<Node>,
    ignore: Vec<Node>,
    skip_whitespace: bool,
}

impl GrammarMatcher {
    /// Steps over whitespace and ignored regions starting at `pos`.
    fn skip(&self, text: &str, mut pos: usize, hit_limit: &Cell<bool>) -> usize {
        loop {
            let before = pos;
            if self.skip_whitespace {
                let rest = &text[pos..];
                pos += rest.len() - rest.trim_start().len();
            }
            for node in &self.ignore {
                if let Some(end) = self.parse(node, text, pos, false, 0, hit_limit) {
                    pos = end;
                }
            }
            if pos == before {
                return pos;
            }
        }
    }

    /// Attempts `node` at `pos`; returns the end offset on success.
    fn parse(
        &self,
        node: &Node,
        text: &str,
        pos: usize,
        skip: bool,
        depth: usize,
        hit_limit: &Cell<bool>,
    ) -> Option<usize> {
        if depth > MAX_NESTING {
            hit_limit.set(true);
            return None;
        }
        match node {
            Node::Literal(lit) => {
                let pos = self.terminal_start(text, pos, skip, hit_limit);
                text[pos..].starts_with(lit.as_str()).then(|| pos + lit.len())
            }
            Node::Regex(regex) => {
                let pos = self.terminal_start(text, pos, skip, hit_limit);
                regex.find(&text[pos..]).map(|m| pos + m.end())
            }
            Node::Any => {
                let pos = self.terminal_start(text, pos, skip, hit_limit);
                text[pos..].chars().next().map(|c| pos + c.len_utf8())
            }
            Node::Seq(items) => items
                .iter()
                .try_fold(pos, |at, item| self.parse(item, text, at, skip, depth, hit_limit)),
            Node::Choice(items) => items
                .iter()
                .find_map(|item| self.parse(item, text, pos, skip, depth, hit_limit)),
            Node::Repeat { node, min, max } => {
                let mut at = pos;
                let mut count = 0;
                while max.map_or(true, |m| count < m) {
                    let Some(next) = self.parse(node, text, at, skip, depth, hit_limit) else {
                        break;
                    };
                    count += 1;
                    if next == at {
                        // The remaining iterations would match empty as well.
                        count = count.max(*min);
                        break;
                    }
                    at = next;
                }
                (count >= *min).then_some(at)
            }
            Node::Ahead(node) => self.parse(node, text, pos, skip, depth, hit_limit).map(|_| pos),
            Node::NotAhead(node) => match self.parse(node, text, pos, skip, depth, hit_limit) {
                Some(_) => None,
                None => Some(pos),
            },
            Node::Rule(i) => self.parse(&self.rules[*i], text, pos, skip, depth + 1, hit_limit),
        }
    }

    fn terminal_start(&self, text: &str, pos: usize, skip: bool, hit_limit: &Cell<bool>) -> usize {
        if skip {
            self.skip(text, pos, hit_limit)
        } else {
            pos
        }
    }
}

impl Matcher for GrammarMatcher {
    fn find_matches(&self, text: &str) -> Matches {
        let mut spans = Vec::new();
        let mut abandoned = Vec::new();
        let mut pos = 0;
        let mut last_end = None;
        let hit_limit = Cell::new(false);

        while pos <= text.len() {
            let start = self.skip(text, pos, &hit_limit);
            hit_limit.set(false);
            let attempt = self.parse(&self.rules[0], text, start, true, 0, &hit_limit);
            if attempt.is_none() && hit_limit.get() {
                abandoned.push(start);
            }
            match attempt {
                Some(end) if end > start => {
                    spans.push(Span::new(start, end));
                    last_end = Some(end);
                    pos = end;
                }
                Some(end) => {
                    // Zero-width: never directly after the previous match.
                    if last_end != Some(end) {
                        spans.push(Span::new(start, end));
                    }
                    pos = next_boundary(text, start);
                }
                None => pos = next_boundary(text, start),
            }
        }
        Matches { spans, abandoned }
    }
}
