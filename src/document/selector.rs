//! A small CSS selector subset used for heading and container patterns.
//!
//! Supported: type selectors and `*`, `#id`, `.class`, attribute selectors
//! (`[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`), the descendant and
//! child (`>`) combinators, and comma-separated lists.

use std::fmt;

use lazy_static::lazy_static;
use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::document::node;
use crate::utils::error::PagetocError;

lazy_static! {
    static ref IDENT_REGEX: Regex = Regex::new(
        r"^-?(?:[_a-zA-Z]|[^\x00-\x7F])(?:[_a-zA-Z0-9-]|[^\x00-\x7F])*"
    ).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    condition: Option<(AttrOp, String)>,
}

impl AttrSelector {
    fn matches(&self, element: &Handle) -> bool {
        let Some(actual) = node::get_attr(element, &self.name) else {
            return false;
        };

        match &self.condition {
            None => true,
            Some((AttrOp::Equals, value)) => actual == *value,
            Some((AttrOp::Includes, value)) => actual.split_ascii_whitespace().any(|w| w == value),
            Some((AttrOp::Prefix, value)) => !value.is_empty() && actual.starts_with(value.as_str()),
            Some((AttrOp::Suffix, value)) => !value.is_empty() && actual.ends_with(value.as_str()),
            Some((AttrOp::Substring, value)) => !value.is_empty() && actual.contains(value.as_str()),
        }
    }
}

/// One compound selector such as `h2.chapter[data-toc]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl CompoundSelector {
    fn matches(&self, element: &Handle) -> bool {
        let Some(tag) = node::tag_name(element) else {
            return false;
        };

        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(&tag) {
                return false;
            }
        }

        if !self.ids.is_empty() {
            let id = node::get_attr(element, "id");
            if !self.ids.iter().all(|expected| id.as_deref() == Some(expected.as_str())) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let classes = node::class_list(element);
            if !self.classes.iter().all(|c| classes.contains(c)) {
                return false;
            }
        }

        self.attrs.iter().all(|attr| attr.matches(element))
    }
}

/// Compound selectors joined by combinators, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    parts: Vec<CompoundSelector>,
    /// `combinators[i]` joins `parts[i]` and `parts[i + 1]`
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    fn matches(&self, element: &Handle) -> bool {
        self.matches_from(self.parts.len() - 1, element)
    }

    fn matches_from(&self, index: usize, element: &Handle) -> bool {
        if !self.parts[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => node::parent_element(element)
                .map_or(false, |parent| self.matches_from(index - 1, &parent)),
            Combinator::Descendant => {
                let mut ancestor = node::parent_element(element);
                while let Some(current) = ancestor {
                    if self.matches_from(index - 1, &current) {
                        return true;
                    }
                    ancestor = node::parent_element(&current);
                }
                false
            }
        }
    }
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(pattern: &str) -> Result<Self, PagetocError> {
        let selectors = Parser::new(pattern).parse_list()?;
        Ok(Self {
            source: pattern.trim().to_string(),
            selectors,
        })
    }

    /// The pattern this list was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the element matches any selector of the list
    pub fn matches(&self, element: &Handle) -> bool {
        node::is_element(element) && self.selectors.iter().any(|s| s.matches(element))
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.pos > start
    }

    fn error(&self, message: &str) -> PagetocError {
        PagetocError::Selector(format!(
            "{} at position {} in '{}'", message, self.pos, self.input
        ))
    }

    fn ident(&mut self) -> Option<String> {
        let found = IDENT_REGEX.find(self.rest())?;
        let ident = found.as_str().to_string();
        self.pos += found.end();
        Some(ident)
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, PagetocError> {
        self.ident().ok_or_else(|| self.error(&format!("expected {}", what)))
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, PagetocError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.bump(),
                Some(_) => return Err(self.error("unexpected character")),
            }
        }
        Ok(selectors)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, PagetocError> {
        let mut parts = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some('+') | Some('~') => return Err(self.error("sibling combinators are not supported")),
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.error("unexpected character")),
            };
            combinators.push(combinator);
            parts.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, PagetocError> {
        let mut compound = CompoundSelector::default();
        let mut empty = true;

        if self.peek() == Some('*') {
            self.bump();
            empty = false;
        } else if let Some(tag) = self.ident() {
            compound.tag = Some(tag.to_ascii_lowercase());
            empty = false;
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.expect_ident("an id")?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.expect_ident("a class name")?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
            empty = false;
        }

        if empty {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, PagetocError> {
        self.skip_whitespace();
        let name = self.expect_ident("an attribute name")?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = [
            ("~=", AttrOp::Includes),
            ("^=", AttrOp::Prefix),
            ("$=", AttrOp::Suffix),
            ("*=", AttrOp::Substring),
            ("=", AttrOp::Equals),
        ]
        .into_iter()
        .find(|(token, _)| self.rest().starts_with(token));

        let condition = match op {
            Some((token, op)) => {
                self.pos += token.len();
                self.skip_whitespace();
                let value = self.parse_attr_value()?;
                self.skip_whitespace();
                Some((op, value))
            }
            None => None,
        };

        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.bump();

        Ok(AttrSelector { name, condition })
    }

    fn parse_attr_value(&mut self) -> Result<String, PagetocError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let rest = self.rest();
                let end = rest.find(quote).ok_or_else(|| self.error("unterminated string"))?;
                let value = rest[..end].to_string();
                self.pos += end + quote.len_utf8();
                Ok(value)
            }
            _ => self.expect_ident("an attribute value"),
        }
    }
}
