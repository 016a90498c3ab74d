// src/extract.rs
//! Pull text and numbers out of a loaded document at a locator.
//!
//! Integer extraction is deliberately naive: it keeps the digits of the first
//! non-blank text node and drops everything else, so `"550,234 activities"`,
//! `"$1,200"` and `"1.200"` all work. Locators must point at whole-number
//! displays; `"12.5"` reads as `125`.

use regex::Regex;
use thiserror::Error;

use crate::core::locator::{Locator, LocatorError};
use crate::core::sanitize::{digits_only, has_content};
use crate::store::Document;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// The locator matched no non-blank text.
    #[error("nothing usable at `{locator}` in {document}")]
    LocatorMiss { document: String, locator: String },

    /// Text was found but it holds no digits.
    #[error("no digits in {fragment:?} at `{locator}` in {document}")]
    NonNumericContent { document: String, locator: String, fragment: String },

    #[error("{digits} at `{locator}` in {document} does not fit in 64 bits")]
    NumericOverflow { document: String, locator: String, digits: String },
}

const LINKS: &str = "//a[@href]/@href";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("no digits in {0:?}")]
    NoDigits(String),

    #[error("{0} does not fit in 64 bits")]
    Overflow(String),
}

/// Text of every match, in document order. Empty when nothing matches.
pub fn query(doc: &Document, locator: &str) -> Result<Vec<String>, ExtractError> {
    let loc = Locator::parse(locator)?;
    Ok(query_with(doc, &loc))
}

pub fn query_with(doc: &Document, locator: &Locator) -> Vec<String> {
    locator.select_strings(doc.tree())
}

/// Matches joined by single spaces.
pub fn query_joined(doc: &Document, locator: &str) -> Result<String, ExtractError> {
    Ok(query(doc, locator)?.join(" "))
}

/// The one integer shown at `locator`: digits of the first non-blank text
/// node under it. No non-blank text at all (nothing matched, only
/// whitespace, or the number sits in a child element) is a [`LocatorMiss`].
///
/// [`LocatorMiss`]: ExtractError::LocatorMiss
pub fn query_single_integer(doc: &Document, locator: &str) -> Result<u64, ExtractError> {
    let text_loc = Locator::parse(locator)?.join("/text()")?;
    let Some(first) = query_with(doc, &text_loc).into_iter().find(|f| has_content(f)) else {
        return Err(ExtractError::LocatorMiss { document: s!(doc.name()), locator: s!(locator) });
    };

    integer_from_fragment(&first).map_err(|e| match e {
        FragmentError::NoDigits(fragment) => ExtractError::NonNumericContent {
            document: s!(doc.name()),
            locator: s!(locator),
            fragment,
        },
        FragmentError::Overflow(digits) => ExtractError::NumericOverflow {
            document: s!(doc.name()),
            locator: s!(locator),
            digits,
        },
    })
}

/// Digits of `fragment`, in order, read as one base-10 number.
/// `"550,234"` → 550234, `"N/A"` and `""` → `NoDigits`.
pub fn integer_from_fragment(fragment: &str) -> Result<u64, FragmentError> {
    let digits = digits_only(fragment);
    if digits.is_empty() {
        return Err(FragmentError::NoDigits(s!(fragment)));
    }
    digits.parse::<u64>().map_err(|_| FragmentError::Overflow(digits))
}

/// Every `href` of every `<a>` on the page.
pub fn links(doc: &Document) -> Result<Vec<String>, ExtractError> {
    query(doc, LINKS)
}

pub fn substring_in_list<S: AsRef<str>>(needle: &str, list: &[S]) -> bool {
    list.iter().any(|s| s.as_ref().contains(needle))
}

/// True when `pattern` matches anywhere in any entry (search, not anchored).
pub fn regex_match_in_list<S: AsRef<str>>(pattern: &str, list: &[S]) -> Result<bool, regex::Error> {
    let re = Regex::new(pattern)?;
    Ok(list.iter().any(|s| re.is_match(s.as_ref())))
}
