//! Whitespace tokenizer.
//!
//! Splits a record on runs of Unicode whitespace and drops empty fragments.
//! Case and punctuation are preserved: `"Vision,"` and `"vision"` are two
//! different tokens.

use std::str::SplitWhitespace;

/// Lazy token sequence over one record.
///
/// Clone it before consuming, or call [`tokenize`] again, to walk the same
/// record a second time.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // split_whitespace never yields empty fragments, and its fragments
        // carry no surrounding whitespace
        self.inner.next()
    }
}

impl<'a> DoubleEndedIterator for Tokens<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// Tokenize one record.
///
/// Never fails; a blank record yields no tokens.
///
/// ```
/// use wordtally::core::tokenize;
///
/// let tokens: Vec<&str> = tokenize("  Vision\tand  Robotics \n").collect();
/// assert_eq!(tokens, vec!["Vision", "and", "Robotics"]);
/// assert_eq!(tokenize(" \t ").count(), 0);
/// ```
pub fn tokenize(record: &str) -> Tokens<'_> {
    Tokens {
        inner: record.split_whitespace(),
    }
}
