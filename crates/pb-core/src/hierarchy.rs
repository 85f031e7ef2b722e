//! Ancestor-domain enumeration
//!
//! Blocking a domain also hides every subdomain below it, so a host is
//! checked against each of its ancestors. Ancestors are walked from the
//! broadest covering domain down to the full host, which lets a broad rule
//! take precedence when several rules would match.
//!
//! # Examples
//!
//! ```
//! use pb_core::hierarchy::ancestors;
//!
//! let chain: Vec<&str> = ancestors("a.b.c.com").collect();
//! assert_eq!(chain, ["c.com", "b.c.com", "a.b.c.com"]);
//! ```

use std::iter::FusedIterator;

/// Iterator over the ancestor domains of a host, broadest first.
///
/// The bare top-level label is never yielded; the last item is the host
/// itself.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    host: &'a str,
    next_start: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        let result = &self.host[start..];

        // Extend by one label to the left
        self.next_start = if start == 0 {
            None
        } else {
            Some(label_start(self.host, start - 1))
        };

        Some(result)
    }
}

impl FusedIterator for Ancestors<'_> {}

/// Walk the ancestors of `host` from the broadest covering domain to the
/// host itself. Single-label and empty hosts yield nothing.
pub fn ancestors(host: &str) -> Ancestors<'_> {
    let next_start = host
        .rfind('.')
        .filter(|&dot| dot > 0 && dot + 1 < host.len())
        .map(|dot| label_start(host, dot));

    Ancestors { host, next_start }
}

/// Check whether `pattern` is `host` or one of its ancestors.
pub fn is_ancestor_or_self(pattern: &str, host: &str) -> bool {
    ancestors(host).any(|candidate| candidate == pattern)
}

/// Start of the label that ends right before the dot at `dot`.
#[inline]
fn label_start(host: &str, dot: usize) -> usize {
    host[..dot].rfind('.').map_or(0, |prev| prev + 1)
}
