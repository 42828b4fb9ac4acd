//! Page cursors and the per-page result type.
//!
//! Cursors are 1-based page numbers serialized as decimal strings. An
//! empty cursor means "first page, source default offset"; anything
//! else must parse to a number ≥ 1 or the call fails before any
//! network I/O.

use crate::error::{ConnectorError, Result};

/// Parse a continuation cursor.
///
/// Returns `None` for the empty cursor (first page, no explicit `page`
/// parameter) and `Some(page)` for a previously returned cursor.
/// Malformed or out-of-range cursors fail with
/// [`ConnectorError::InvalidCursor`]; there is no fallback page.
pub fn parse_cursor(cursor: &str) -> Result<Option<u32>> {
    if cursor.is_empty() {
        return Ok(None);
    }

    let page: u32 = cursor
        .parse()
        .map_err(|_| ConnectorError::invalid_cursor(cursor))?;
    if page < 1 {
        return Err(ConnectorError::invalid_cursor(cursor));
    }
    Ok(Some(page))
}

/// One page of raw items plus the continuation signal.
///
/// `next_page` is `None` exactly when the source reports no further
/// pages. Items are never aggregated across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// The cursor to hand back to the driver: empty iff this was the
    /// last page.
    #[must_use]
    pub fn next_cursor(&self) -> String {
        match self.next_page {
            Some(page) => page.to_string(),
            None => String::new(),
        }
    }

    /// Map every item on the page, keeping the continuation signal.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page: self.next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor_means_first_page() {
        assert_eq!(parse_cursor("").unwrap(), None);
    }

    #[test]
    fn numeric_cursors_parse() {
        assert_eq!(parse_cursor("1").unwrap(), Some(1));
        assert_eq!(parse_cursor("2").unwrap(), Some(2));
        assert_eq!(parse_cursor("348").unwrap(), Some(348));
    }

    #[test]
    fn malformed_cursors_are_rejected() {
        for cursor in ["0", "-1", "abc", "1.5", " 2", "2 "] {
            let err = parse_cursor(cursor).unwrap_err();
            assert!(
                matches!(err, ConnectorError::InvalidCursor { .. }),
                "cursor {cursor:?} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn next_cursor_is_empty_only_at_the_end() {
        let page = Page {
            items: vec![1, 2],
            next_page: Some(3),
        };
        assert_eq!(page.next_cursor(), "3");

        let last: Page<i32> = Page {
            items: vec![5],
            next_page: None,
        };
        assert_eq!(last.next_cursor(), "");
    }

    #[test]
    fn map_preserves_continuation() {
        let page = Page {
            items: vec![1, 2, 3],
            next_page: Some(2),
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.next_page, Some(2));
    }
}
