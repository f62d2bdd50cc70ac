//! Splitting raw OCR text into cleaned lines.

/// Ordered, trimmed, non-empty lines of a receipt.
///
/// Line order follows the receipt layout; the merchant and date heuristics
/// depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    lines: Vec<String>,
}

impl LineSet {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Iterate over the lines in receipt order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for LineSet {
    /// Collect lines, applying the same trimming rules as [`normalize`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let lines = iter
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Self { lines }
    }
}

/// Split raw OCR text into trimmed, non-empty lines.
pub fn normalize(raw: &str) -> LineSet {
    raw.lines().collect()
}
