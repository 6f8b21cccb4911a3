/// A named piece of source text.
///
/// Line numbers are 1-based, matching the line counter kept by the lexer.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Cached line start byte offsets for fast line lookup.
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Extract a source line by 1-based line number.
    ///
    /// Returns `None` if the line number is out of range.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1)) // strip the \n
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_extraction() {
        let src = SourceFile::new("test.cyp", "spit a = 1\nspit b = 2\nflow a + b");
        assert_eq!(src.line(1), Some("spit a = 1"));
        assert_eq!(src.line(2), Some("spit b = 2"));
        assert_eq!(src.line(3), Some("flow a + b"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let src = SourceFile::new("test.cyp", "flow 1\r\nflow 2\r\n");
        assert_eq!(src.line(1), Some("flow 1"));
        assert_eq!(src.line(2), Some("flow 2"));
    }

    #[test]
    fn test_line_count() {
        let src = SourceFile::new("test.cyp", "a\nb\nc");
        assert_eq!(src.line_count(), 3);
    }

    #[test]
    fn test_empty_source() {
        let src = SourceFile::new("test.cyp", "");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1), Some(""));
    }
}
