use ropey::Rope;

/// The text side of a converter, backed by a rope.
///
/// Every content change bumps the revision. The mirror records the
/// revision its blocks were imported from to tell when they are stale.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    revision: u64,
}

impl TextBuffer {
    /// Create an empty buffer at revision 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the whole content.
    ///
    /// Returns `true` if the content actually changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.matches(text) {
            return false;
        }
        self.rope = Rope::from_str(text);
        self.revision += 1;
        true
    }

    /// Whether the buffer holds exactly `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.rope == text
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Monotonic counter of content changes.
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_starts_at_revision_zero() {
        let buf = TextBuffer::empty();
        assert_eq!(buf.revision(), 0);
        assert!(buf.matches(""));
    }

    #[test]
    fn test_set_text_bumps_revision() {
        let mut buf = TextBuffer::empty();
        assert!(buf.set_text("for x in y:\n    pass"));
        assert_eq!(buf.revision(), 1);
        assert_eq!(buf.text(), "for x in y:\n    pass");
    }

    #[test]
    fn test_set_same_text_is_a_no_op() {
        let mut buf = TextBuffer::empty();
        buf.set_text("0");
        assert!(!buf.set_text("0"));
        assert_eq!(buf.revision(), 1);
    }

    #[test]
    fn test_matches_is_exact() {
        let mut buf = TextBuffer::empty();
        buf.set_text("a = 0\n");
        assert!(buf.matches("a = 0\n"));
        assert!(!buf.matches("a = 0"));
    }

    #[test]
    fn test_unicode_roundtrip() {
        let mut buf = TextBuffer::empty();
        buf.set_text("print('預期')");
        assert_eq!(buf.text(), "print('預期')");
    }
}
