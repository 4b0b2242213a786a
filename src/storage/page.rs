//! Page identifier and size constants.

/// 8KB page size (PostgreSQL's default `BLCKSZ`).
pub const PAGE_SIZE: usize = 8192;

/// Zero-based page number within a relation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Creates a new PageId from a page number.
    pub const fn new(page_num: u64) -> Self {
        Self(page_num)
    }

    /// Returns the page number.
    pub const fn page_num(&self) -> u64 {
        self.0
    }

    /// Byte offset of this page within its relation file.
    pub const fn byte_offset(&self) -> u64 {
        self.0 * PAGE_SIZE as u64
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_byte_offset() {
        assert_eq!(PageId::new(0).byte_offset(), 0);
        assert_eq!(PageId::new(1).byte_offset(), 8192);
        assert_eq!(PageId::new(7).byte_offset(), 57344);
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(PageId::new(42).to_string(), "42");
    }
}
