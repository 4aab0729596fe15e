//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct applied to in-memory feeds.

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `(offset, limit)`
    pub fn normalize(self) -> (usize, usize) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        (((page - 1) as usize) * per_page as usize, per_page as usize)
    }

    /// Keep only the requested page of `items`.
    pub fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        let (offset, limit) = self.normalize();
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (offset, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(offset, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (offset, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(offset, 400);
        assert_eq!(per, 100);
    }

    #[test]
    fn apply_slices_pages() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(Pagination { page: 2, per_page: 3 }.apply(items.clone()), vec![4, 5, 6]);
        assert_eq!(Pagination { page: 3, per_page: 3 }.apply(items.clone()), vec![7]);
        assert!(Pagination { page: 4, per_page: 3 }.apply(items).is_empty());
    }
}
