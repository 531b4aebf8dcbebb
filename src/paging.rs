//! Page slicing for the grid. Display only: exports always read every row.

/// Rows of page `index`, clamped to the available range.
pub fn page<T>(rows: &[T], index: usize, size: usize) -> &[T] {
    if size == 0 {
        return &[];
    }
    let start = index.saturating_mul(size).min(rows.len());
    let end = start.saturating_add(size).min(rows.len());
    &rows[start..end]
}

pub fn page_count(row_count: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    row_count.div_ceil(size)
}

/// Current page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub index: usize,
    pub size: usize,
}

impl PageWindow {
    pub fn new(size: usize) -> Self {
        Self {
            index: 0,
            size: size.max(1),
        }
    }

    /// Index of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.index * self.size
    }

    /// Pull the index back inside `0..page_count` (0 for an empty table).
    pub fn clamp(&mut self, row_count: usize) {
        let pages = page_count(row_count, self.size);
        self.index = self.index.min(pages.saturating_sub(1));
    }

    pub fn set_size(&mut self, size: usize, row_count: usize) {
        self.size = size.max(1);
        self.clamp(row_count);
    }

    /// Returns true when the page changed.
    pub fn next(&mut self, row_count: usize) -> bool {
        if self.index + 1 < page_count(row_count, self.size) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_all_rows_exactly_once() {
        for len in [0usize, 1, 5, 22, 23, 44, 100] {
            let rows: Vec<usize> = (0..len).collect();
            for size in 1..=25 {
                let joined: Vec<usize> = (0..page_count(len, size))
                    .flat_map(|i| page(&rows, i, size).iter().copied())
                    .collect();
                assert_eq!(joined, rows, "len {len}, size {size}");
            }
        }
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let rows = [1, 2, 3];
        assert_eq!(page(&rows, 1, 2), &[3]);
        assert!(page(&rows, 2, 2).is_empty());
        assert!(page(&rows, usize::MAX, 2).is_empty());
        assert!(page(&rows, 0, 0).is_empty());
        assert_eq!(page_count(3, 0), 0);
    }

    #[test]
    fn window_clamps_when_table_shrinks() {
        let mut window = PageWindow::new(10);
        assert!(window.next(35));
        assert!(window.next(35));
        assert!(window.next(35));
        assert!(!window.next(35));
        assert_eq!(window.index, 3);
        assert_eq!(window.offset(), 30);

        window.clamp(12);
        assert_eq!(window.index, 1);
        window.clamp(0);
        assert_eq!(window.index, 0);
    }

    #[test]
    fn resizing_keeps_index_in_range() {
        let mut window = PageWindow::new(5);
        window.index = 8;
        window.set_size(20, 45);
        assert_eq!(window.index, 2);
        window.set_size(0, 45);
        assert_eq!(window.size, 1);
        assert!(window.prev());
        assert_eq!(window.index, 1);
    }
}
