use serde::Serialize;

/// One-based page selection. Missing or non-positive values fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, size: Self::DEFAULT_SIZE }
    }
}

impl Page {
    pub const DEFAULT_SIZE: u64 = 10;

    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let number = page.filter(|p| *p > 0).map(|p| p as u64).unwrap_or(1);
        let size = page_size
            .filter(|s| *s > 0)
            .map(|s| s as u64)
            .unwrap_or(Self::DEFAULT_SIZE);
        Self { number, size }
    }

    pub fn skip(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn total_pages(&self, total_records: u64) -> u64 {
        total_records.div_ceil(self.size)
    }

    /// Slice an already-filtered in-memory result set.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.skip() as usize)
            .take(self.size as usize)
            .cloned()
            .collect()
    }
}

/// A page of records. Key spelling matches what existing clients read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Paged<T> {
    pub current_page: u64,
    pub total_records: u64,
    pub total_pages: u64,
    pub records: Vec<T>,
}

impl<T> Paged<T> {
    pub fn new(page: Page, total_records: u64, records: Vec<T>) -> Self {
        Self {
            current_page: page.number,
            total_records,
            total_pages: page.total_pages(total_records),
            records,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            current_page: self.current_page,
            total_records: self.total_records,
            total_pages: self.total_pages,
            records: self.records.into_iter().map(f).collect(),
        }
    }
}
