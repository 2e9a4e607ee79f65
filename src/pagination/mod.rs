use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid page 0, pages start at 1")]
    ZeroPage,

    #[error("invalid items per page 0, expected positive integer")]
    ZeroPageSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    current_page: usize,
    items_per_page: usize,
}

impl PageRequest {
    pub fn new(current_page: usize, items_per_page: usize) -> Result<Self, PaginationError> {
        if current_page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            current_page,
            items_per_page,
        })
    }

    /// Same page size at another page; 0 is treated as page 1.
    pub fn with_page(self, current_page: usize) -> Self {
        Self {
            current_page: current_page.max(1),
            ..self
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn index_of_first_item(&self) -> usize {
        (self.current_page - 1).saturating_mul(self.items_per_page)
    }

    pub fn index_of_last_item(&self) -> usize {
        self.current_page.saturating_mul(self.items_per_page)
    }
}

pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 0;
    }
    total_items.div_ceil(items_per_page)
}

/// Moves `page` into `1..=max(1, total_pages)`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn previous_page(current_page: usize) -> usize {
    current_page.saturating_sub(1).max(1)
}

pub fn next_page(current_page: usize, total_pages: usize) -> usize {
    current_page.saturating_add(1).min(total_pages.max(1))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Page controls are shown only when there is more than one page.
    pub fn has_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn previous_page(&self) -> usize {
        previous_page(self.current_page)
    }

    pub fn next_page(&self) -> usize {
        next_page(self.current_page, self.total_pages)
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages
    }

    /// `Showing 6-10 of 12 users`, or `Showing 0-0 of N users` when the
    /// slice is empty.
    pub fn range_label(&self, noun: &str) -> String {
        if self.items.is_empty() {
            return format!("Showing 0-0 of {} {noun}", self.total_items);
        }
        let start = (self.current_page - 1) * self.items_per_page + 1;
        let end = start + self.items.len() - 1;
        format!("Showing {start}-{end} of {} {noun}", self.total_items)
    }
}

/// Slices `items` to the requested window. The page is not clamped: a page
/// past the end yields an empty slice with the real `total_pages`.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let first = request.index_of_first_item().min(items.len());
    let last = request.index_of_last_item().min(items.len());
    Page {
        items: items[first..last].to_vec(),
        current_page: request.current_page,
        items_per_page: request.items_per_page,
        total_pages: total_pages(items.len(), request.items_per_page),
        total_items: items.len(),
    }
}
