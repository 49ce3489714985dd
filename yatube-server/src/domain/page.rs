use std::num::IntErrorKind;

use serde::Serialize;

pub(crate) const POSTS_PER_PAGE: u32 = 10;

/// Reads the `?page=` value. Anything that is not an integer means the first page;
/// integers too large for `i64` saturate so that clamping still picks the edge page.
pub(crate) fn parse_page_number(raw: Option<&str>) -> i64 {
    let Some(value) = raw.map(str::trim) else {
        return 1;
    };
    match value.parse::<i64>() {
        Ok(number) => number,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 1,
        },
    }
}

/// Splits `total` ordered items into pages of `per_page`.
///
/// There is always at least one page, so an empty listing still renders as
/// page 1 of 1. Requested numbers outside `1..=num_pages` are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    total: u64,
    per_page: u32,
}

impl Paginator {
    pub(crate) fn new(total: u64, per_page: u32) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    pub(crate) fn num_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub(crate) fn clamp(&self, requested: i64) -> u32 {
        let last = self.num_pages();
        if requested < 1 {
            1
        } else if requested > i64::from(last) {
            last
        } else {
            requested as u32
        }
    }

    pub(crate) fn window(&self, requested: i64) -> PageWindow {
        PageWindow {
            number: self.clamp(requested),
            per_page: self.per_page,
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

/// Position of one page inside a listing, before its items are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) number: u32,
    pub(crate) per_page: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: u64,
}

impl PageWindow {
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.per_page)
    }

    pub(crate) fn with_items<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: u64,
}

impl<T> Page<T> {
    pub(crate) fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub(crate) fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub(crate) fn next_page_number(&self) -> u32 {
        (self.number + 1).min(self.num_pages)
    }

    pub(crate) fn previous_page_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }
}

/// Slices an already ordered sequence with the same window arithmetic the
/// store queries use.
#[cfg(test)]
pub(crate) fn paginate<T>(items: Vec<T>, per_page: u32, requested: i64) -> Page<T> {
    let window = Paginator::new(items.len() as u64, per_page).window(requested);
    let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
    let items = items
        .into_iter()
        .skip(offset)
        .take(window.per_page as usize)
        .collect();
    window.with_items(items)
}
