//! Page-sequence payload used by the help menu and the AniList list browser.

use crate::transition::{Step, Transition};
use cogwheel_common::page_count;

/// Navigation events understood by a [`Pager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerEvent<T> {
    /// Jump to the first page.
    First,
    /// One page back, stopping at the first.
    Prev,
    /// One page forward, stopping at the last.
    Next,
    /// Jump to the last page.
    Last,
    /// Jump to a 1-based page number typed by the user.
    GoTo(String),
    /// Swap in a new page sequence and start over from page 1.
    Filter {
        /// Label of the selected filter (category, list status...).
        label: String,
        /// The filtered pages.
        pages: Vec<T>,
    },
    /// Close the menu.
    Close,
}

/// An ordered sequence of pages with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager<T> {
    pages: Vec<T>,
    current: usize,
    label: String,
}

impl<T> Pager<T> {
    /// Pager positioned on the first page.
    pub fn new(label: impl Into<String>, pages: Vec<T>) -> Self {
        Self {
            pages,
            current: 0,
            label: label.into(),
        }
    }

    /// Current page, if there are any pages.
    pub fn current_page(&self) -> Option<&T> {
        self.pages.get(self.current)
    }

    /// 1-based number of the current page.
    pub const fn page_number(&self) -> usize {
        self.current + 1
    }

    /// Number of pages shown to the user; an empty pager still shows one page.
    pub fn page_count(&self) -> usize {
        self.pages.len().max(1)
    }

    /// All pages.
    pub fn pages(&self) -> &[T] {
        &self.pages
    }

    /// Label of the active filter.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether there is a page before the current one.
    pub const fn has_prev(&self) -> bool {
        self.current > 0
    }

    /// Whether there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.current + 1 < self.pages.len()
    }

    /// `"Page i/N"`.
    pub fn indicator(&self) -> String {
        format!("Page {}/{}", self.page_number(), self.page_count())
    }

    fn go_to(&mut self, raw: &str) -> Step<PagerEvent<T>> {
        let Ok(number) = raw.trim().parse::<i64>() else {
            return Step::reject("Please enter a valid number.");
        };

        let count = self.page_count();
        match usize::try_from(number) {
            Ok(n) if (1..=count).contains(&n) => {
                self.current = n - 1;
                Step::render()
            }
            _ => Step::reject(format!(
                "Invalid page number. Please enter a number between 1 and {count}."
            )),
        }
    }
}

impl<T: Clone> Pager<T> {
    /// Splits `items` into pages of `per_page` entries.
    pub fn from_items(label: impl Into<String>, items: &[T], per_page: usize) -> Pager<Vec<T>> {
        let per_page = per_page.max(1);
        let mut pages = Vec::with_capacity(page_count(items.len(), per_page));
        pages.extend(items.chunks(per_page).map(<[T]>::to_vec));
        Pager::new(label, pages)
    }
}

impl<T> Transition for Pager<T> {
    type Event = PagerEvent<T>;

    fn apply(&mut self, event: Self::Event) -> Step<Self::Event> {
        match event {
            PagerEvent::First => self.current = 0,
            PagerEvent::Prev => self.current = self.current.saturating_sub(1),
            PagerEvent::Next => {
                if self.has_next() {
                    self.current += 1;
                }
            }
            PagerEvent::Last => self.current = self.page_count() - 1,
            PagerEvent::GoTo(raw) => return self.go_to(&raw),
            PagerEvent::Filter { label, pages } => {
                self.label = label;
                self.pages = pages;
                self.current = 0;
            }
            PagerEvent::Close => return Step::finish(),
        }
        Step::render()
    }
}
