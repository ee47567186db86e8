//! In-memory search, filtering and pagination for list pages.
//!
//! Lists are fetched whole and narrowed locally. Search is a trimmed,
//! case-insensitive substring match over fields that depend on the page:
//! public pages search what a visitor sees, admin pages add ids.

pub mod latest;

pub use latest::{LatestSlot, RequestSequencer, Ticket};

use crate::models::{Comment, Professor, University};
use crate::utils::contains_ignore_case;

/// Items shown per page on every list.
pub const PAGE_SIZE: usize = 15;

/// Which page a list is searched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Public,
    Admin,
}

/// Something a list page can search.
pub trait Searchable {
    /// Text fields checked against the query on a page of the given scope.
    fn search_fields(&self, scope: Scope) -> Vec<&str>;

    fn matches(&self, query: &str, scope: Scope) -> bool {
        let query = query.trim();
        query.is_empty()
            || self
                .search_fields(scope)
                .into_iter()
                .any(|field| contains_ignore_case(field, query))
    }
}

impl Searchable for Professor {
    fn search_fields(&self, scope: Scope) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.department.as_deref());
        match scope {
            Scope::Public => fields.extend(self.university_name()),
            Scope::Admin => fields.push(self.id.as_str()),
        }
        fields
    }
}

impl Searchable for University {
    fn search_fields(&self, scope: Scope) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.country.as_deref());
        fields.extend(self.city.as_deref());
        if scope == Scope::Admin {
            fields.push(self.id.as_str());
        }
        fields
    }
}

impl Searchable for Comment {
    fn search_fields(&self, _scope: Scope) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.content.as_str()];
        if let Some(professor) = &self.professor {
            fields.push(professor.name.as_str());
        }
        if let Some(student) = &self.student {
            fields.push(student.name.as_str());
            fields.push(student.email.as_str());
        }
        fields
    }
}

/// Items matching `query`, in their original order.
pub fn search<T: Searchable + Clone>(items: &[T], query: &str, scope: Scope) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.matches(query, scope))
        .cloned()
        .collect()
}

/// Keep professors of one university. An empty id keeps everyone.
pub fn filter_by_university(professors: Vec<Professor>, university_id: &str) -> Vec<Professor> {
    if university_id.is_empty() {
        return professors;
    }
    professors
        .into_iter()
        .filter(|p| {
            p.university.as_ref().is_some_and(|u| u.id == university_id)
                || p.university_id.as_deref() == Some(university_id)
        })
        .collect()
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, always within `1..=total_pages`.
    pub number: usize,
    pub total_pages: usize,
    /// Items across all pages.
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Cut page `requested` out of `items`, clamping it into range.
    pub fn new(items: Vec<T>, requested: usize) -> Self {
        let total_items = items.len();
        let total_pages = total_items.div_ceil(PAGE_SIZE).max(1);
        let number = requested.clamp(1, total_pages);
        let items = items
            .into_iter()
            .skip((number - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();
        Self {
            items,
            number,
            total_pages,
            total_items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Search text, university filter and current page of a list page.
///
/// Changing the search or the filter goes back to the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    search: String,
    university: String,
    page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            university: String::new(),
            page: 1,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn university(&self) -> &str {
        &self.university
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_university(&mut self, university_id: impl Into<String>) {
        self.university = university_id.into();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Search then paginate.
    pub fn apply<T: Searchable + Clone>(&self, items: &[T], scope: Scope) -> Page<T> {
        Page::new(search(items, &self.search, scope), self.page)
    }

    /// Search, filter by university, then paginate.
    pub fn apply_professors(&self, professors: &[Professor], scope: Scope) -> Page<Professor> {
        let matching = search(professors, &self.search, scope);
        Page::new(filter_by_university(matching, &self.university), self.page)
    }
}

/// An entry in a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Pagination control for page `current` of `total`: the first and last
/// pages, the pages around the current one, and an ellipsis where pages are
/// skipped. Empty when there is a single page.
pub fn page_window(current: usize, total: usize) -> Vec<PageMarker> {
    if total <= 1 {
        return Vec::new();
    }
    (1..=total)
        .filter_map(|page| {
            let ellipsis_before = current > 3 && page + 2 == current;
            let ellipsis_after = page == current + 2 && current + 2 < total;
            if ellipsis_before || ellipsis_after {
                return Some(PageMarker::Ellipsis);
            }
            let near = page + 1 >= current && page <= current + 1;
            (page == 1 || page == total || near).then_some(PageMarker::Page(page))
        })
        .collect()
}
