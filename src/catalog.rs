use smallvec::SmallVec;

use crate::entities::{Course, Lang};

/// Page size of the public course grid.
pub const GRID_PAGE_SIZE: usize = 6;
/// Page size of the admin list views.
pub const ADMIN_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl PriceOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(PriceOrder::Ascending),
            "desc" => Some(PriceOrder::Descending),
            "none" => Some(PriceOrder::Unsorted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub price: PriceOrder,
    /// Exact tag match, compared against the category variant of the active
    /// language.
    pub category: Option<String>,
    /// Case-insensitive substring over the localized title only.
    pub search: Option<String>,
}

/// Applies filters and search to the full in-memory list.  `Unsorted` keeps
/// fetch order; the price sort is stable so ties keep their prior relative
/// order.
pub fn apply(courses: &[Course], filter: &CourseFilter, lang: Lang) -> Vec<Course> {
    let mut out: Vec<Course> = courses
        .iter()
        .filter(|c| match &filter.category {
            None => true,
            Some(tag) => c.categories.iter().any(|t| t.resolve(lang) == tag),
        })
        .filter(|c| match &filter.search {
            None => true,
            Some(term) => c
                .title
                .resolve(lang)
                .to_lowercase()
                .contains(&term.to_lowercase()),
        })
        .cloned()
        .collect();

    match filter.price {
        PriceOrder::Unsorted => (),
        PriceOrder::Ascending => out.sort_by(|a, b| a.price.total_cmp(&b.price)),
        PriceOrder::Descending => out.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    out
}

/// 1-based page slicing; an out-of-range page is an empty slice, not an
/// error.
pub fn paginate<T: Clone>(items: &[T], per_page: usize, page: usize) -> SmallVec<[T; 6]> {
    if page == 0 {
        return SmallVec::new();
    }

    let start = per_page * (page - 1);

    items
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect()
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    (total + per_page - 1) / per_page
}

/// One surface's view of the course list: the current page resets to 1
/// whenever the filter or search term changes.
#[derive(Debug, Default)]
pub struct CatalogView {
    filter: CourseFilter,
    page: usize,
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            filter: CourseFilter::default(),
            page: 1,
        }
    }

    pub fn filter(&self) -> &CourseFilter { &self.filter }

    pub fn page(&self) -> usize { self.page }

    pub fn set_filter(&mut self, filter: CourseFilter) {
        if filter != self.filter {
            self.page = 1;
        }
        self.filter = filter;
    }

    pub fn set_search(&mut self, term: Option<String>) {
        if term != self.filter.search {
            self.page = 1;
        }
        self.filter.search = term;
    }

    pub fn set_page(&mut self, page: usize) { self.page = page.max(1); }

    pub fn current_page(&self, courses: &[Course], lang: Lang) -> SmallVec<[Course; 6]> {
        let filtered = apply(courses, &self.filter, lang);

        paginate(&filtered, GRID_PAGE_SIZE, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CourseId, LocalizedText};

    fn course(title: &str, price: f64, tag: &str) -> Course {
        Course {
            id: CourseId::create(),
            title: LocalizedText::with_ar(title, format!("{}-ar", title)),
            description: LocalizedText::new("desc"),
            creator: LocalizedText::new("creator"),
            price,
            categories: vec![LocalizedText::with_ar(tag, format!("{}-ar", tag))],
            image: "https://example.com/img.png".to_string(),
            popular: false,
            rating: 4.0,
        }
    }

    fn fixture() -> Vec<Course> {
        vec![
            course("Rust Basics", 30.0, "programming"),
            course("Advanced Rust", 60.0, "programming"),
            course("Watercolors", 30.0, "art"),
            course("Oil Painting", 45.0, "art"),
        ]
    }

    #[test]
    fn filtered_page_is_subset_of_source() {
        let courses = fixture();
        let filter = CourseFilter {
            category: Some("art".to_string()),
            ..Default::default()
        };

        let out = apply(&courses, &filter, Lang::En);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| courses.iter().any(|s| s.id == c.id)));
    }

    #[test]
    fn category_uses_active_language_variant() {
        let courses = fixture();
        let filter = CourseFilter {
            category: Some("art-ar".to_string()),
            ..Default::default()
        };

        assert_eq!(apply(&courses, &filter, Lang::Ar).len(), 2);
        assert_eq!(apply(&courses, &filter, Lang::En).len(), 0);
    }

    #[test]
    fn price_sort_is_stable_on_ties() {
        let courses = fixture();
        let filter = CourseFilter {
            price: PriceOrder::Ascending,
            ..Default::default()
        };

        let out = apply(&courses, &filter, Lang::En);
        // both 30.0 courses keep their fetch order
        assert_eq!(out[0].title.en, "Rust Basics");
        assert_eq!(out[1].title.en, "Watercolors");
        assert_eq!(out[3].title.en, "Advanced Rust");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let courses = fixture();
        let filter = CourseFilter {
            search: Some("rUsT".to_string()),
            ..Default::default()
        };

        assert_eq!(apply(&courses, &filter, Lang::En).len(), 2);
    }

    #[test]
    fn search_without_match_is_empty_not_error() {
        let courses = fixture();
        let filter = CourseFilter {
            search: Some("quantum".to_string()),
            ..Default::default()
        };

        assert!(apply(&courses, &filter, Lang::En).is_empty());
    }

    #[test]
    fn search_composes_with_filters() {
        let courses = fixture();
        let filter = CourseFilter {
            category: Some("programming".to_string()),
            search: Some("advanced".to_string()),
            ..Default::default()
        };

        let out = apply(&courses, &filter, Lang::En);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.en, "Advanced Rust");
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let courses = fixture();

        assert_eq!(paginate(&courses, GRID_PAGE_SIZE, 1).len(), 4);
        assert!(paginate(&courses, GRID_PAGE_SIZE, 2).is_empty());
        assert!(paginate(&courses, GRID_PAGE_SIZE, 0).is_empty());
    }

    #[test]
    fn admin_page_size_slices_by_five() {
        let mut courses = fixture();
        courses.extend(fixture());

        assert_eq!(paginate(&courses, ADMIN_PAGE_SIZE, 1).len(), 5);
        assert_eq!(paginate(&courses, ADMIN_PAGE_SIZE, 2).len(), 3);
        assert_eq!(page_count(courses.len(), ADMIN_PAGE_SIZE), 2);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut view = CatalogView::new();
        view.set_page(3);

        view.set_filter(CourseFilter {
            price: PriceOrder::Descending,
            ..Default::default()
        });
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_search(Some("rust".to_string()));
        assert_eq!(view.page(), 1);

        // unchanged search term keeps the page
        view.set_page(2);
        view.set_search(Some("rust".to_string()));
        assert_eq!(view.page(), 2);
    }
}
