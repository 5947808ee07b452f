//! Filtered, paginated account views.
//!
//! Each list request re-derives its slice from the full account set: the
//! filter narrows, the page selects. Two views over the same data stay
//! independent because every view carries its own filter and page.

/// Accounts shown per page unless a request asks otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Filter and page state for one account listing.
#[derive(Debug, Clone)]
pub struct ListView {
    filter: String,
    page: usize,
    page_size: usize,
}

impl ListView {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the filter text. Any actual change snaps the view back to
    /// the first page so the narrowed result is shown from the top.
    pub fn set_filter(&mut self, filter: &str) {
        if self.filter != filter {
            self.filter = filter.to_string();
            self.page = 1;
        }
    }

    /// Move to `page`, clamped into the range the current item count
    /// allows. Page 1 is always reachable, even over an empty result.
    pub fn set_page(&mut self, page: usize, total_items: usize) {
        self.page = clamp_page(page, page_count(total_items, self.page_size));
    }

    /// Select the current page out of `items`. Out-of-range pages yield an
    /// empty slice instead of panicking.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }
}

/// Case-insensitive substring match against the display name or the
/// login. An empty filter matches everything.
#[must_use]
pub fn matches_filter(full_name: Option<&str>, username: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let needle = filter.to_lowercase();
    let name = full_name.unwrap_or(username);

    name.to_lowercase().contains(&needle) || username.to_lowercase().contains(&needle)
}

/// Number of pages needed for `total_items`; zero items means zero pages.
#[must_use]
pub const fn page_count(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Clamp a requested page into `[1, total_pages]`, treating an empty
/// result as a single blank page.
#[must_use]
pub const fn clamp_page(page: usize, total_pages: usize) -> usize {
    let upper = if total_pages == 0 { 1 } else { total_pages };
    if page < 1 {
        1
    } else if page > upper {
        upper
    } else {
        page
    }
}

/// The sub-slice for 1-based `page`. Never panics: pages past the end
/// come back empty.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);

    if start >= items.len() {
        return &[];
    }

    let end = (start + page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<(Option<String>, String)> {
        vec![
            (Some("Alice Cooper".to_string()), "alice".to_string()),
            (None, "bob".to_string()),
            (Some("Carol Mayer".to_string()), "carol".to_string()),
            (Some("Dan Brown".to_string()), "dan".to_string()),
            (None, "erin".to_string()),
            (Some("Frank Ocean".to_string()), "frank".to_string()),
            (None, "grace".to_string()),
        ]
    }

    fn apply_filter(filter: &str) -> Vec<String> {
        names()
            .into_iter()
            .filter(|(full_name, username)| {
                matches_filter(full_name.as_deref(), username, filter)
            })
            .map(|(_, username)| username)
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(apply_filter("").len(), 7);
    }

    #[test]
    fn filter_is_case_insensitive_on_both_fields() {
        assert_eq!(apply_filter("COOPER"), vec!["alice"]);
        assert_eq!(apply_filter("BoB"), vec!["bob"]);
    }

    #[test]
    fn filter_matches_substrings() {
        assert_eq!(apply_filter("ra"), vec!["frank", "grace"]);
    }

    #[test]
    fn missing_display_name_falls_back_to_username() {
        // "erin" has no display name but must still be findable by login
        assert_eq!(apply_filter("eri"), vec!["erin"]);
    }

    #[test]
    fn changing_filter_resets_page() {
        let mut view = ListView::new(2);
        view.set_page(3, 7);
        assert_eq!(view.page(), 3);

        view.set_filter("ann");
        assert_eq!(view.page(), 1);

        // setting the same filter again is not a change
        view.set_page(2, 7);
        view.set_filter("ann");
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn page_clamps_to_valid_range() {
        let mut view = ListView::new(5);
        view.set_page(99, 7);
        assert_eq!(view.page(), 2);

        view.set_page(0, 7);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn empty_results_never_panic() {
        let mut view = ListView::new(5);
        view.set_filter("no such person");
        view.set_page(4, 0);
        assert_eq!(view.page(), 1);

        let empty: Vec<String> = Vec::new();
        assert!(view.slice(&empty).is_empty());
        assert_eq!(page_count(0, 5), 0);
    }

    #[test]
    fn slices_are_sized_by_page() {
        let items: Vec<i32> = (1..=7).collect();

        assert_eq!(paginate(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 2, 5), &[6, 7]);
        assert!(paginate(&items, 3, 5).is_empty());
    }

    #[test]
    fn independent_views_do_not_share_state() {
        let mut all_accounts = ListView::new(5);
        let mut picker = ListView::new(5);

        all_accounts.set_filter("cooper");
        picker.set_page(2, 7);

        assert_eq!(all_accounts.filter(), "cooper");
        assert_eq!(all_accounts.page(), 1);
        assert_eq!(picker.filter(), "");
        assert_eq!(picker.page(), 2);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(10, 5), 2);
        assert_eq!(page_count(11, 5), 3);
        assert_eq!(page_count(1, 5), 1);
    }
}
