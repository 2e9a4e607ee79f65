use std::sync::Arc;

use crate::directory::{Company, User};
use crate::output::{export_all_users, export_user, ExportDocument, ExportError, OutputFormat};
use crate::pagination::{self, Page, PageRequest, PaginationError};
use crate::query::{self, QueryResult, SortKey, SortState};
use crate::store::Snapshot;
use crate::view::{Tab, ViewState};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;

/// Directory UI state plus memoized derived views.
///
/// Inputs are changed only through the setters below. A setter that affects
/// the derived views drops the memo, which is rebuilt from the pure query
/// functions on the next read. The current page is reset to 1 when the
/// search term changes and is kept inside the active collection's page range.
#[derive(Clone, Debug)]
pub struct Session {
    snapshot: Arc<Snapshot>,
    search_term: String,
    sort: SortState,
    page: PageRequest,
    view: ViewState,
    derived: Option<QueryResult>,
}

impl Session {
    pub fn new(items_per_page: usize, view: ViewState) -> Result<Self, PaginationError> {
        Ok(Self {
            snapshot: Arc::new(Snapshot::default()),
            search_term: String::new(),
            sort: SortState::default(),
            page: PageRequest::new(1, items_per_page)?,
            view,
            derived: None,
        })
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.page.current_page()
    }

    pub fn items_per_page(&self) -> usize {
        self.page.items_per_page()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn set_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        if !Arc::ptr_eq(&self.snapshot, &snapshot) {
            self.snapshot = snapshot;
            self.invalidate();
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.page = self.page.with_page(1);
            self.invalidate();
        }
    }

    pub fn set_sort(&mut self, sort: SortState) {
        if sort != self.sort {
            self.sort = sort;
            self.invalidate();
        }
    }

    /// Header click on a sortable column.
    pub fn select_sort(&mut self, key: SortKey) {
        self.sort.select(key);
        self.invalidate();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.select_tab(tab);
        self.clamp_page();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = self.page.with_page(page);
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.go_to_page(pagination::next_page(self.current_page(), total));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(pagination::previous_page(self.current_page()));
    }

    fn invalidate(&mut self) {
        self.derived = None;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        self.page = self
            .page
            .with_page(pagination::clamp_page(self.current_page(), total));
    }

    pub fn query(&mut self) -> &QueryResult {
        let snapshot = &self.snapshot;
        let search_term = &self.search_term;
        let sort = self.sort;
        self.derived.get_or_insert_with(|| {
            query::run_query(&snapshot.users, &snapshot.companies, search_term, sort)
        })
    }

    /// Page count of the collection shown by the active tab.
    pub fn total_pages(&mut self) -> usize {
        let per_page = self.items_per_page();
        let tab = self.view.active_tab();
        let result = self.query();
        let len = match tab {
            Tab::Users => result.users.len(),
            Tab::Companies => result.companies.len(),
        };
        pagination::total_pages(len, per_page)
    }

    pub fn users_page(&mut self) -> Page<Arc<User>> {
        let request = self.page;
        pagination::paginate(&self.query().users, request)
    }

    pub fn companies_page(&mut self) -> Page<Company> {
        let request = self.page;
        pagination::paginate(&self.query().companies, request)
    }

    /// Row selection by id among the users the current search shows;
    /// returns the selected record when it is visible.
    pub fn select_user(&mut self, id: u64) -> Option<Arc<User>> {
        let user = self.query().users.iter().find(|u| u.id == id).cloned()?;
        self.view.select_user(Arc::clone(&user));
        Some(user)
    }

    pub fn close_user(&mut self) {
        self.view.close_user();
    }

    /// Exports the filtered and sorted users, ignoring pagination.
    pub fn export_all(&mut self, format: OutputFormat) -> Result<ExportDocument, ExportError> {
        export_all_users(&self.query().users, format)
    }

    pub fn export_selected(
        &self,
        format: OutputFormat,
    ) -> Result<Option<ExportDocument>, ExportError> {
        self.view
            .selected_user()
            .map(|user| export_user(user, format))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use crate::store::DirectoryStore;

    fn user(id: u64, name: &str, email: &str, company: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            company_name: company.to_string(),
            phone: String::new(),
            website: String::new(),
            address: String::new(),
        }
    }

    fn session_with(users: Vec<User>, per_page: usize) -> Session {
        let store = DirectoryStore::new();
        let mut session = Session::new(per_page, ViewState::default()).unwrap();
        session.set_snapshot(store.replace(users));
        session
    }

    fn ids(page: &Page<Arc<User>>) -> Vec<u64> {
        page.items.iter().map(|u| u.id).collect()
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(Session::new(0, ViewState::default()).is_err());
    }

    #[test]
    fn search_resets_page() {
        let users = (1..=12)
            .map(|i| user(i, &format!("user{i:02}"), &format!("u{i}@x.com"), "Acme"))
            .collect();
        let mut session = session_with(users, 5);
        session.go_to_page(3);
        assert_eq!(session.current_page(), 3);
        session.set_search_term("x.com");
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn page_is_clamped_when_collection_shrinks() {
        let users = (1..=12)
            .map(|i| user(i, &format!("user{i:02}"), &format!("u{i}@x.com"), "Acme"))
            .collect();
        let mut session = session_with(users, 5);
        session.go_to_page(3);
        let store = DirectoryStore::new();
        session.set_snapshot(store.replace(vec![user(1, "a", "a@x.com", "Acme")]));
        assert_eq!(session.current_page(), 1);
        assert_eq!(ids(&session.users_page()), vec![1]);
    }

    #[test]
    fn go_to_page_stays_in_range() {
        let users = (1..=7).map(|i| user(i, "n", "e", "c")).collect();
        let mut session = session_with(users, 5);
        session.go_to_page(10);
        assert_eq!(session.current_page(), 2);
        session.previous_page();
        session.previous_page();
        assert_eq!(session.current_page(), 1);
        session.next_page();
        session.next_page();
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn tab_switch_keeps_search_and_sort() {
        let users = vec![
            user(1, "Bob", "b@x.com", "Acme"),
            user(2, "Ann", "a@x.com", "Acme"),
        ];
        let mut session = session_with(users, 5);
        session.set_search_term("bob");
        session.select_sort(SortKey::Name);
        session.select_tab(Tab::Companies);
        assert_eq!(session.search_term(), "bob");
        assert_eq!(session.sort().direction, SortDirection::Desc);
        assert_eq!(session.total_pages(), 0, "no company matches 'bob'");
    }

    #[test]
    fn derived_views_follow_inputs() {
        let users = vec![
            user(1, "Bob", "b@x.com", "Acme"),
            user(2, "Ann", "a@x.com", "Acme"),
            user(3, "Cy", "c@y.com", "Zed"),
        ];
        let mut session = session_with(users, 2);
        assert_eq!(ids(&session.users_page()), vec![2, 1]);
        session.select_sort(SortKey::Name);
        assert_eq!(ids(&session.users_page()), vec![3, 1]);
        session.set_sort(SortState::unsorted());
        assert_eq!(ids(&session.users_page()), vec![1, 2]);
        let first = session.query().clone();
        assert_eq!(&first, session.query());
    }

    #[test]
    fn export_all_ignores_pagination() {
        let users = vec![
            user(1, "Bob", "b@x.com", "Acme"),
            user(2, "Ann", "a@x.com", "Acme"),
            user(3, "Cy", "c@y.com", "Zed"),
        ];
        let mut session = session_with(users, 1);
        session.set_search_term("x.com");
        let doc = session.export_all(OutputFormat::Text).unwrap();
        let text = String::from_utf8(doc.contents).unwrap();
        assert_eq!(text.matches("---------------------------").count(), 2);
        assert!(text.starts_with("ID: 2\nName: Ann\n"));
    }

    #[test]
    fn selected_user_export() {
        let mut session = session_with(vec![user(1, "Bob Stone", "b@x.com", "Acme")], 5);
        assert!(session.export_selected(OutputFormat::Text).unwrap().is_none());
        assert!(session.select_user(99).is_none());
        assert!(session.select_user(1).is_some());
        let doc = session.export_selected(OutputFormat::Text).unwrap().unwrap();
        assert_eq!(doc.filename, "user-1-bob-stone.txt");
        session.close_user();
        assert!(session.view().selected_user().is_none());
    }

    #[test]
    fn selection_is_limited_to_visible_users() {
        let users = vec![
            user(1, "Bob", "b@x.com", "Acme"),
            user(2, "Ann", "a@x.com", "Acme"),
        ];
        let mut session = session_with(users, 5);
        session.set_search_term("ann");
        assert!(session.select_user(1).is_none());
        assert!(session.view().selected_user().is_none());
        assert_eq!(session.select_user(2).map(|u| u.id), Some(2));
    }

    #[test]
    fn next_page_stops_on_empty_collection() {
        let mut session = session_with(Vec::new(), 5);
        session.next_page();
        assert_eq!(session.current_page(), 1);
    }
}
