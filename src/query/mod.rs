use std::cmp::Ordering;
use std::sync::Arc;

use crate::directory::{Company, User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Email,
    CompanyName,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "company" | "companyname" | "company_name" => Some(Self::CompanyName),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::CompanyName => "company",
        }
    }

    fn value(self, user: &User) -> &str {
        match self {
            Self::Name => &user.name,
            Self::Email => &user.email,
            Self::CompanyName => &user.company_name,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Column sort selection for the user table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: Some(SortKey::Name),
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    pub fn unsorted() -> Self {
        Self {
            key: None,
            direction: SortDirection::Asc,
        }
    }

    /// Selecting the active column flips the direction; any other column
    /// becomes the key in ascending order.
    pub fn select(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Asc;
        }
    }

    /// Header indicator for a column: `Some(direction)` only on the active key.
    pub fn indicator(&self, key: SortKey) -> Option<SortDirection> {
        if self.key == Some(key) {
            Some(self.direction)
        } else {
            None
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn filter_users(users: &[Arc<User>], search_term: &str) -> Vec<Arc<User>> {
    let needle = search_term.to_lowercase();
    users
        .iter()
        .filter(|u| contains_ci(&u.name, &needle) || contains_ci(&u.email, &needle))
        .cloned()
        .collect()
}

pub fn sort_users(filtered: &[Arc<User>], sort: SortState) -> Vec<Arc<User>> {
    let mut out = filtered.to_vec();
    if let Some(key) = sort.key {
        // stable in both directions: ties keep their filtered order
        out.sort_by(|a, b| {
            let ordering = key
                .value(a)
                .to_lowercase()
                .cmp(&key.value(b).to_lowercase());
            sort.direction.apply(ordering)
        });
    }
    out
}

pub fn filter_companies(companies: &[Company], search_term: &str) -> Vec<Company> {
    let needle = search_term.to_lowercase();
    companies
        .iter()
        .filter(|c| contains_ci(&c.name, &needle))
        .cloned()
        .collect()
}

pub fn sort_companies(filtered: &[Company]) -> Vec<Company> {
    let mut out = filtered.to_vec();
    out.sort_by_cached_key(|c| c.name.to_lowercase());
    out
}

/// Filtered and sorted views over both collections for one set of inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub filtered_user_count: usize,
    pub filtered_company_count: usize,
    pub users: Vec<Arc<User>>,
    pub companies: Vec<Company>,
}

impl QueryResult {
    pub fn users_found_label(&self) -> String {
        let noun = if self.filtered_user_count == 1 {
            "user"
        } else {
            "users"
        };
        format!("{} {noun} found", self.filtered_user_count)
    }

    pub fn companies_found_label(&self) -> String {
        let noun = if self.filtered_company_count == 1 {
            "company"
        } else {
            "companies"
        };
        format!("{} {noun} found", self.filtered_company_count)
    }
}

pub fn run_query(
    users: &[Arc<User>],
    companies: &[Company],
    search_term: &str,
    sort: SortState,
) -> QueryResult {
    let filtered_users = filter_users(users, search_term);
    let filtered_companies = filter_companies(companies, search_term);
    QueryResult {
        filtered_user_count: filtered_users.len(),
        filtered_company_count: filtered_companies.len(),
        users: sort_users(&filtered_users, sort),
        companies: sort_companies(&filtered_companies),
    }
}
