use std::sync::Arc;

use crate::directory::{aggregate_companies, decode_users, User};
use crate::output::{export_user, OutputFormat};
use crate::pagination::{paginate, total_pages, PageRequest};
use crate::query::{filter_users, run_query, sort_users, SortDirection, SortKey, SortState};
use crate::session::Session;
use crate::store::DirectoryStore;
use crate::view::{Tab, ViewState};

fn record(id: u64, name: &str, email: &str, company: &str) -> User {
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

fn scenario_users() -> Vec<Arc<User>> {
    vec![
        Arc::new(record(1, "Bob", "b@x.com", "Acme")),
        Arc::new(record(2, "Ann", "a@x.com", "Acme")),
        Arc::new(record(3, "Cy", "c@y.com", "Zed")),
    ]
}

fn names(users: &[Arc<User>]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

fn many_users() -> Vec<Arc<User>> {
    let companies = ["Zed", "Acme", "Hoeger LLC", "acme", "Keebler"];
    (1..=23)
        .map(|i| {
            Arc::new(record(
                i,
                &format!("user {:02}", (i * 7) % 23),
                &format!("u{i}@{}.com", if i % 2 == 0 { "x" } else { "y" }),
                companies[(i as usize) % companies.len()],
            ))
        })
        .collect()
}

#[test]
fn scenario_aggregate_sort_filter_paginate() {
    let users = scenario_users();

    let companies = aggregate_companies(&users);
    let rollup: Vec<_> = companies
        .iter()
        .map(|c| (c.name.as_str(), c.user_count))
        .collect();
    assert_eq!(rollup, vec![("Acme", 2), ("Zed", 1)]);

    let sorted = sort_users(&users, SortState::default());
    assert_eq!(names(&sorted), vec!["Ann", "Bob", "Cy"]);

    let filtered = filter_users(&users, "x.com");
    assert_eq!(names(&filtered), vec!["Bob", "Ann"]);

    let result = run_query(&users, &companies, "", SortState::default());
    let first = paginate(&result.users, PageRequest::new(1, 2).unwrap());
    let second = paginate(&result.users, PageRequest::new(2, 2).unwrap());
    assert_eq!(names(&first.items), vec!["Ann", "Bob"]);
    assert_eq!(names(&second.items), vec!["Cy"]);
    assert_eq!(first.total_pages, 2);
}

#[test]
fn scenario_single_user_export() {
    let users = scenario_users();
    let doc = export_user(&users[0], OutputFormat::Text).unwrap();
    assert_eq!(doc.filename, "user-1-bob.txt");
    let text = String::from_utf8(doc.contents).unwrap();
    let labels: Vec<&str> = text
        .lines()
        .skip(2)
        .filter_map(|line| line.split_once(": ").map(|(label, _)| label))
        .collect();
    assert_eq!(
        labels,
        vec!["ID", "Name", "Email", "Company", "Phone", "Website", "Address"]
    );
}

#[test]
fn company_counts_sum_to_user_count() {
    let users = many_users();
    let companies = aggregate_companies(&users);
    let total: usize = companies.iter().map(|c| c.user_count).sum();
    assert_eq!(total, users.len());
    for company in &companies {
        assert_eq!(company.user_count, company.users.len());
    }
    // grouping is case-sensitive: "Acme" and "acme" are distinct
    assert!(companies.iter().any(|c| c.name == "acme"));
}

#[test]
fn filter_is_a_matching_subset() {
    let users = many_users();
    for term in ["", "x.com", "USER 1", "zzz", "u1"] {
        let filtered = filter_users(&users, term);
        let needle = term.to_lowercase();
        for user in &filtered {
            assert!(users.iter().any(|u| Arc::ptr_eq(u, user)));
            assert!(
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            );
        }
    }
}

#[test]
fn descending_reverses_unique_keys() {
    let users = many_users();
    for key in [SortKey::Name, SortKey::Email] {
        let asc = sort_users(
            &users,
            SortState {
                key: Some(key),
                direction: SortDirection::Asc,
            },
        );
        let mut desc = sort_users(
            &asc,
            SortState {
                key: Some(key),
                direction: SortDirection::Desc,
            },
        );
        desc.reverse();
        assert_eq!(desc, asc, "{key:?}");
    }
}

#[test]
fn ties_keep_input_order() {
    let users = many_users();
    let sorted = sort_users(
        &users,
        SortState {
            key: Some(SortKey::CompanyName),
            direction: SortDirection::Desc,
        },
    );
    for pair in sorted.windows(2) {
        if pair[0].company_name.to_lowercase() == pair[1].company_name.to_lowercase() {
            assert!(pair[0].id < pair[1].id);
        }
    }
}

#[test]
fn pipeline_is_idempotent() {
    let users = many_users();
    let companies = aggregate_companies(&users);
    let sort = SortState {
        key: Some(SortKey::Email),
        direction: SortDirection::Desc,
    };
    let a = run_query(&users, &companies, "x.com", sort);
    let b = run_query(&users, &companies, "x.com", sort);
    assert_eq!(a, b);
    let request = PageRequest::new(2, 3).unwrap();
    assert_eq!(paginate(&a.users, request), paginate(&b.users, request));
}

#[test]
fn pages_reproduce_sorted_collection() {
    let users = many_users();
    let sorted = sort_users(&users, SortState::default());
    for per_page in [1, 2, 5, 7, 23, 40] {
        let mut joined = Vec::new();
        for page in 1..=total_pages(sorted.len(), per_page) {
            joined.extend(paginate(&sorted, PageRequest::new(page, per_page).unwrap()).items);
        }
        assert_eq!(joined, sorted);
    }
}

#[test]
fn decoded_payload_flows_into_session() {
    let body = r#"[
        {"id":1,"name":"Leanne Graham","username":"Bret","email":"Sincere@april.biz",
         "address":{"street":"Kulas Light","suite":"Apt. 556","city":"Gwenborough"},
         "phone":"1-770-736-8031","website":"hildegard.org",
         "company":{"name":"Romaguera-Crona","catchPhrase":"x"}},
        {"id":2,"name":"Ervin Howell","email":"Shanna@melissa.tv",
         "address":{"street":"Victor Plains","city":"Wisokyburgh"},
         "phone":"010-692-6593","website":"anastasia.net",
         "company":{"name":"Deckow-Crist"}}
    ]"#;
    let users = decode_users(body).unwrap();
    assert_eq!(users[0].address, "Kulas Light, Gwenborough");

    let store = DirectoryStore::new();
    let mut session = Session::new(1, ViewState::new(1280, 768)).unwrap();
    session.set_snapshot(store.replace(users));
    session.select_tab(Tab::Companies);
    assert_eq!(session.total_pages(), 2);
    let page = session.companies_page();
    assert_eq!(page.items[0].name, "Deckow-Crist");
    assert!(session.view().sidebar_open());
}
