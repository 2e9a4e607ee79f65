use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::User;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub user_count: usize,
    pub users: Vec<Arc<User>>,
}

impl Company {
    fn first_member(user: Arc<User>) -> Self {
        Self {
            name: user.company_name.clone(),
            user_count: 1,
            users: vec![user],
        }
    }

    fn push(&mut self, user: Arc<User>) {
        self.users.push(user);
        self.user_count += 1;
    }
}

/// Groups users by company name. Companies come out in the order their
/// name is first seen in `users`.
pub fn aggregate_companies(users: &[Arc<User>]) -> Vec<Company> {
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();
    let mut companies: Vec<Company> = Vec::new();
    for user in users {
        match index_by_name.get(user.company_name.as_str()) {
            Some(&idx) => companies[idx].push(Arc::clone(user)),
            None => {
                index_by_name.insert(user.company_name.as_str(), companies.len());
                companies.push(Company::first_member(Arc::clone(user)));
            }
        }
    }
    companies
}
