pub mod companies;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use companies::{aggregate_companies, Company};

/// Canonical user record shared by every view of the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone: String,
    pub website: String,
    pub address: String,
}

/// Wire shape of a single record returned by the user API.
#[derive(Clone, Debug, Deserialize)]
pub struct RawUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub company: RawCompany,
    pub phone: String,
    pub website: String,
    pub address: RawAddress,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawCompany {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawAddress {
    pub street: String,
    pub city: String,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            email: raw.email,
            company_name: raw.company.name,
            phone: raw.phone,
            website: raw.website,
            address: format!("{}, {}", raw.address.street, raw.address.city),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("user payload does not match the expected schema: {source}")]
    Schema {
        #[source]
        source: serde_json::Error,
    },
}

pub fn normalize_records(records: Vec<RawUser>) -> Vec<User> {
    records.into_iter().map(User::from).collect()
}

/// Decodes a JSON array of raw records. Any record missing a required field
/// fails the whole batch.
pub fn decode_users(body: &str) -> Result<Vec<User>, DecodeError> {
    let records: Vec<RawUser> =
        serde_json::from_str(body).map_err(|e| DecodeError::Schema { source: e })?;
    Ok(normalize_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {"street": "Kulas Light", "suite": "Apt. 556", "city": "Gwenborough"},
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered"}
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "email": "Shanna@melissa.tv",
            "address": {"street": "Victor Plains", "city": "Wisokyburgh"},
            "phone": "010-692-6593 x09125",
            "website": "anastasia.net",
            "company": {"name": "Deckow-Crist"}
        }
    ]"#;

    #[test]
    fn decode_flattens_company_and_address() {
        let users = decode_users(PAYLOAD).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[0].company_name, "Romaguera-Crona");
        assert_eq!(users[0].address, "Kulas Light, Gwenborough");
        assert_eq!(users[1].name, "Ervin Howell");
        assert_eq!(users[1].website, "anastasia.net");
    }

    #[test]
    fn decode_rejects_record_without_company() {
        let body = r#"[{"id": 1, "name": "a", "email": "e", "phone": "p", "website": "w",
            "address": {"street": "s", "city": "c"}}]"#;
        let err = decode_users(body).unwrap_err();
        assert!(err.to_string().contains("company"));
    }

    #[test]
    fn decode_rejects_address_without_city() {
        let body = r#"[{"id": 1, "name": "a", "email": "e", "phone": "p", "website": "w",
            "company": {"name": "x"}, "address": {"street": "s"}}]"#;
        assert!(decode_users(body).is_err());
    }

    #[test]
    fn decode_rejects_non_array_body() {
        assert!(decode_users("<html>oops</html>").is_err());
        assert!(decode_users(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn user_serializes_with_camel_case_company_name() {
        let users = decode_users(PAYLOAD).unwrap();
        let json = serde_json::to_value(&users[0]).unwrap();
        assert_eq!(json["companyName"], "Romaguera-Crona");
        assert!(json.get("company_name").is_none());
    }
}
