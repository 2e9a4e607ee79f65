use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::{ExportError, OutputFormat};
use crate::directory::User;

pub const BULK_EXPORT_STEM: &str = "user-directory-export";
const SINGLE_HEADER: &str = "User Details\n===========\n";
const BLOCK_DIVIDER: &str = "---------------------------";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub contents: Vec<u8>,
}

fn unsafe_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\s/\\:*?"<>|\x00-\x1f]+"#).unwrap())
}

/// Lowercased name with every run of whitespace, path separators or other
/// characters not allowed in file names collapsed to a single `-`.
pub fn name_slug(name: &str) -> String {
    unsafe_runs()
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

pub fn user_export_filename(user: &User, format: OutputFormat) -> String {
    format!(
        "user-{}-{}.{}",
        user.id,
        name_slug(&user.name),
        format.extension()
    )
}

fn push_fields(out: &mut String, user: &User) {
    let fields = [
        ("ID", user.id.to_string()),
        ("Name", user.name.clone()),
        ("Email", user.email.clone()),
        ("Company", user.company_name.clone()),
        ("Phone", user.phone.clone()),
        ("Website", user.website.clone()),
        ("Address", user.address.clone()),
    ];
    for (label, value) in fields {
        out.push_str(label);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
}

pub fn render_user_text(user: &User) -> Vec<u8> {
    let mut out = String::from(SINGLE_HEADER);
    push_fields(&mut out, user);
    out.into_bytes()
}

pub fn render_users_text(users: &[Arc<User>]) -> Vec<u8> {
    let blocks: Vec<String> = users
        .iter()
        .map(|u| {
            let mut block = String::new();
            push_fields(&mut block, u);
            block.push_str(BLOCK_DIVIDER);
            block
        })
        .collect();
    blocks.join("\n\n").into_bytes()
}

pub fn export_user(user: &User, format: OutputFormat) -> Result<ExportDocument, ExportError> {
    let contents = match format {
        OutputFormat::Text => render_user_text(user),
        OutputFormat::Json => serde_json::to_vec_pretty(user)
            .map_err(|e| ExportError::Serialize { source: e })?,
    };
    Ok(ExportDocument {
        filename: user_export_filename(user, format),
        contents,
    })
}

/// Exports the sorted, unpaginated user list.
pub fn export_all_users(
    sorted_users: &[Arc<User>],
    format: OutputFormat,
) -> Result<ExportDocument, ExportError> {
    let contents = match format {
        OutputFormat::Text => render_users_text(sorted_users),
        OutputFormat::Json => serde_json::to_vec_pretty(sorted_users)
            .map_err(|e| ExportError::Serialize { source: e })?,
    };
    Ok(ExportDocument {
        filename: format!("{BULK_EXPORT_STEM}.{}", format.extension()),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> User {
        User {
            id: 1,
            name: "Bob".to_string(),
            email: "b@x.com".to_string(),
            company_name: "Acme".to_string(),
            phone: "555-0100".to_string(),
            website: "bob.dev".to_string(),
            address: "Main St, Springfield".to_string(),
        }
    }

    #[test]
    fn single_export_layout_and_filename() {
        let doc = export_user(&bob(), OutputFormat::Text).unwrap();
        assert_eq!(doc.filename, "user-1-bob.txt");
        let text = String::from_utf8(doc.contents).unwrap();
        assert_eq!(
            text,
            "User Details\n===========\nID: 1\nName: Bob\nEmail: b@x.com\nCompany: Acme\n\
             Phone: 555-0100\nWebsite: bob.dev\nAddress: Main St, Springfield\n"
        );
    }

    #[test]
    fn slug_collapses_whitespace_runs() {
        assert_eq!(name_slug("Mrs.  Dennis\tSchulist"), "mrs.-dennis-schulist");
        assert_eq!(name_slug("AC/DC  Fan"), "ac-dc-fan");
        assert_eq!(name_slug(r#"a\b:c*d?e"f<g>h|i"#), "a-b-c-d-e-f-g-h-i");
        let mut user = bob();
        user.id = 42;
        user.name = "Clementine Bauch".to_string();
        assert_eq!(
            user_export_filename(&user, OutputFormat::Json),
            "user-42-clementine-bauch.json"
        );
    }

    #[test]
    fn bulk_export_blocks_and_dividers() {
        let mut ann = bob();
        ann.id = 2;
        ann.name = "Ann".to_string();
        let users = vec![Arc::new(ann), Arc::new(bob())];
        let doc = export_all_users(&users, OutputFormat::Text).unwrap();
        assert_eq!(doc.filename, "user-directory-export.txt");
        let text = String::from_utf8(doc.contents).unwrap();
        let blocks: Vec<_> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("ID: 2\nName: Ann\n"));
        assert!(blocks[1].starts_with("ID: 1\nName: Bob\n"));
        for block in blocks {
            assert!(block.ends_with("Address: Main St, Springfield\n---------------------------"));
        }
    }

    #[test]
    fn bulk_export_of_nothing_is_empty() {
        let doc = export_all_users(&[], OutputFormat::Text).unwrap();
        assert!(doc.contents.is_empty());
    }

    #[test]
    fn exports_are_deterministic() {
        let users = vec![Arc::new(bob())];
        assert_eq!(
            export_all_users(&users, OutputFormat::Text).unwrap(),
            export_all_users(&users, OutputFormat::Text).unwrap()
        );
        assert_eq!(
            export_user(&bob(), OutputFormat::Json).unwrap(),
            export_user(&bob(), OutputFormat::Json).unwrap()
        );
    }

    #[test]
    fn json_bulk_export_uses_wire_names() {
        let users = vec![Arc::new(bob())];
        let doc = export_all_users(&users, OutputFormat::Json).unwrap();
        assert_eq!(doc.filename, "user-directory-export.json");
        let value: serde_json::Value = serde_json::from_slice(&doc.contents).unwrap();
        assert_eq!(value[0]["companyName"], "Acme");
    }
}
