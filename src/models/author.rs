//! Author model and the free-text author list used by the book forms

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Maximum length of a first or last name column
pub const NAME_MAX_LEN: usize = 50;

/// Author row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

/// An author name as typed in a book form, before it is resolved to a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

impl AuthorName {
    /// Split on the first space: `"Ursula K. Le Guin"` becomes
    /// (`"Ursula"`, `"K. Le Guin"`). A single word has an empty last name.
    pub fn parse(name: &str) -> Self {
        match name.split_once(' ') {
            Some((first, last)) => Self {
                first_name: first.to_string(),
                last_name: last.to_string(),
            },
            None => Self {
                first_name: name.to_string(),
                last_name: String::new(),
            },
        }
    }

    pub fn fits_columns(&self) -> bool {
        self.first_name.chars().count() <= NAME_MAX_LEN
            && self.last_name.chars().count() <= NAME_MAX_LEN
    }
}

/// Parse the comma-separated `authors_input` field.
///
/// Blank entries are skipped and repeated names are kept once, in order of
/// first appearance.
pub fn parse_authors_input(input: &str) -> Vec<AuthorName> {
    let mut names: Vec<AuthorName> = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let name = AuthorName::parse(part);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Render authors back into the form field, e.g. `"Frank Herbert, Brian Herbert"`
pub fn format_authors_input(authors: &[Author]) -> String {
    authors
        .iter()
        .map(Author::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_name(first_name: &str, last_name: &str) -> String {
    if last_name.is_empty() {
        first_name.to_string()
    } else {
        format!("{} {}", first_name, last_name)
    }
}
