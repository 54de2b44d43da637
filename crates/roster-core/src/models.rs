//! Data models for Roster
//!
//! Defines the core data structures: Student, StoredStudent, and the
//! orderings the store can be queried in.
//! Field names follow the remote directory API so records deserialize as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest id handed out to locally created students
///
/// Keeps local ids clear of the small ids served by the remote directory.
pub const LOCAL_ID_FLOOR: i64 = 10_000;

/// Number of stock avatar images available for local students
const AVATAR_VARIANTS: i64 = 12;

/// A student record
///
/// Identity is `id`: two students are the same record iff their ids match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    /// Unique identifier (remote ids are kept as-is)
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Avatar image URI
    pub avatar: String,
}

impl Student {
    /// Create a student with the given id
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: String::new(),
        }
    }

    /// Set the avatar URI
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Pick one of the stock avatars under `base`, derived from the id
    pub fn with_default_avatar(self, base: &str) -> Self {
        let n = self.id.rem_euclid(AVATAR_VARIANTS) + 1;
        let avatar = format!("{}/{}-image.jpg", base.trim_end_matches('/'), n);
        self.with_avatar(avatar)
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check the fields a user must fill in when adding a student
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("last_name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// A student as persisted, with its insertion position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredStudent {
    #[serde(flatten)]
    pub student: Student,
    /// Stamped on first insert; only meaningful for [`SortOrder::Insertion`]
    pub sort_order: i64,
}

impl StoredStudent {
    pub fn id(&self) -> i64 {
        self.student.id
    }

    pub fn into_student(self) -> Student {
        self.student
    }
}

/// Ordering for store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Order in which students were first inserted
    #[default]
    Insertion,
    /// By "first last" name
    Name,
}

impl SortOrder {
    /// SQL `ORDER BY` clause for this ordering
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            SortOrder::Insertion => "sort_order ASC, id ASC",
            SortOrder::Name => "first_name || ' ' || last_name ASC, id ASC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Insertion => write!(f, "insertion"),
            SortOrder::Name => write!(f, "name"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insertion" | "default" => Ok(SortOrder::Insertion),
            "name" => Ok(SortOrder::Name),
            other => Err(format!(
                "Unknown sort order '{}'. Use 'insertion' or 'name'.",
                other
            )),
        }
    }
}

/// Result of a successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Everything the remote returned, including ids already stored
    pub fetched: Vec<Student>,
    /// How many fetched students were new to the store
    pub added_count: usize,
}

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_new() {
        let student = Student::new(7, "Ada", "Lovelace", "ada@example.com");
        assert_eq!(student.id, 7);
        assert_eq!(student.full_name(), "Ada Lovelace");
        assert!(student.avatar.is_empty());
    }

    #[test]
    fn test_default_avatar() {
        let student = Student::new(11, "A", "B", "a@b.c").with_default_avatar("https://x.test/img/");
        assert_eq!(student.avatar, "https://x.test/img/12-image.jpg");

        let student = Student::new(12, "A", "B", "a@b.c").with_default_avatar("https://x.test/img");
        assert_eq!(student.avatar, "https://x.test/img/1-image.jpg");
    }

    #[test]
    fn test_validate() {
        assert!(Student::new(1, "Ada", "Lovelace", "ada@example.com")
            .validate()
            .is_ok());
        assert_eq!(
            Student::new(1, " ", "Lovelace", "ada@example.com").validate(),
            Err(ValidationError::MissingField("first_name"))
        );
        assert_eq!(
            Student::new(1, "Ada", "", "ada@example.com").validate(),
            Err(ValidationError::MissingField("last_name"))
        );
        assert_eq!(
            Student::new(1, "Ada", "Lovelace", "").validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert!(matches!(
            Student::new(1, "Ada", "Lovelace", "not-an-email").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("name".parse::<SortOrder>().unwrap(), SortOrder::Name);
        assert_eq!("Insertion".parse::<SortOrder>().unwrap(), SortOrder::Insertion);
        assert!("size".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Insertion);
    }

    #[test]
    fn test_stored_student_serializes_flat() {
        let stored = StoredStudent {
            student: Student::new(3, "Emma", "Wong", "emma@example.com"),
            sort_order: 4,
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["sort_order"], 4);
        assert_eq!(value["first_name"], "Emma");
    }
}
