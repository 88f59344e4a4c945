use std::sync::Arc;

use quiz_core::model::InstructorProfile;
use storage::cells::instructor_from_rows;
use storage::layout::{INSTRUCTOR_DESCRIPTION, INSTRUCTOR_FIELDS};
use storage::{StorageError, TableStore};

/// Reads the instructor profile table.
#[derive(Clone)]
pub struct InstructorDirectory {
    tables: Arc<dyn TableStore>,
    table: String,
}

impl InstructorDirectory {
    #[must_use]
    pub fn new(tables: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            tables,
            table: table.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if either region of the table cannot be read.
    pub async fn load(&self) -> Result<InstructorProfile, StorageError> {
        let fields = self.tables.read_range(&self.table, INSTRUCTOR_FIELDS).await?;
        let description = self
            .tables
            .read_range(&self.table, INSTRUCTOR_DESCRIPTION)
            .await?;
        Ok(instructor_from_rows(&fields, &description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::NOT_SPECIFIED;
    use storage::InMemoryTableStore;

    fn column(cells: &[&str]) -> Vec<Vec<String>> {
        cells.iter().map(|c| vec![(*c).to_string()]).collect()
    }

    #[tokio::test]
    async fn reads_fields_and_description() {
        let store = InMemoryTableStore::new();
        store.ensure_table("Teacher").await.unwrap();
        store
            .write_range(
                "Teacher",
                INSTRUCTOR_FIELDS,
                column(&["Ada", "", "", "", "https://a.example/a.mp3", "", "", "", "ada@example.org"]),
            )
            .await
            .unwrap();
        store
            .write_range("Teacher", INSTRUCTOR_DESCRIPTION, column(&["Line one", "", "Line three"]))
            .await
            .unwrap();

        let profile = InstructorDirectory::new(Arc::new(store), "Teacher").load().await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.photo_url, None);
        assert_eq!(profile.audio_url.as_deref(), Some("https://a.example/a.mp3"));
        assert_eq!(profile.contacts, "ada@example.org");
        assert_eq!(profile.description, "Line one\n\nLine three");
    }

    #[tokio::test]
    async fn empty_table_uses_defaults() {
        let store = InMemoryTableStore::new();
        store.ensure_table("Teacher").await.unwrap();

        let profile = InstructorDirectory::new(Arc::new(store), "Teacher").load().await.unwrap();
        assert_eq!(profile.name, NOT_SPECIFIED);
        assert_eq!(profile.contacts, NOT_SPECIFIED);
        assert!(profile.description.is_empty());
        assert_eq!(profile.media().count(), 0);

        let missing = InstructorDirectory::new(Arc::new(InMemoryTableStore::new()), "Teacher");
        assert!(missing.load().await.is_err());
    }
}
