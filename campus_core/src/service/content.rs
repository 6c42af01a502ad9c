use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{CourseId, ItemId, SectionId},
};

#[derive(Debug, Error)]
pub enum ContentServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error("course not found")]
    CourseNotFound,

    #[error("section not found")]
    SectionNotFound,
}

impl From<ContentServiceError> for ServiceError {
    fn from(error: ContentServiceError) -> Self {
        match error {
            ContentServiceError::DbError(error) => ServiceError::infra(error),
            ContentServiceError::MissingField(_) => ServiceError::validation(error),
            ContentServiceError::CourseNotFound => ServiceError::not_found(error),
            ContentServiceError::SectionNotFound => ServiceError::not_found(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub link: String,
}

/// One section with its items, in the shape the course-content listing
/// returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContent {
    pub section: String,
    pub items: Vec<ItemView>,
}

#[derive(Clone)]
pub struct ContentService {
    db: DatabaseConnection,
}

impl ContentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_section(
        &self,
        course_id: CourseId,
        title: String,
        section_type: Option<String>,
    ) -> Result<SectionModel, ContentServiceError> {
        if title.trim().is_empty() {
            return Err(ContentServiceError::MissingField("section title"));
        }

        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();
        if !course_exists {
            return Err(ContentServiceError::CourseNotFound);
        }

        let section = SectionActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(title),
            section_type: Set(section_type.unwrap_or_else(|| "Lecture".to_string())),
        };

        let result = Section::insert(section).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    /// Attach a file, link, or slide to a section. Only the location string
    /// is stored; moving bytes around is the shell's business.
    pub async fn add_item(
        &self,
        section_id: SectionId,
        item_type: ItemType,
        name: String,
        link: String,
    ) -> Result<SectionItemModel, ContentServiceError> {
        if name.trim().is_empty() {
            return Err(ContentServiceError::MissingField("item name"));
        }
        if link.trim().is_empty() {
            return Err(ContentServiceError::MissingField("item link"));
        }

        let section_exists = Section::find_by_id(section_id)
            .one(&self.db)
            .await?
            .is_some();
        if !section_exists {
            return Err(ContentServiceError::SectionNotFound);
        }

        let item = SectionItemActiveModel {
            id: NotSet,
            section_id: Set(section_id),
            item_type: Set(item_type),
            name: Set(name),
            link: Set(link),
        };

        let result = SectionItem::insert(item)
            .exec_with_returning(&self.db)
            .await?;
        Ok(result)
    }

    /// All sections of a course with their items. Two queries and an
    /// in-memory grouping, never one query per section.
    pub async fn course_content(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<SectionContent>, ContentServiceError> {
        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();
        if !course_exists {
            return Err(ContentServiceError::CourseNotFound);
        }

        let sections = Section::find()
            .filter(SectionColumn::CourseId.eq(course_id))
            .order_by_asc(SectionColumn::Id)
            .all(&self.db)
            .await?;

        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let section_ids: Vec<SectionId> = sections.iter().map(|s| s.id).collect();
        let items = SectionItem::find()
            .filter(SectionItemColumn::SectionId.is_in(section_ids))
            .order_by_asc(SectionItemColumn::Id)
            .all(&self.db)
            .await?;

        let mut by_section: HashMap<SectionId, Vec<ItemView>> = HashMap::new();
        for item in items {
            by_section.entry(item.section_id).or_default().push(ItemView {
                id: item.id,
                item_type: item.item_type,
                name: item.name,
                link: item.link,
            });
        }

        Ok(sections
            .into_iter()
            .map(|s| SectionContent {
                section: s.title,
                items: by_section.remove(&s.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::AccountType;
    use crate::test_utils::{seed_course, seed_user, setup_test_db};

    async fn setup() -> (ContentService, CourseId) {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let course = seed_course(&db, 101, lecturer.id).await;
        (ContentService::new(db), course.id)
    }

    #[tokio::test]
    async fn test_create_section_defaults_to_lecture() {
        let (service, course_id) = setup().await;

        let section = service
            .create_section(course_id, "Week 1".into(), None)
            .await
            .unwrap();
        assert_eq!(section.section_type, "Lecture");

        let lab = service
            .create_section(course_id, "Lab".into(), Some("Practical".into()))
            .await
            .unwrap();
        assert_eq!(lab.section_type, "Practical");
    }

    #[tokio::test]
    async fn test_add_item_requires_section() {
        let (service, _course_id) = setup().await;

        let err = service
            .add_item(
                SectionId::new(999),
                ItemType::Link,
                "Syllabus".into(),
                "https://example.edu/syllabus".into(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContentServiceError::SectionNotFound));
    }

    #[tokio::test]
    async fn test_course_content_groups_items_by_section() {
        let (service, course_id) = setup().await;

        let s1 = service
            .create_section(course_id, "Week 1".into(), None)
            .await
            .unwrap();
        let s2 = service
            .create_section(course_id, "Week 2".into(), None)
            .await
            .unwrap();

        service
            .add_item(s1.id, ItemType::Slide, "Intro".into(), "slides/1.pdf".into())
            .await
            .unwrap();
        service
            .add_item(s1.id, ItemType::File, "Notes".into(), "uploads/notes.pdf".into())
            .await
            .unwrap();
        service
            .add_item(s2.id, ItemType::Link, "Reading".into(), "https://example.edu".into())
            .await
            .unwrap();

        let content = service.course_content(course_id).await.unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].section, "Week 1");
        assert_eq!(content[0].items.len(), 2);
        assert_eq!(content[1].items.len(), 1);

        // Wire shape: item type serializes under "type"
        let json = serde_json::to_value(&content[1].items[0]).unwrap();
        assert_eq!(json["type"], "link");
    }

    #[tokio::test]
    async fn test_content_of_missing_course() {
        let (service, _course_id) = setup().await;

        let err = service
            .course_content(CourseId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentServiceError::CourseNotFound));
    }
}
