//! The read-only course catalog seam.

use stride_core::course::Course;
use stride_core::errors::NotFoundError;

/// A read-only, ordered course collection. The engine never mutates or
/// persists catalog data; ordering matters because equal-score
/// recommendations preserve catalog order.
pub trait CourseCatalog: Send + Sync {
    fn courses(&self) -> &[Course];

    fn find(&self, id: &str) -> Option<&Course> {
        self.courses().iter().find(|c| c.id == id)
    }

    fn require(&self, id: &str) -> Result<&Course, NotFoundError> {
        self.find(id).ok_or_else(|| NotFoundError::CourseNotFound {
            course_id: id.to_string(),
        })
    }
}

/// An in-memory catalog, typically deserialized from a host-supplied
/// JSON document.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    courses: Vec<Course>,
}

impl StaticCatalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Parse a JSON array of course records. Individual records that
    /// fail to deserialize (or carry no id) are skipped with a warning
    /// rather than failing the whole catalog; missing optional fields
    /// degrade to empty/zero.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut courses = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<Course>(value) {
                Ok(course) if !course.id.is_empty() => courses.push(course),
                Ok(_) => {
                    tracing::warn!("skipping catalog record with empty id");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed catalog record");
                }
            }
        }
        Ok(Self { courses })
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CourseCatalog for StaticCatalog {
    fn courses(&self) -> &[Course] {
        &self.courses
    }
}
