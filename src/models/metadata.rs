use serde::{Deserialize, Serialize};

// Identifying views persisted in the on-disk markers. Scalar fields come
// before nested ones so they serialize cleanly as TOML tables.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMetadata {
    pub id: u64,
    pub name: String,
    pub course: CourseMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    pub id: u64,
    pub name: String,
    pub language: String,
    pub course: CourseMetadata,
    pub category: CategoryMetadata,
}
