use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use coursehub_auth::{AccountDraft, Principal};
use coursehub_core::{CourseId, UserId};
use coursehub_courses::{Course, CourseChanges, CourseDraft};

use super::r#trait::{
    CourseFilter, CourseStore, CourseWithOwner, OwnerSummary, StoreError, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, Principal>,
    courses: BTreeMap<CourseId, Course>,
    last_user_id: i64,
    last_course_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|u| u.email_address == email)
    }
}

/// In-memory users + courses tables.
///
/// Intended for tests/dev. Same contract as the Postgres store: sequential
/// ids and unique emails.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, operation: &'static str, f: impl FnOnce(&Tables) -> T) -> Result<T, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))?;
        Ok(f(&tables))
    }

    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))?;
        f(&mut tables)
    }
}

#[async_trait]
impl UserStore for InMemoryDatabase {
    async fn create_user(&self, draft: AccountDraft) -> Result<UserId, StoreError> {
        let account = draft.validate()?;
        self.write("create_user", |t| {
            if t.email_taken(&account.email_address) {
                return Err(StoreError::email_in_use());
            }
            t.last_user_id += 1;
            let id = UserId::new(t.last_user_id);
            let now = Utc::now();
            t.users.insert(
                id,
                Principal {
                    id,
                    first_name: account.first_name,
                    last_name: account.last_name,
                    email_address: account.email_address,
                    password_hash: account.password_hash,
                    created_at: now,
                    updated_at: now,
                },
            );
            tracing::debug!(user_id = %id, "user created");
            Ok(id)
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        self.read("find_user_by_email", |t| {
            t.users.values().find(|u| u.email_address == email).cloned()
        })
    }
}

#[async_trait]
impl CourseStore for InMemoryDatabase {
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseId, StoreError> {
        let course = draft.validate()?;
        self.write("create_course", |t| {
            if !t.users.contains_key(&course.user_id) {
                return Err(StoreError::backend(
                    "create_course",
                    format!("owner {} does not exist", course.user_id),
                ));
            }
            t.last_course_id += 1;
            let id = CourseId::new(t.last_course_id);
            let now = Utc::now();
            t.courses.insert(
                id,
                Course {
                    id,
                    title: course.title,
                    description: course.description,
                    estimated_time: course.estimated_time,
                    materials_needed: course.materials_needed,
                    user_id: course.user_id,
                    created_at: now,
                    updated_at: now,
                },
            );
            tracing::debug!(course_id = %id, "course created");
            Ok(id)
        })
    }

    async fn find_courses(&self, filter: CourseFilter) -> Result<Vec<CourseWithOwner>, StoreError> {
        self.read("find_courses", |t| {
            t.courses
                .values()
                .filter(|c| filter.matches(c))
                .map(|c| {
                    let owner = t.users.get(&c.user_id).ok_or_else(|| {
                        StoreError::backend("find_courses", format!("course {} has no owner", c.id))
                    })?;
                    Ok(CourseWithOwner {
                        course: c.clone(),
                        owner: OwnerSummary::from(owner),
                    })
                })
                .collect::<Result<Vec<_>, StoreError>>()
        })?
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        self.read("find_course", |t| t.courses.get(&id).cloned())
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError> {
        self.write("update_course", |t| {
            let stored = t.courses.get_mut(&id).ok_or(StoreError::NotFound)?;
            // Validate against a copy so a rejected update leaves the row intact.
            let mut updated = stored.clone();
            updated.apply(changes, Utc::now())?;
            *stored = updated.clone();
            Ok(updated)
        })
    }

    async fn destroy_course(&self, id: CourseId) -> Result<(), StoreError> {
        self.write("destroy_course", |t| {
            t.courses.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
        })
    }
}
