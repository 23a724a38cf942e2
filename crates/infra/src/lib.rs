//! Infrastructure layer: persistence adapters and store-error translation.

pub mod store;
pub mod translate;

pub use store::{
    CourseFilter, CourseStore, CourseWithOwner, InMemoryDatabase, OwnerSummary, PostgresStore,
    StoreError, UserStore, UserStoreLookup,
};
pub use translate::{translate, ValidationFailure};
