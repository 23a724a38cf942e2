//! Relational store boundary for users and courses.
//!
//! Handlers only see the [`UserStore`] and [`CourseStore`] traits; which
//! backend sits behind them is decided once, at startup.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDatabase;
pub use postgres::PostgresStore;
pub use r#trait::{
    CourseFilter, CourseStore, CourseWithOwner, EMAIL_IN_USE, OwnerSummary, StoreError, UserStore,
    UserStoreLookup,
};
