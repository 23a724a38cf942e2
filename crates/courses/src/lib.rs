//! `coursehub-courses`: the Course entity and its field rules.

pub mod course;

pub use course::{Course, CourseChanges, CourseDraft, NewCourse};
