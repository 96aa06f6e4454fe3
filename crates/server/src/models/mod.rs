//! Domain models for Lumeo.
//!
//! Validated domain objects, converted from raw database rows by the
//! repositories in [`crate::db`].

pub mod blog;
pub mod contact;
pub mod project;
pub mod template;
pub mod tracking;
pub mod user;

pub use blog::BlogPost;
pub use contact::Contact;
pub use project::{Project, ProjectSummary, Task};
pub use template::EmailTemplate;
pub use tracking::{ClientReport, Revenue, SeoRanking, WebsiteMetrics};
pub use user::{CurrentUser, User, session_keys};
