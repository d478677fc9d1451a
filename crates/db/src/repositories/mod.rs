//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod skill_repo;
pub mod user_repo;

pub use skill_repo::SkillRepo;
pub use user_repo::UserRepo;
