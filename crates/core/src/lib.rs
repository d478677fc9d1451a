//! Domain types and pure logic shared by every SkillTrack crate.
//!
//! Nothing in here touches the database, the network, or the clock; callers
//! pass `now` explicitly so rule evaluation stays deterministic under test.

pub mod error;
pub mod notification_rules;
pub mod skill;
pub mod summary;
pub mod types;
