//! Re-exports of entity types under their conventional names.

pub use super::collection::Entity as Collection;
pub use super::link::Entity as Link;
pub use super::link_collection::Entity as LinkCollection;
pub use super::link_status::LinkStatus;
pub use super::run_mode::RunMode;
pub use super::sync_run::Entity as SyncRun;
pub use super::tag_source::TagSource;
pub use super::tag_suggestion::Entity as TagSuggestion;
