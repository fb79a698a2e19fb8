pub mod bulk_action;
pub mod user;

pub use bulk_action::{ActorRef, BulkAction, TargetIds};
pub use user::{User, UserListing, UserProfile, UserStatus};
