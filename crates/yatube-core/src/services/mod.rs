//! Application services - the operations the HTTP layer drives.

mod accounts;
mod posts;

pub use accounts::AccountService;
pub use posts::{EditAccess, EditOutcome, GroupFeed, PostDetails, PostService, ProfileFeed};
