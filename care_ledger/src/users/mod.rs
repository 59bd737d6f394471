//! User accounts and caller identity.
//!
//! The ledger needs a thin slice of the marketplace's user management:
//! looking accounts up for payments and withdrawals, storing password hashes,
//! and describing the verified caller ([`Actor`]) that wallet operations
//! receive. Profile management lives elsewhere.

pub mod errors;
pub mod models;
pub mod password;
pub mod store;

pub use errors::{UserError, UserResult};
pub use models::{Actor, NewUser, UserAccount, UserId, UserType};
pub use store::UserStore;
