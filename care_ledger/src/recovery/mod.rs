//! Password-recovery throttle.
//!
//! Email-keyed one-time codes with three guards:
//! - codes expire 15 minutes after issue,
//! - an email gets at most 3 codes per rolling hour,
//! - a code dies after 5 verification attempts, right or wrong.
//!
//! Issuing a new code invalidates the email's previous unused ones, so at
//! most one code is ever live per email. Verification proves possession but
//! never consumes the code; the caller marks it used once the password has
//! actually been changed.

pub mod errors;
pub mod models;
pub mod throttle;

pub use errors::{RecoveryError, RecoveryResult};
pub use models::{IssuedCode, ResetClaim, ResetId};
pub use throttle::ResetThrottle;
