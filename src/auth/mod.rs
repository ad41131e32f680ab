//! Authentication core: password hashing, token issuance and validation,
//! revocation, lockout tracking, and the orchestrator tying them together.

pub mod attempts;
pub mod audit;
pub mod clock;
pub mod error;
pub mod identity;
pub mod password;
pub mod revocation;
pub mod service;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;

pub use attempts::{AttemptPolicy, FailureOutcome, LoginAttemptTracker, spawn_pruner};
pub use audit::{AuditEvent, AuditKind, AuditSink, TracingAuditSink};
pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use identity::{Identity, IdentityStore, MemoryIdentityStore};
pub use password::PasswordHasher;
pub use revocation::{InMemoryRevocationStore, RevocationStore, spawn_sweeper};
pub use service::{AuthService, RefreshedAccess, TokenBundle};
pub use state::AuthConfig;
pub use storage::PgIdentityStore;
pub use token::{Claims, TokenCodec, TokenKind, MIN_SECRET_BYTES};
pub use types::ClientInfo;
