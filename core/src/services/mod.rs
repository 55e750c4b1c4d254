//! Business services containing domain logic and use cases.

pub mod authorization;
pub mod clock;
pub mod credentials;
pub mod keys;
pub mod token;

// Re-export commonly used types
pub use authorization::{AuthorizationGate, AuthorizationGateConfig, GateStage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{CredentialCheck, CredentialValidator};
pub use keys::{KeyManager, KeyManagerConfig, KeyRefreshTask, KeySnapshot, SecretSource};
pub use token::{TokenService, TokenServiceConfig};
