//! Request authorization: bearer extraction, token verification and role checks

mod gate;


pub use gate::{extract_bearer_token, AuthorizationGate, AuthorizationGateConfig, GateStage, BEARER_PREFIX};
