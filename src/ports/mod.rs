//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Verification Ports
//!
//! - `SignatureVerifier` - Per-network callback authentication
//! - `PublicKeySource` - AdMob verifier key set retrieval
//!
//! ## Storage Ports
//!
//! - `EntitlementsRepository` - `UserEntitlements` persistence
//! - `RewardConfigReader` - Reward durations and enablement
//! - `IdempotencyGuard` - At-most-once callback processing

mod entitlements_repository;
mod idempotency_guard;
mod public_key_source;
mod reward_config_reader;
mod signature_verifier;

pub use entitlements_repository::EntitlementsRepository;
pub use idempotency_guard::{ClaimOutcome, IdempotencyGuard, IdempotencyRecord};
pub use public_key_source::{PublicKeyEntry, PublicKeySource};
pub use reward_config_reader::RewardConfigReader;
pub use signature_verifier::SignatureVerifier;
