//! Reward Gate - Rewarded-ad callback verification and entitlement granting
//!
//! Ad networks (AdMob, AppLovin, IronSource) call this service when a user
//! finishes a rewarded ad. Each callback is authenticated with the network's
//! signature scheme, processed at most once, and turned into a time-bounded
//! entitlement for the user.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
