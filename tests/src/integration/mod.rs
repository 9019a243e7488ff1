//! Cross-module integration tests over the public `dtnsec-db` API.

pub mod key_rotation;
pub mod matcher;
pub mod persistence;
pub mod policy_flows;
