#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod constants;
pub mod permission;
pub mod principal;

pub use constants::{PERMISSIONS_CLAIM, ROLE_CLAIM};
pub use permission::{PermissionSet, parse_permission_claim};
pub use principal::{Claim, Principal, PrincipalBuilder};
