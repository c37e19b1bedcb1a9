/// Claim type carrying the principal's permissions as a comma-separated list.
pub const PERMISSIONS_CLAIM: &str = "Permissions";

/// Claim type carrying a single role. A principal may carry several.
pub const ROLE_CLAIM: &str = "role";

/// Separator used inside the permissions claim value.
pub const PERMISSION_SEPARATOR: char = ',';
