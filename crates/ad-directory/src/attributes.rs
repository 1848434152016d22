//! Well-known Active Directory attribute values.

/// `userAccountControl` flags.
pub mod user_account_control {
    /// Account is disabled.
    pub const ACCOUNT_DISABLED: u32 = 0x0002;
    /// Default account type for a typical user.
    pub const NORMAL_ACCOUNT: u32 = 0x0200;
    /// Password never expires.
    pub const PASSWORD_NEVER_EXPIRES: u32 = 0x0001_0000;
}

/// `groupType` flags.
pub mod group_type {
    /// Group created by the system.
    pub const BUILTIN_LOCAL: u32 = 0x0000_0001;
    /// Global group.
    pub const GLOBAL: u32 = 0x0000_0002;
    /// Domain-local group.
    pub const DOMAIN_LOCAL: u32 = 0x0000_0004;
    /// Universal group.
    pub const UNIVERSAL: u32 = 0x0000_0008;
    /// APP_BASIC application group.
    pub const APP_BASIC: u32 = 0x0000_0010;
    /// APP_QUERY application group.
    pub const APP_QUERY: u32 = 0x0000_0020;
    /// Security group (distribution group when clear).
    pub const SECURITY_ENABLED: u32 = 0x8000_0000;
}

/// `sAMAccountType` values.
pub mod sam_account_type {
    /// Domain object.
    pub const DOMAIN_OBJECT: u32 = 0x0;
    /// Security group.
    pub const GROUP_OBJECT: u32 = 0x1000_0000;
    /// Distribution group.
    pub const NON_SECURITY_GROUP_OBJECT: u32 = 0x1000_0001;
    /// Security alias (domain-local group).
    pub const ALIAS_OBJECT: u32 = 0x2000_0000;
    /// Distribution alias.
    pub const NON_SECURITY_ALIAS_OBJECT: u32 = 0x2000_0001;
    /// User account.
    pub const USER_OBJECT: u32 = 0x3000_0000;
    /// Same as `USER_OBJECT`.
    pub const NORMAL_USER_ACCOUNT: u32 = 0x3000_0000;
    /// Computer account.
    pub const MACHINE_ACCOUNT: u32 = 0x3000_0001;
    /// Interdomain trust account.
    pub const TRUST_ACCOUNT: u32 = 0x3000_0002;
    /// APP_BASIC application group.
    pub const APP_BASIC_GROUP: u32 = 0x4000_0000;
    /// APP_QUERY application group.
    pub const APP_QUERY_GROUP: u32 = 0x4000_0001;
    /// Upper bound of the value range.
    pub const ACCOUNT_TYPE_MAX: u32 = 0x7fff_ffff;
}

/// Checks whether `flag` is set in `value`.
#[must_use]
pub const fn has_flag(value: u32, flag: u32) -> bool {
    value & flag == flag
}

/// Parses an integer attribute as AD stores it.
///
/// Group types are stored as signed 32-bit values, so `-2147483646` is a
/// global security group.
#[must_use]
pub fn parse_flags(text: &str) -> Option<u32> {
    let text = text.trim();
    text.parse::<u32>()
        .ok()
        .or_else(|| text.parse::<i32>().ok().map(|v| v as u32))
}
