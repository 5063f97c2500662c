//! Application-wide constants.

/// Free removals granted to a fresh identity.
pub const DEFAULT_FREE_QUOTA: u32 = 3;

/// Minimum wall-clock watch time before an advertisement view verifies.
pub const REQUIRED_AD_WATCH_MS: i64 = 30_000;

/// Largest dimension fed to the matte model; bigger inputs are scaled down.
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Storage key under which the per-device anonymous id is persisted.
pub const DEVICE_ID_KEY: &str = "device_id";
