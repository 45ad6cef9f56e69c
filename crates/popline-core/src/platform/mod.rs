//! Platform capability resolution.

pub mod resolver;
pub mod types;

pub use resolver::{CAPABILITY_CACHE_TTL, CapabilityResolver, base_capabilities};
pub use types::{Platform, PlatformCapabilities, PlatformInfo};
