//! Resolution policy
//!
//! Two static tables steer resolution: which organizations may see the
//! headquarters programs, and which external ids stand in when name matching
//! comes up empty.

pub mod fallback;
pub mod organization;

pub use fallback::{FallbackPolicy, DEFAULT_SUB_CATEGORY_NAME, WILDCARD_PROGRAM};
pub use organization::{OrganizationPolicy, OrganizationType};
