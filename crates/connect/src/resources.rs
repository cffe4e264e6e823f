//! Resource-name to endpoint-path mapping.
//!
//! Screens address collections by short resource names; the backend routes
//! grew organically per Django app, so a few names need an explicit path.
//! Anything not listed maps to itself with a trailing slash.

use std::borrow::Cow;

/// Explicit resource-to-path entries. Paths are relative to `{base}/api/`
/// and keep the backend's trailing slash.
const RESOURCE_MAP: &[(&str, &str)] = &[
    ("vendors", "admin/vendors/"),
    ("customers", "admin/customers/"),
    ("orders", "order/list/"),
    ("vendor-products", "vendor/products/"),
    ("admin-products", "admin/products/"),
    ("cpu-benchmarks", "admin/cpu-benchmarks/"),
    ("gpu-benchmarks", "admin/gpu-benchmarks/"),
    ("activities", "admin/activities/"),
    ("applications", "admin/applications/"),
    ("requirements", "admin/requirements/"),
];

/// Endpoint path for a resource name, relative to `{base}/api/`.
pub fn endpoint_path(resource: &str) -> Cow<'static, str> {
    match RESOURCE_MAP.iter().find(|(name, _)| *name == resource) {
        Some((_, path)) => Cow::Borrowed(path),
        None => Cow::Owned(format!("{resource}/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_resources_use_their_entry() {
        assert_eq!(endpoint_path("vendors"), "admin/vendors/");
        assert_eq!(endpoint_path("orders"), "order/list/");
        assert_eq!(endpoint_path("gpu-benchmarks"), "admin/gpu-benchmarks/");
    }

    #[test]
    fn unmapped_resources_fall_back_to_name_with_trailing_slash() {
        assert_eq!(endpoint_path("products"), "products/");
        assert_eq!(endpoint_path("reviews"), "reviews/");
    }

    #[test]
    fn every_mapped_path_keeps_the_trailing_slash() {
        for (name, path) in RESOURCE_MAP {
            assert!(path.ends_with('/'), "{name} maps to {path}");
        }
    }
}
