//! Property-based tests for path identity.
//!
//! These tests use proptest to generate random search paths and verify that
//! decomposition and fingerprinting hold their invariants for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::identity::{fingerprint, RootPrefixes, FINGERPRINT_LEN};
    use crate::mirror::mirror_location;
    use proptest::prelude::*;
    use std::path::Path;

    fn roots() -> RootPrefixes {
        RootPrefixes::new(["/site/packages/int/", "/site/packages/ext"])
    }

    // ============================================================================
    // fingerprint property tests
    // ============================================================================

    proptest! {
        /// Property: fingerprint is deterministic (same input = same output)
        #[test]
        fn fingerprint_is_deterministic(input in ".*") {
            prop_assert_eq!(fingerprint(&input), fingerprint(&input));
        }

        /// Property: fingerprint is always FINGERPRINT_LEN lowercase hex characters
        #[test]
        fn fingerprint_is_short_lowercase_hex(input in ".*") {
            let result = fingerprint(&input);
            prop_assert_eq!(result.len(), FINGERPRINT_LEN);
            prop_assert!(
                result.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
                "fingerprint '{}' is not lowercase hex",
                result
            );
        }
    }

    // ============================================================================
    // decompose property tests
    // ============================================================================

    proptest! {
        /// Property: a path under a root yields its first segment as package
        /// and the rest as remainder
        #[test]
        fn decompose_under_root_reassembles(
            package in "[a-zA-Z0-9_.-]{1,12}",
            rest in prop::collection::vec("[a-zA-Z0-9_.-]{1,8}", 0..4),
        ) {
            let remainder: String = rest.iter().map(|seg| format!("/{}", seg)).collect();
            let path = format!("/site/packages/int/{}{}", package, remainder);

            let id = roots().decompose(&path);
            prop_assert_eq!(&id.root_prefix, "/site/packages/int/");
            prop_assert_eq!(&id.package_name, &package);
            prop_assert_eq!(&id.remainder, &remainder);
        }

        /// Property: a path outside every root falls back to its basename
        #[test]
        fn decompose_outside_roots_uses_basename(
            segments in prop::collection::vec("[a-z0-9_]{1,8}", 1..5),
        ) {
            let path = format!("/opt/{}", segments.join("/"));

            let id = roots().decompose(&path);
            prop_assert_eq!(id.root_prefix, "");
            prop_assert_eq!(id.remainder, "");
            prop_assert_eq!(Some(id.package_name.as_str()), segments.last().map(String::as_str));
        }

        /// Property: decompose never panics and never returns a package
        /// containing a separator
        #[test]
        fn decompose_package_has_no_separator(input in ".*") {
            let id = roots().decompose(&input);
            prop_assert!(!id.package_name.contains('/'));
        }

        /// Property: the mirror location is root/package/fingerprint
        #[test]
        fn mirror_location_shape(
            package in "[a-z0-9_]{1,12}",
            version in "[0-9]{1,2}\\.[0-9]{1,2}",
        ) {
            let path = format!("/site/packages/int/{}/{}/python", package, version);
            let location = mirror_location(Path::new("/ws/includes"), &path, &roots());
            prop_assert_eq!(
                location,
                Path::new("/ws/includes").join(&package).join(fingerprint(&path))
            );
        }
    }
}
