//! Property-based tests for the manifest line codec and manifest
//! serialization.
//!
//! These tests use proptest to generate random entries and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::entry::{LineCodec, ManifestEntry};
    use crate::manifest::Manifest;
    use crate::testing::FakeRepository;
    use proptest::prelude::*;

    fn directory() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_.-]{0,15}"
    }

    fn identity() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z][a-z0-9-]{0,10}/[a-z][a-z0-9_.-]{0,10}")
    }

    fn sha() -> impl Strategy<Value = String> {
        "[0-9a-f]{7,40}"
    }

    fn tags() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z0-9][a-z0-9.-]{0,8}", 0..3)
    }

    fn entry() -> impl Strategy<Value = ManifestEntry> {
        (identity(), directory(), sha(), tags()).prop_map(|(repository, dir, sha, tags)| {
            ManifestEntry::new(repository, dir, sha).with_tags(tags)
        })
    }

    proptest! {
        /// Property: decoding an encoded entry gives the same entry back
        #[test]
        fn encoded_entries_decode_unchanged(entry in entry()) {
            let codec = LineCodec::new().unwrap();
            let line = codec.encode(&entry);
            let decoded = codec.decode(&line).unwrap();
            prop_assert_eq!(decoded, entry);
        }

        /// Property: encoding is stable after one decode
        #[test]
        fn encoding_is_stable(entry in entry()) {
            let codec = LineCodec::new().unwrap();
            let once = codec.encode(&entry);
            let twice = codec.encode(&codec.decode(&once).unwrap());
            prop_assert_eq!(once, twice);
        }

        /// Property: the legacy `org/repo (dir) @ sha` form decodes to the
        /// same entry as the current form
        #[test]
        fn legacy_syntax_matches_current(
            repository in "[a-z][a-z0-9-]{0,10}/[a-z][a-z0-9_.-]{0,10}",
            dir in directory(),
            sha in sha(),
        ) {
            let codec = LineCodec::new().unwrap();
            let legacy = codec.decode(&format!("{} ({}) @ {}", repository, dir, sha)).unwrap();
            let current = codec.decode(&format!("[{}] {}@{}", dir, repository, sha)).unwrap();
            prop_assert_eq!(legacy, current);
        }

        /// Property: lines without an `@` are never accepted
        #[test]
        fn lines_without_commit_are_rejected(line in "[^@#]*") {
            let codec = LineCodec::new().unwrap();
            prop_assert!(codec.decode(&line).is_err());
        }

        /// Property: the file form does not depend on the order in which
        /// repositories were added
        #[test]
        fn file_form_ignores_insertion_order(
            (dirs, shuffled) in proptest::collection::hash_set("[a-z]{1,8}", 1..6)
                .prop_map(|set| set.into_iter().collect::<Vec<_>>())
                .prop_flat_map(|dirs| (Just(dirs.clone()), Just(dirs).prop_shuffle()))
        ) {
            let build = |order: &[String]| {
                let mut manifest = Manifest::new();
                for (index, dir) in order.iter().enumerate() {
                    let repository = FakeRepository::new(&format!("/src/{}", dir))
                        .with_commit(&format!("{:040x}", index), "commit")
                        .into_handle();
                    manifest.add_repository(repository).unwrap();
                }
                manifest
            };

            let first = build(&dirs).to_file_string();
            let second = build(&shuffled).to_file_string();

            let directories = |text: &str| -> Vec<String> {
                text.lines()
                    .map(|line| ManifestEntry::parse(line).unwrap().directory)
                    .collect()
            };
            let mut sorted = dirs.clone();
            sorted.sort();
            prop_assert_eq!(directories(&first), sorted.clone());
            prop_assert_eq!(directories(&second), sorted);
        }
    }
}
