use std::collections::BTreeMap;
use std::path::Path;

use proptest::prelude::*;
use sk::updater::fingerprint;
use tempfile::tempdir;

/// Write `root_files` at the root and `sub_files` under `deep.d/`,
/// optionally in reverse insertion order. The subdirectory name cannot
/// collide with generated names (`.` is outside the name alphabet).
fn write_tree(
    root: &Path,
    root_files: &BTreeMap<String, Vec<u8>>,
    sub_files: &BTreeMap<String, Vec<u8>>,
    reversed: bool,
) {
    let write_all = |dir: &Path, files: &BTreeMap<String, Vec<u8>>| {
        std::fs::create_dir_all(dir).unwrap();
        let entries: Vec<_> = if reversed {
            files.iter().rev().collect()
        } else {
            files.iter().collect()
        };
        for (name, content) in entries {
            std::fs::write(dir.join(name), content).unwrap();
        }
    };
    write_all(root, root_files);
    if !sub_files.is_empty() {
        write_all(&root.join("deep.d"), sub_files);
    }
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn files_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    proptest::collection::btree_map(
        name_strategy(),
        proptest::collection::vec(any::<u8>(), 0..64),
        0..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fingerprint_is_independent_of_write_order(
        root_files in files_strategy(),
        sub_files in files_strategy(),
    ) {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        write_tree(a.path(), &root_files, &sub_files, false);
        write_tree(b.path(), &root_files, &sub_files, true);

        let first = fingerprint(a.path()).unwrap();
        let second = fingerprint(b.path()).unwrap();
        prop_assert_eq!(&first, &second);

        // and stable across repeated runs over the same tree
        prop_assert_eq!(&first, &fingerprint(a.path()).unwrap());
    }

    #[test]
    fn added_file_always_changes_fingerprint(
        root_files in files_strategy(),
        extra in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let dir = tempdir().unwrap();
        write_tree(dir.path(), &root_files, &BTreeMap::new(), false);
        let before = fingerprint(dir.path()).unwrap();

        // `.` is outside the generated name alphabet, so no collision
        std::fs::write(dir.path().join("extra.x"), &extra).unwrap();
        let after = fingerprint(dir.path()).unwrap();
        prop_assert_ne!(before, after);
    }

    #[test]
    fn changed_content_always_changes_fingerprint(
        root_files in files_strategy(),
        name in name_strategy(),
        content in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let dir = tempdir().unwrap();
        write_tree(dir.path(), &root_files, &BTreeMap::new(), false);
        std::fs::write(dir.path().join(&name), &content).unwrap();
        let before = fingerprint(dir.path()).unwrap();

        let mut flipped = content.clone();
        flipped[0] ^= 0xff;
        std::fs::write(dir.path().join(&name), &flipped).unwrap();
        let after = fingerprint(dir.path()).unwrap();
        prop_assert_ne!(before, after);
    }
}
