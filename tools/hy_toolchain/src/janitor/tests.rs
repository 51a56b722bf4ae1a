use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_remove_if_exists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.s");
    fs::write(&path, "ret").unwrap();

    assert!(remove_if_exists(&path).unwrap());
    assert!(!path.exists());
    assert!(!remove_if_exists(&path).unwrap());
}

#[test]
fn test_cleanup_reports_only_removed_files() {
    let dir = tempdir().unwrap();
    let asm = dir.path().join("out.s");
    let llvm = dir.path().join("out.ll");
    let exe = dir.path().join("test_bin");
    fs::write(&llvm, "define i32 @main()").unwrap();
    fs::write(&exe, "").unwrap();

    let removed = cleanup([&asm, &llvm, &exe]);

    assert_eq!(removed, vec![llvm.clone(), exe.clone()]);
    assert!(!asm.exists() && !llvm.exists() && !exe.exists());
}

#[test]
fn test_cleanup_skips_undeletable_entries() {
    let dir = tempdir().unwrap();
    // A directory cannot be removed with remove_file.
    let stuck = dir.path().join("out.ll");
    fs::create_dir(&stuck).unwrap();
    let exe = dir.path().join("test_bin");
    fs::write(&exe, "").unwrap();

    let removed = cleanup([&stuck, &exe]);

    assert_eq!(removed, vec![exe]);
    assert!(stuck.exists());
}

#[test]
fn test_guard_cleans_on_drop() {
    let dir = tempdir().unwrap();
    let asm = dir.path().join("out.s");
    fs::write(&asm, "").unwrap();

    {
        let _guard = CleanupGuard::new([&asm]);
        assert!(asm.exists());
    }

    assert!(!asm.exists());
}

#[test]
fn test_guard_cleans_on_panic() {
    let dir = tempdir().unwrap();
    let exe = dir.path().join("test_bin");
    fs::write(&exe, "").unwrap();

    let guarded = exe.clone();
    let result = std::panic::catch_unwind(move || {
        let _guard = CleanupGuard::new([&guarded]);
        panic!("suite aborted");
    });

    assert!(result.is_err());
    assert!(!exe.exists());
}
