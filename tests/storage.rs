//! Last-file persistence

use keybard::Storage;

#[test]
fn nothing_stored_initially() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::with_path(dir.path().join("state.toml"));
    assert_eq!(storage.get_last_file_path(), None);
}

#[test]
fn set_get_clear() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::with_path(dir.path().join("keybard").join("state.toml"));

    storage.set_last_file_path("/home/me/svalboard.kbi");
    assert_eq!(
        storage.get_last_file_path().as_deref(),
        Some("/home/me/svalboard.kbi")
    );

    // A second handle sees the same state
    let other = Storage::with_path(storage.path());
    assert_eq!(
        other.get_last_file_path().as_deref(),
        Some("/home/me/svalboard.kbi")
    );

    storage.clear_last_file_path();
    assert_eq!(storage.get_last_file_path(), None);
}

#[test]
fn corrupt_state_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    std::fs::write(&path, "last_file_path = [").unwrap();

    let storage = Storage::with_path(&path);
    assert_eq!(storage.get_last_file_path(), None);
}

#[test]
fn unwritable_location_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    // Parent "directory" is a regular file
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let storage = Storage::with_path(blocker.join("state.toml"));

    storage.set_last_file_path("/tmp/x.kbi");
    storage.clear_last_file_path();
    assert_eq!(storage.get_last_file_path(), None);
}
