use super::*;
use std::sync::{Arc, Barrier};
use std::time::{Duration, SystemTime};

fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with(TEMP_SUFFIX))
        .collect()
}

#[test]
fn ensure_directories_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("stickers").join("nested").join("a.png");
    let store = CacheStore::new();
    store.ensure_directories(&target).unwrap();
    store.ensure_directories(&target).unwrap();
    assert!(target.parent().unwrap().is_dir());
    assert!(!store.exists(&target));
}

#[test]
fn ensure_directories_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("stickers");
    std::fs::write(&blocker, b"not a dir").unwrap();
    let err = CacheStore::new()
        .ensure_directories(&blocker.join("a.png"))
        .unwrap_err();
    assert!(matches!(err, CacheError::CreateDir { .. }), "{err}");
}

#[test]
fn write_atomically_replaces_content() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("backgrounds").join("bg.png");
    let store = CacheStore::new();

    assert_eq!(store.write_atomically(&target, &b"old content"[..]).unwrap(), 11);
    assert_eq!(std::fs::read(&target).unwrap(), b"old content");

    store.write_atomically(&target, &b"new"[..]).unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"new");
    assert!(store.exists(&target));
    assert!(leftover_temp_files(target.parent().unwrap()).is_empty());
}

#[test]
fn dropped_writer_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a.png");
    std::fs::write(&target, b"keep me").unwrap();

    let store = CacheStore::new();
    let mut w = store.begin(&target).unwrap();
    w.write_chunk(b"half of a").unwrap();
    let temp = w.temp_path().to_path_buf();
    assert!(temp.exists());
    assert!(temp.file_name().unwrap().to_string_lossy().starts_with(".a.png."));
    drop(w);

    assert!(!temp.exists());
    assert_eq!(std::fs::read(&target).unwrap(), b"keep me");
}

#[test]
fn commit_stamps_modification_time() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a.png");
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_445_412_480);

    let mut w = CacheStore::new().begin(&target).unwrap();
    w.write_chunk(b"abc").unwrap();
    w.write_chunk(b"def").unwrap();
    assert_eq!(w.written(), 6);
    assert_eq!(w.commit(Some(mtime)).unwrap(), 6);

    let meta = std::fs::metadata(&target).unwrap();
    assert_eq!(meta.modified().unwrap(), mtime);
    assert_eq!(std::fs::read(&target).unwrap(), b"abcdef");
}

#[test]
fn concurrent_writers_never_tear_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = Arc::new(dir.path().join("promotion").join("promo.png"));
    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let target = Arc::clone(&target);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let body = vec![i as u8; 64 * 1024];
                barrier.wait();
                CacheStore::new().write_atomically(&target, &body[..]).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let content = std::fs::read(&*target).unwrap();
    assert_eq!(content.len(), 64 * 1024);
    let first = content[0];
    assert!(content.iter().all(|&b| b == first), "file mixes writers");
    assert!(leftover_temp_files(target.parent().unwrap()).is_empty());
}
