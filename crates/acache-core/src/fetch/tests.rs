use super::fake::{FakeTransport, Scripted};
use super::*;
use crate::storage::TEMP_SUFFIX;
use std::path::PathBuf;

const URL: &str = "http://primary.test/stickers/jetbrains/happy.png";

fn setup() -> (tempfile::TempDir, Arc<FakeTransport>, RemoteFetcher, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeTransport::new());
    let fetcher = RemoteFetcher::new(fake.clone(), CacheStore::new());
    let dest = dir.path().join("stickers").join("happy.png");
    (dir, fake, fetcher, dest)
}

fn no_temp_files(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .map(|e| e.unwrap().path())
            .all(|p| !p.to_string_lossy().ends_with(TEMP_SUFFIX)),
        Err(_) => true,
    }
}

#[test]
fn success_writes_exact_body() {
    let (_dir, fake, fetcher, dest) = setup();
    let body: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
    fake.ok(URL, &body);

    let outcome = fetcher.download(&Url::parse(URL).unwrap(), &dest);
    assert!(matches!(outcome, FetchOutcome::Success { bytes: 10_000 }), "{outcome:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(no_temp_files(dest.parent().unwrap()));
}

#[test]
fn success_stamps_remote_mtime() {
    let (_dir, fake, fetcher, dest) = setup();
    fake.ok(URL, b"x");
    assert!(fetcher.download(&Url::parse(URL).unwrap(), &dest).is_success());
    let mtime = std::fs::metadata(&dest).unwrap().modified().unwrap();
    assert_eq!(mtime, mtime_from_unix(1_445_412_480).unwrap());
}

#[test]
fn empty_body_creates_empty_file() {
    let (_dir, fake, fetcher, dest) = setup();
    fake.ok(URL, b"");
    assert!(fetcher.download(&Url::parse(URL).unwrap(), &dest).is_success());
    assert_eq!(std::fs::read(&dest).unwrap(), b"");
}

#[test]
fn non_200_writes_nothing() {
    for status in [404, 403, 500, 204, 304] {
        let (_dir, fake, fetcher, dest) = setup();
        fake.status(URL, status);
        let outcome = fetcher.download(&Url::parse(URL).unwrap(), &dest);
        assert!(
            matches!(outcome, FetchOutcome::NotFound { status: s } if s == status),
            "{outcome:?}"
        );
        assert!(!dest.exists());
        assert!(no_temp_files(dest.parent().unwrap()));
    }
}

#[test]
fn non_200_keeps_existing_file() {
    let (_dir, fake, fetcher, dest) = setup();
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&dest, b"cached").unwrap();
    fake.status(URL, 404);
    fetcher.download(&Url::parse(URL).unwrap(), &dest);
    assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
}

#[test]
fn transport_failure_is_an_outcome() {
    let (_dir, fake, fetcher, dest) = setup();
    fake.fail(URL, 28);
    match fetcher.download(&Url::parse(URL).unwrap(), &dest) {
        FetchOutcome::TransportFailure(e) => assert_eq!(e.kind(), TransportErrorKind::Timeout),
        other => panic!("expected transport failure, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn truncated_stream_leaves_no_partial_file() {
    let (_dir, fake, fetcher, dest) = setup();
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&dest, b"previous").unwrap();
    fake.route(URL, Scripted::Truncated(b"partial body".to_vec()));

    let outcome = fetcher.download(&Url::parse(URL).unwrap(), &dest);
    assert!(matches!(outcome, FetchOutcome::TransportFailure(_)), "{outcome:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    assert!(no_temp_files(dest.parent().unwrap()));
}

#[test]
fn unwritable_cache_dir_is_storage_failure() {
    let (dir, fake, fetcher, dest) = setup();
    std::fs::write(dir.path().join("stickers"), b"file, not dir").unwrap();
    fake.ok(URL, b"x");
    let outcome = fetcher.download(&Url::parse(URL).unwrap(), &dest);
    assert!(
        matches!(outcome, FetchOutcome::StorageFailure(CacheError::CreateDir { .. })),
        "{outcome:?}"
    );
    assert!(fake.gets().is_empty(), "no request when the cache cannot be written");
}

#[test]
fn mtime_conversion() {
    assert_eq!(mtime_from_unix(0), Some(UNIX_EPOCH));
    assert_eq!(mtime_from_unix(-1), None);
}
