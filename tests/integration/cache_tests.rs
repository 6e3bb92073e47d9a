use super::common::{counting_extractor, failing_extractor, set_mtime, write_png};
use rustgallery::cache::{cache_file_path, CacheError, CacheRecord, ImageCache};
use std::fs;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[test]
fn test_cache_second_run_reuses_entries() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    let b = root.path().join("sub/b.png");
    write_png(&a, 10, 5);
    write_png(&b, 3, 3);
    set_mtime(&a, 100);
    set_mtime(&b, 200);

    let (extractor, calls) = counting_extractor([0.2, 0.4, 0.6]);
    let first = ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)?;
        Ok::<_, CacheError>(cache.images())
    })
    .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let second = ImageCache::scope(cache_dir.path(), root.path(), failing_extractor(), |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)?;
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 0);
        Ok::<_, CacheError>(cache.images())
    })
    .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_cache_invalidation_on_mtime_change() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    let b = root.path().join("b.png");
    write_png(&a, 4, 4);
    write_png(&b, 4, 4);
    set_mtime(&a, 100);
    set_mtime(&b, 100);

    let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
    ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)
    })
    .unwrap();

    set_mtime(&b, 150);

    let (extractor, calls) = counting_extractor([1.0, 1.0, 1.0]);
    let images = ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)?;
        Ok::<_, CacheError>(cache.images())
    })
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(images[0].0, "b.png");
    assert_eq!(images[0].1.mtime, 150.0);
    assert_eq!(images[0].1.tint_color, "#ffffff");
    assert_eq!(images[1].0, "a.png");
    assert_eq!(images[1].1.tint_color, "#000000");
}

#[test]
fn test_cache_same_content_new_mtime_is_recomputed() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    write_png(&a, 2, 2);
    set_mtime(&a, 100);

    let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
    ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| cache.add_image(&a)).unwrap();

    set_mtime(&a, 101);
    let (extractor, calls) = counting_extractor([0.0, 0.0, 0.0]);
    ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| cache.add_image(&a)).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cache_drops_entries_for_missing_files() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    let b = root.path().join("b.png");
    write_png(&a, 1, 1);
    write_png(&b, 1, 1);

    let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
    ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)
    })
    .unwrap();

    fs::remove_file(&b).unwrap();

    let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
    let mut cache = ImageCache::open(cache_dir.path(), root.path(), extractor).unwrap();
    cache.add_image(&a).unwrap();
    let path = cache.path().to_path_buf();
    cache.close().unwrap();

    let record: CacheRecord = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(record.images.keys().collect::<Vec<_>>(), vec!["a.png"]);
}

#[test]
fn test_cache_round_trip_before_adding() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    let b = root.path().join("nested/b.png");
    write_png(&a, 7, 9);
    write_png(&b, 2, 1);

    let (extractor, _) = counting_extractor([0.1, 0.2, 0.3]);
    let written = ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&a)?;
        cache.add_image(&b)?;
        Ok::<_, CacheError>(cache.images())
    })
    .unwrap();

    let path = cache_file_path(cache_dir.path(), &root.path().to_string_lossy());
    let record: CacheRecord = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(record.root, root.path().to_string_lossy());
    assert_eq!(record.images.len(), written.len());
    for (rel, entry) in &written {
        assert_eq!(&record.images[rel], entry);
    }
}

#[test]
fn test_cache_persists_on_error_inside_scope() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let good = root.path().join("good.png");
    let bad = root.path().join("bad.png");
    write_png(&good, 1, 1);
    fs::write(&bad, b"\x89PNG\r\n\x1a\ngarbage").unwrap();

    let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
    let result = ImageCache::scope(cache_dir.path(), root.path(), extractor, |cache| {
        cache.add_image(&good)?;
        cache.add_image(&bad)
    });
    assert!(matches!(result, Err(CacheError::Image { .. })));

    let path = cache_file_path(cache_dir.path(), &root.path().to_string_lossy());
    let record: CacheRecord = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(record.images.contains_key("good.png"));
    assert!(!record.images.contains_key("bad.png"));
}

#[test]
fn test_cache_persists_on_panic() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let a = root.path().join("a.png");
    write_png(&a, 1, 1);
    let cache_root = root.path().to_path_buf();
    let cache_base = cache_dir.path().to_path_buf();

    let outcome = std::panic::catch_unwind(move || {
        let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
        let mut cache = ImageCache::open(&cache_base, &cache_root, extractor).unwrap();
        cache.add_image(&a).unwrap();
        panic!("simulated crash");
    });
    assert!(outcome.is_err());

    let path = cache_file_path(cache_dir.path(), &root.path().to_string_lossy());
    let record: CacheRecord = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(record.images.contains_key("a.png"));
}

#[test]
fn test_cache_root_mismatch_leaves_file_untouched() {
    let root = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let path = cache_file_path(cache_dir.path(), &root.path().to_string_lossy());
    let stale = "{\n  \"images\": {},\n  \"root\": \"/elsewhere\"\n}";
    fs::write(&path, stale).unwrap();

    let result = ImageCache::scope(cache_dir.path(), root.path(), failing_extractor(), |_| {
        Ok::<_, CacheError>(())
    });

    assert!(matches!(result, Err(CacheError::RootMismatch { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), stale);
}

#[test]
fn test_cache_separate_files_per_root() {
    let root_a = tempdir().unwrap();
    let root_b = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();

    for root in [root_a.path(), root_b.path()] {
        let (extractor, _) = counting_extractor([0.0, 0.0, 0.0]);
        ImageCache::scope(cache_dir.path(), root, extractor, |_| Ok::<_, CacheError>(())).unwrap();
    }

    assert_ne!(
        cache_file_path(cache_dir.path(), &root_a.path().to_string_lossy()),
        cache_file_path(cache_dir.path(), &root_b.path().to_string_lossy())
    );
    assert_eq!(fs::read_dir(cache_dir.path()).unwrap().count(), 2);
}
