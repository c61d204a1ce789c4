use scenario_bucket::contract::{MockUploader, StorageError, StoredObject, UploadStatus};
use scenario_bucket::publish::{object_exists, upload_file, upload_object};
use std::fs::write;
use tempfile::tempdir;

fn stored(name: &str) -> StoredObject {
    StoredObject {
        name: name.to_string(),
        id: Some(format!("id-{name}")),
    }
}

#[tokio::test]
async fn test_existing_object_short_circuits_upload() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_list_objects()
        .times(1)
        .returning(|search| Ok(vec![stored(search)]));
    uploader.expect_upload_object().never();
    uploader.expect_public_url().never();

    let outcome = upload_object(&uploader, "shim_flick.sce", b"data".to_vec(), true).await;

    assert_eq!(outcome.status, UploadStatus::AlreadyExists);
    assert_eq!(outcome.object_name, "shim_flick.sce");
    assert!(outcome.error_detail.is_none());
}

#[tokio::test]
async fn test_exists_requires_identical_name() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_list_objects()
        .returning(|_| Ok(vec![stored("shim_flick.sce.bak"), stored("old_shim_flick.sce")]));

    assert!(!object_exists(&uploader, "shim_flick.sce").await);
}

#[tokio::test]
async fn test_listing_failure_assumes_absent_and_uploads() {
    let mut uploader = MockUploader::new();
    uploader.expect_list_objects().returning(|_| {
        Err(StorageError::Api {
            status: 500,
            message: "listing unavailable".into(),
        })
    });
    uploader
        .expect_upload_object()
        .times(1)
        .returning(|name, content| {
            assert_eq!(name, "shim_flick.sce");
            assert_eq!(content, b"data".to_vec());
            Ok(())
        });
    uploader
        .expect_public_url()
        .returning(|name| Some(format!("https://cdn.example/{name}")));

    let outcome = upload_object(&uploader, "shim_flick.sce", b"data".to_vec(), true).await;

    assert_eq!(outcome.status, UploadStatus::Uploaded);
    assert_eq!(
        outcome.public_url.as_deref(),
        Some("https://cdn.example/shim_flick.sce")
    );
}

#[tokio::test]
async fn test_backend_error_becomes_failed_outcome() {
    let mut uploader = MockUploader::new();
    uploader.expect_list_objects().returning(|_| Ok(vec![]));
    uploader.expect_upload_object().returning(|_, _| {
        Err(StorageError::Api {
            status: 403,
            message: "new row violates row-level security policy".into(),
        })
    });
    uploader.expect_public_url().never();

    let outcome = upload_object(&uploader, "shim_flick.sce", vec![1, 2, 3], true).await;

    assert_eq!(outcome.status, UploadStatus::Failed);
    let detail = outcome.error_detail.expect("failure carries detail");
    assert!(detail.contains("403"));
    assert!(detail.contains("row-level security"));
}

#[tokio::test]
async fn test_public_url_not_resolved_when_disabled() {
    let mut uploader = MockUploader::new();
    uploader.expect_list_objects().returning(|_| Ok(vec![]));
    uploader.expect_upload_object().returning(|_, _| Ok(()));
    uploader.expect_public_url().never();

    let outcome = upload_object(&uploader, "a.sce", vec![], false).await;

    assert_eq!(outcome.status, UploadStatus::Uploaded);
    assert!(outcome.public_url.is_none());
}

#[tokio::test]
async fn test_missing_public_url_is_not_an_error() {
    let mut uploader = MockUploader::new();
    uploader.expect_list_objects().returning(|_| Ok(vec![]));
    uploader.expect_upload_object().returning(|_, _| Ok(()));
    uploader.expect_public_url().returning(|_| None);

    let outcome = upload_object(&uploader, "a.sce", vec![], true).await;

    assert_eq!(outcome.status, UploadStatus::Uploaded);
    assert!(outcome.public_url.is_none());
    assert!(outcome.error_detail.is_none());
}

#[tokio::test]
async fn test_upload_file_reads_bytes_from_disk() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("shim_track.sce");
    write(&path, "SearchTags=shim").unwrap();

    let mut uploader = MockUploader::new();
    uploader.expect_list_objects().returning(|_| Ok(vec![]));
    uploader
        .expect_upload_object()
        .times(1)
        .returning(|_, content| {
            assert_eq!(content, b"SearchTags=shim".to_vec());
            Ok(())
        });
    uploader.expect_public_url().returning(|_| None);

    let outcome = upload_file(&uploader, "shim_track.sce", &path, true).await;
    assert_eq!(outcome.status, UploadStatus::Uploaded);
}

#[tokio::test]
async fn test_upload_file_unreadable_is_failed_without_backend_calls() {
    let tmp = tempdir().unwrap();
    let uploader = MockUploader::new();

    let outcome = upload_file(&uploader, "gone.sce", &tmp.path().join("gone.sce"), true).await;

    assert_eq!(outcome.status, UploadStatus::Failed);
    assert!(outcome.error_detail.unwrap().contains("gone.sce"));
}
