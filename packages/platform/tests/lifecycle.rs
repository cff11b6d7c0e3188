//! Staging and promotion, end to end: uploads land in subject-scoped
//! staging, promotion re-homes them under their owner, and both flows
//! survive re-runs.

mod support;

use platform::AppError;
use platform::attachment::{Owner, Subject, Upload};

#[tokio::test]
async fn list_staging_accumulates_ordered_derived_keys() {
    let (state, _store, _dir) = support::state().await;
    let subject = Subject::profile("alice", 5);

    let first = state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"one"))
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"two"))
        .await
        .unwrap();
    let third = state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"three"))
        .await
        .unwrap();

    let keys: Vec<_> = third.iter().map(|image| image.key.as_str()).collect();
    assert_eq!(keys, ["TEMP.alice.5.0", "TEMP.alice.5.1", "TEMP.alice.5.2"]);
    assert!(
        third
            .iter()
            .all(|image| image.path.starts_with("/api/user/alice/temp_list/5/"))
    );
}

#[tokio::test]
async fn promotion_rehomes_every_staged_blob() {
    let (state, store, dir) = support::state().await;
    let profile = store.add_profile("alice", "family").await;
    let article = store.add_article(profile.id, "hello", "body").await;
    let subject = Subject::profile("alice", profile.id);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"a"))
        .await
        .unwrap();
    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"b"))
        .await
        .unwrap();

    let attachments = state
        .promoter
        .promote(&subject, Owner::article(article.id))
        .await
        .unwrap();

    assert_eq!(attachments.len(), 2);
    let prefix = format!("/api/article/{}/", article.id);
    for image in &attachments {
        assert!(image.path.starts_with(&prefix), "path: {}", image.path);
        assert!(support::on_disk(&dir, &image.path).exists());
    }
    let keys: Vec<_> = attachments.iter().map(|image| image.key.as_str()).collect();
    assert_eq!(
        keys,
        [
            format!("ARTICLE.{}.0", article.id),
            format!("ARTICLE.{}.1", article.id)
        ]
    );

    // Staging is fully drained: no entry, no files, no leftover directory.
    assert!(state.staging.staged(&subject).await.unwrap().is_empty());
    let staging_dir = support::on_disk(
        &dir,
        &format!("/api/user/alice/temp_list/{}", profile.id),
    );
    assert!(!staging_dir.exists());
}

#[tokio::test]
async fn promotion_reruns_are_noops() {
    let (state, store, _dir) = support::state().await;
    let profile = store.add_profile("alice", "family").await;
    let article = store.add_article(profile.id, "hello", "body").await;
    let subject = Subject::profile("alice", profile.id);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"a"))
        .await
        .unwrap();
    let promoted = state
        .promoter
        .promote(&subject, Owner::article(article.id))
        .await
        .unwrap();

    let again = state
        .promoter
        .promote(&subject, Owner::article(article.id))
        .await
        .unwrap();

    assert_eq!(promoted, again);
    assert_eq!(
        state
            .promoter
            .list_attachments(Owner::article(article.id))
            .await
            .unwrap(),
        promoted
    );
}

#[tokio::test]
async fn promotion_rewrites_inline_references() {
    let (state, store, _dir) = support::state().await;
    let profile = store.add_profile("alice", "family").await;
    let subject = Subject::profile("alice", profile.id);

    let staged = state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"img"))
        .await
        .unwrap();
    let staged_path = staged[0].path.clone();

    let body = format!("<p>look</p><img src=\"{staged_path}\">");
    let article = store.add_article(profile.id, "hello", &body).await;

    let attachments = state
        .promoter
        .promote(&subject, Owner::article(article.id))
        .await
        .unwrap();

    let tables = store.snapshot().await;
    let content = &tables
        .articles
        .iter()
        .find(|a| a.id == article.id)
        .unwrap()
        .content;
    assert!(!content.contains(&staged_path));
    assert!(content.contains(&attachments[0].path));
}

#[tokio::test]
async fn promotion_merges_into_an_existing_entry() {
    let (state, store, _dir) = support::state().await;
    let profile = store.add_profile("alice", "family").await;
    let subject = Subject::profile("alice", profile.id);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"first"))
        .await
        .unwrap();
    state.promoter.promote(&subject, Owner::apt(7)).await.unwrap();

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"second"))
        .await
        .unwrap();
    let attachments = state.promoter.promote(&subject, Owner::apt(7)).await.unwrap();

    let keys: Vec<_> = attachments.iter().map(|image| image.key.as_str()).collect();
    assert_eq!(keys, ["APT.7.0", "APT.7.1"]);
}

#[tokio::test]
async fn single_slot_keeps_only_the_latest_upload() {
    let (state, _store, dir) = support::state().await;
    let subject = Subject::user("bob");

    let first = state
        .staging
        .stage_upload(&subject, &support::png(b"old"))
        .await
        .unwrap();
    let second = state
        .staging
        .stage_upload(&subject, &support::png(b"new"))
        .await
        .unwrap();

    assert_eq!(first.key, "TEMP.bob");
    assert_eq!(second.key, "TEMP.bob");
    assert_ne!(first.path, second.path);
    assert!(!support::on_disk(&dir, &first.path).exists());
    assert!(support::on_disk(&dir, &second.path).exists());
}

#[tokio::test]
async fn profile_image_promotion_replaces_the_previous_image() {
    let (state, _store, dir) = support::state().await;
    let subject = Subject::user("alice");

    state
        .staging
        .stage_upload(&subject, &support::png(b"v1"))
        .await
        .unwrap();
    let first = state
        .promoter
        .promote_profile_image(&subject, 5)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.key, "USER.alice.5");
    assert!(first.path.starts_with("/api/user/alice/profile/5/"));
    assert!(support::on_disk(&dir, &first.path).exists());

    // The staged slot was consumed.
    assert!(
        state
            .promoter
            .promote_profile_image(&subject, 5)
            .await
            .unwrap()
            .is_none()
    );

    // A second upload replaces the stored image.
    state
        .staging
        .stage_upload(&subject, &support::png(b"v2"))
        .await
        .unwrap();
    let second = state
        .promoter
        .promote_profile_image(&subject, 5)
        .await
        .unwrap()
        .unwrap();

    assert!(!support::on_disk(&dir, &first.path).exists());
    assert!(support::on_disk(&dir, &second.path).exists());
    assert_eq!(
        state.promoter.profile_image("alice", 5).await.unwrap(),
        Some(second)
    );
}

#[tokio::test]
async fn invalid_uploads_are_rejected() {
    let (state, _store, _dir) = support::state().await;
    let subject = Subject::user("carol");

    let empty = Upload {
        content_type: "image/png".into(),
        data: Vec::new(),
    };
    assert!(matches!(
        state.staging.stage_upload(&subject, &empty).await,
        Err(AppError::InvalidUpload(_))
    ));

    let unknown = Upload {
        content_type: "application/x-made-up-type".into(),
        data: b"data".to_vec(),
    };
    assert!(matches!(
        state.staging.stage_upload_to_list(&subject, &unknown).await,
        Err(AppError::InvalidUpload(_))
    ));

    let oversized = Upload {
        content_type: "image/png".into(),
        data: vec![0u8; 8 * 1024 * 1024 + 1],
    };
    assert!(matches!(
        state.staging.stage_upload(&subject, &oversized).await,
        Err(AppError::InvalidUpload(_))
    ));
}

#[tokio::test]
async fn delete_blob_removes_file_record_and_index_slot() {
    let (state, store, dir) = support::state().await;
    let profile = store.add_profile("alice", "family").await;
    let article = store.add_article(profile.id, "hello", "body").await;
    let subject = Subject::profile("alice", profile.id);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"a"))
        .await
        .unwrap();
    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"b"))
        .await
        .unwrap();
    let attachments = state
        .promoter
        .promote(&subject, Owner::article(article.id))
        .await
        .unwrap();

    state.promoter.delete_blob(&attachments[0].key).await.unwrap();

    let remaining = state
        .promoter
        .list_attachments(Owner::article(article.id))
        .await
        .unwrap();
    assert_eq!(remaining, vec![attachments[1].clone()]);
    assert!(!support::on_disk(&dir, &attachments[0].path).exists());
    assert!(support::on_disk(&dir, &attachments[1].path).exists());

    // Deleting an unknown blob is an error, not a silent no-op.
    assert!(matches!(
        state.promoter.delete_blob(&attachments[0].key).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn discard_drops_the_whole_staged_list() {
    let (state, _store, dir) = support::state().await;
    let subject = Subject::profile("dave", 3);

    state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"a"))
        .await
        .unwrap();
    let staged = state
        .staging
        .stage_upload_to_list(&subject, &support::png(b"b"))
        .await
        .unwrap();

    state.staging.discard(&subject).await.unwrap();

    assert!(state.staging.staged(&subject).await.unwrap().is_empty());
    for image in staged {
        assert!(!support::on_disk(&dir, &image.path).exists());
    }
    // Discarding an empty slot is fine.
    state.staging.discard(&subject).await.unwrap();
}
