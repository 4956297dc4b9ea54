//! Integration tests for the SQLite repository adapters.

mod helpers;

use chrono::{Duration, Utc};
use uuid::Uuid;

use helpers::database::setup_test_db;
use helpers::fixtures::{report_at, settled_profile};
use tierwise::adapters::sqlite::{
    all_embedded_migrations, create_pool, verify_connection, Migrator, SqliteHistoryRepository,
    SqliteProfileRepository, SqliteReportRepository,
};
use tierwise::domain::models::{
    Bucket, BucketChangeRecord, RectificationStatus, SpeakerMetrics, SpeakerProfile,
    TransitionDirection,
};
use tierwise::domain::ports::{
    HistoryRepository, ProfileFilter, ProfileRepository, ReportRepository,
};
use tierwise::EngineError;

fn change_record(
    speaker_id: Uuid,
    from: Bucket,
    to: Bucket,
    days_ago: i64,
) -> BucketChangeRecord {
    let direction = if to > from {
        TransitionDirection::Promotion
    } else {
        TransitionDirection::Demotion
    };
    BucketChangeRecord::new(
        speaker_id,
        from,
        to,
        direction,
        SpeakerMetrics::default(),
        0.8,
        format!("{} from {from} to {to} at confidence 0.80", direction.as_str()),
        Utc::now() - Duration::days(days_ago),
    )
}

#[tokio::test]
async fn test_file_backed_pool_and_idempotent_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("tierwise.db");
    let db_url = format!("sqlite:{}", db_path.display());

    // Parent directory is created on first open
    let pool = create_pool(&db_url, 1).await.unwrap();
    verify_connection(&pool).await.unwrap();

    let migrator = Migrator::new(pool.clone());
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap();
    assert_eq!(applied, 1);

    // Already at the latest version, so a second run applies nothing
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap();
    assert_eq!(applied, 0);

    let repo = SqliteReportRepository::new(pool);
    let report = report_at(
        Uuid::new_v4(),
        2,
        80,
        RectificationStatus::Rectified,
        Bucket::HighTouch,
        Utc::now(),
    );
    repo.insert(&report).await.unwrap();
    assert!(repo.get(report.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_report_roundtrip() {
    let pool = setup_test_db().await;
    let repo = SqliteReportRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let report = report_at(
        speaker_id,
        4,
        120,
        RectificationStatus::Pending,
        Bucket::MediumTouch,
        Utc::now(),
    );
    repo.insert(&report).await.unwrap();

    let fetched = repo.get(report.id).await.unwrap().expect("report missing");
    assert_eq!(fetched.speaker_id, speaker_id);
    assert_eq!(fetched.errors_found, 4);
    assert_eq!(fetched.reference_length, 120);
    assert_eq!(fetched.rectification, RectificationStatus::Pending);
    assert_eq!(fetched.bucket_at_report, Bucket::MediumTouch);

    assert_eq!(repo.count_for_speaker(speaker_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_recent_window_keeps_newest_in_ascending_order() {
    let pool = setup_test_db().await;
    let repo = SqliteReportRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let start = Utc::now() - Duration::days(10);
    for i in 0..10u32 {
        let report = report_at(
            speaker_id,
            i,
            100,
            RectificationStatus::Rectified,
            Bucket::MediumTouch,
            start + Duration::days(i64::from(i)),
        );
        repo.insert(&report).await.unwrap();
    }

    let window = repo.recent_window(speaker_id, 4).await.unwrap();

    // The 4 newest reports (errors 6..=9), oldest of the window first
    let errors: Vec<u32> = window.iter().map(|r| r.errors_found).collect();
    assert_eq!(errors, vec![6, 7, 8, 9]);
}

#[tokio::test]
async fn test_recent_window_ignores_other_speakers() {
    let pool = setup_test_db().await;
    let repo = SqliteReportRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let other = Uuid::new_v4();
    for (who, errors) in [(speaker_id, 1), (other, 9), (speaker_id, 2)] {
        let report = report_at(
            who,
            errors,
            100,
            RectificationStatus::Pending,
            Bucket::MediumTouch,
            Utc::now(),
        );
        repo.insert(&report).await.unwrap();
    }

    let window = repo.recent_window(speaker_id, 10).await.unwrap();
    assert_eq!(window.len(), 2);
    assert!(window.iter().all(|r| r.speaker_id == speaker_id));
}

#[tokio::test]
async fn test_profile_roundtrip_and_update() {
    let pool = setup_test_db().await;
    let repo = SqliteProfileRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let mut profile = SpeakerProfile::new(speaker_id);
    repo.insert(&profile).await.unwrap();

    let fetched = repo.get(speaker_id).await.unwrap().expect("profile missing");
    assert_eq!(fetched.current_bucket, Bucket::MediumTouch);
    assert_eq!(fetched.total_reports, 0);
    assert!(!fetched.progression_halted);

    profile.record_report(3, true, Utc::now());
    repo.update(&profile).await.unwrap();

    let updated = repo.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(updated.total_reports, 1);
    assert_eq!(updated.total_errors, 3);
    assert_eq!(updated.total_corrections, 1);
}

#[tokio::test]
async fn test_update_unknown_profile_fails() {
    let pool = setup_test_db().await;
    let repo = SqliteProfileRepository::new(pool);

    let profile = SpeakerProfile::new(Uuid::new_v4());
    let err = repo.update(&profile).await.unwrap_err();
    assert!(matches!(err, EngineError::SpeakerNotFound(id) if id == profile.speaker_id));
}

#[tokio::test]
async fn test_list_filters_by_bucket_and_halted() {
    let pool = setup_test_db().await;
    let repo = SqliteProfileRepository::new(pool);

    let low = settled_profile(Uuid::new_v4(), Bucket::LowTouch, 10);
    let mut halted_low = settled_profile(Uuid::new_v4(), Bucket::LowTouch, 10);
    halted_low.progression_halted = true;
    let medium = settled_profile(Uuid::new_v4(), Bucket::MediumTouch, 10);
    for profile in [&low, &halted_low, &medium] {
        repo.insert(profile).await.unwrap();
    }

    let low_touch = repo
        .list(ProfileFilter { bucket: Some(Bucket::LowTouch), exclude_halted: false, limit: None })
        .await
        .unwrap();
    assert_eq!(low_touch.len(), 2);

    let eligible = repo
        .list(ProfileFilter { bucket: Some(Bucket::LowTouch), exclude_halted: true, limit: None })
        .await
        .unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].speaker_id, low.speaker_id);

    let all = repo
        .list(ProfileFilter { bucket: None, exclude_halted: false, limit: Some(2) })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_apply_transition_writes_profile_and_history_together() {
    let pool = setup_test_db().await;
    let profiles = SqliteProfileRepository::new(pool.clone());
    let history = SqliteHistoryRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let mut profile = settled_profile(speaker_id, Bucket::MediumTouch, 30);
    profiles.insert(&profile).await.unwrap();

    let now = Utc::now();
    profile.apply_transition(Bucket::LowTouch, now);
    let record = BucketChangeRecord::new(
        speaker_id,
        Bucket::MediumTouch,
        Bucket::LowTouch,
        TransitionDirection::Promotion,
        SpeakerMetrics::default(),
        0.75,
        "promotion from medium_touch to low_touch at confidence 0.75".to_string(),
        now,
    );
    profiles.apply_transition(&profile, &record).await.unwrap();

    let stored = profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(stored.current_bucket, Bucket::LowTouch);
    assert_eq!(stored.change_count, 1);
    assert!(stored.last_change_at.is_some());

    let trail = history.full_history(speaker_id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].from_bucket, Bucket::MediumTouch);
    assert_eq!(trail[0].to_bucket, Bucket::LowTouch);
    assert!((trail[0].confidence - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_apply_transition_unknown_speaker_writes_nothing() {
    let pool = setup_test_db().await;
    let profiles = SqliteProfileRepository::new(pool.clone());
    let history = SqliteHistoryRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    let mut profile = settled_profile(speaker_id, Bucket::MediumTouch, 30);
    profile.apply_transition(Bucket::LowTouch, Utc::now());
    let record = change_record(speaker_id, Bucket::MediumTouch, Bucket::LowTouch, 0);

    let err = profiles.apply_transition(&profile, &record).await.unwrap_err();
    assert!(matches!(err, EngineError::SpeakerNotFound(_)));

    // The audit insert must have been rolled back with the profile update
    let trail = history.full_history(speaker_id).await.unwrap();
    assert!(trail.is_empty());
}

#[tokio::test]
async fn test_history_paging_newest_first() {
    let pool = setup_test_db().await;
    let history = SqliteHistoryRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    history.append(&change_record(speaker_id, Bucket::MediumTouch, Bucket::LowTouch, 40)).await.unwrap();
    history.append(&change_record(speaker_id, Bucket::LowTouch, Bucket::MediumTouch, 20)).await.unwrap();
    history.append(&change_record(speaker_id, Bucket::MediumTouch, Bucket::LowTouch, 5)).await.unwrap();

    let first_page = history.page_for_speaker(speaker_id, 2, 0).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert!(first_page[0].occurred_at > first_page[1].occurred_at);

    let second_page = history.page_for_speaker(speaker_id, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].from_bucket, Bucket::MediumTouch);

    // Replay order is the reverse of display order
    let full = history.full_history(speaker_id).await.unwrap();
    assert_eq!(full.len(), 3);
    assert!(full[0].occurred_at < full[2].occurred_at);
}

#[tokio::test]
async fn test_history_count_since() {
    let pool = setup_test_db().await;
    let history = SqliteHistoryRepository::new(pool);

    let speaker_id = Uuid::new_v4();
    history.append(&change_record(speaker_id, Bucket::MediumTouch, Bucket::LowTouch, 40)).await.unwrap();
    history.append(&change_record(speaker_id, Bucket::LowTouch, Bucket::MediumTouch, 10)).await.unwrap();
    history.append(&change_record(speaker_id, Bucket::MediumTouch, Bucket::LowTouch, 2)).await.unwrap();

    let since = Utc::now() - Duration::days(30);
    assert_eq!(history.count_since(speaker_id, since).await.unwrap(), 2);
}

#[tokio::test]
async fn test_bucket_distribution_includes_empty_buckets() {
    let pool = setup_test_db().await;
    let repo = SqliteProfileRepository::new(pool);

    repo.insert(&settled_profile(Uuid::new_v4(), Bucket::NoTouch, 10)).await.unwrap();
    repo.insert(&settled_profile(Uuid::new_v4(), Bucket::NoTouch, 10)).await.unwrap();
    repo.insert(&settled_profile(Uuid::new_v4(), Bucket::MediumTouch, 10)).await.unwrap();

    let distribution = repo.bucket_distribution().await.unwrap();
    assert_eq!(distribution[&Bucket::NoTouch], 2);
    assert_eq!(distribution[&Bucket::MediumTouch], 1);
    assert_eq!(distribution[&Bucket::LowTouch], 0);
    assert_eq!(distribution[&Bucket::HighTouch], 0);
}

#[tokio::test]
async fn test_set_halted_roundtrip() {
    let pool = setup_test_db().await;
    let repo = SqliteProfileRepository::new(pool);

    let profile = settled_profile(Uuid::new_v4(), Bucket::LowTouch, 10);
    repo.insert(&profile).await.unwrap();

    repo.set_halted(profile.speaker_id, true).await.unwrap();
    assert!(repo.get(profile.speaker_id).await.unwrap().unwrap().progression_halted);

    repo.set_halted(profile.speaker_id, false).await.unwrap();
    assert!(!repo.get(profile.speaker_id).await.unwrap().unwrap().progression_halted);
}
