//! Integration tests for the evaluation pipeline against real SQLite
//! repositories.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use helpers::database::setup_test_db;
use helpers::fixtures::{promotion_ready_window, seed_rectified_reports, settled_profile};
use sqlx::SqlitePool;
use tierwise::adapters::sqlite::{
    SqliteHistoryRepository, SqliteProfileRepository, SqliteReportRepository,
};
use tierwise::domain::models::{
    Bucket, BucketChangeRecord, Decision, EngineConfig, NoChangeReason, SpeakerMetrics,
    TransitionDirection,
};
use tierwise::domain::ports::{HistoryRepository, ProfileRepository, ReportRepository};
use tierwise::services::{OverrideMode, ProgressionEvaluator};
use tierwise::EngineError;

struct Harness {
    reports: Arc<SqliteReportRepository>,
    profiles: Arc<SqliteProfileRepository>,
    history: Arc<SqliteHistoryRepository>,
    evaluator: ProgressionEvaluator,
}

fn harness(pool: &SqlitePool) -> Harness {
    let config = EngineConfig::default();
    let reports = Arc::new(SqliteReportRepository::new(pool.clone()));
    let profiles = Arc::new(SqliteProfileRepository::new(pool.clone()));
    let history = Arc::new(SqliteHistoryRepository::new(pool.clone()));
    let evaluator = ProgressionEvaluator::new(
        reports.clone(),
        profiles.clone(),
        history.clone(),
        &config,
    );
    Harness { reports, profiles, history, evaluator }
}

#[tokio::test]
async fn test_promotes_settled_speaker_with_strong_window() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    let decision = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();

    match decision {
        Decision::Promote { to, confidence } => {
            assert_eq!(to, Bucket::LowTouch);
            assert!(confidence >= 0.7, "confidence {confidence} under threshold");
        }
        other => panic!("expected promotion, got {other:?}"),
    }

    // Profile and audit trail moved together
    let profile = h.profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(profile.current_bucket, Bucket::LowTouch);
    assert_eq!(profile.change_count, 1);

    let trail = h.history.full_history(speaker_id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].from_bucket, Bucket::MediumTouch);
    assert_eq!(trail[0].to_bucket, Bucket::LowTouch);
    assert_eq!(trail[0].direction, TransitionDirection::Promotion);
}

#[tokio::test]
async fn test_minimum_tenure_denies_fresh_arrival() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    // Entered the bucket two days ago; scores alone would promote
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 2)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    let decision = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();
    assert_eq!(
        decision,
        Decision::NoChange {
            reason: NoChangeReason::Safeguard("minimum time in bucket".to_string())
        }
    );

    let profile = h.profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(profile.current_bucket, Bucket::MediumTouch);
    assert!(h.history.full_history(speaker_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_three_reports_is_not_decidable() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &[(1, 100), (1, 100), (1, 100)],
    )
    .await;

    let decision = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();
    assert_eq!(decision, Decision::NoChange { reason: NoChangeReason::InsufficientData });
}

#[tokio::test]
async fn test_severe_rate_breach_demotes_at_full_confidence() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::LowTouch, 30)).await.unwrap();
    // 10% error rate, double the LowTouch ceiling of 0.05
    seed_rectified_reports(h.reports.as_ref(), speaker_id, Bucket::LowTouch, &[(10, 100); 6])
        .await;

    let decision = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();

    match decision {
        Decision::Demote { to, confidence } => {
            assert_eq!(to, Bucket::MediumTouch);
            assert!((confidence - 1.0).abs() < f64::EPSILON);
        }
        other => panic!("expected demotion, got {other:?}"),
    }

    let profile = h.profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(profile.current_bucket, Bucket::MediumTouch);
}

#[tokio::test]
async fn test_steady_speaker_stays_put() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    // 8% rate: under the MediumTouch ceiling, over the LowTouch one
    seed_rectified_reports(h.reports.as_ref(), speaker_id, Bucket::MediumTouch, &[(8, 100); 10])
        .await;

    let decision = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();
    assert_eq!(decision, Decision::NoChange { reason: NoChangeReason::BelowThreshold });
}

#[tokio::test]
async fn test_force_block_overrides_strong_candidate() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    let block = OverrideMode::ForceBlock { reason: "pending account review".to_string() };
    let decision = h.evaluator.evaluate(speaker_id, &block).await.unwrap();
    assert_eq!(
        decision,
        Decision::NoChange {
            reason: NoChangeReason::Safeguard(
                "blocked by operator: pending account review".to_string()
            )
        }
    );
}

#[tokio::test]
async fn test_force_admit_bypasses_tenure_and_records_reason() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 2)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    let admit = OverrideMode::ForceAdmit { reason: "quarterly review".to_string() };
    let decision = h.evaluator.evaluate(speaker_id, &admit).await.unwrap();
    assert!(matches!(decision, Decision::Promote { to: Bucket::LowTouch, .. }));

    let trail = h.history.full_history(speaker_id).await.unwrap();
    assert!(trail[0].reason.starts_with("operator override (quarterly review):"));
}

#[tokio::test]
async fn test_unknown_speaker_is_an_error() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let missing = Uuid::new_v4();
    let err = h.evaluator.evaluate(missing, &OverrideMode::None).await.unwrap_err();
    assert!(matches!(err, EngineError::SpeakerNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_broken_audit_chain_halts_speaker() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    // A record whose from_bucket does not chain from the default bucket
    let rogue = BucketChangeRecord::new(
        speaker_id,
        Bucket::LowTouch,
        Bucket::NoTouch,
        TransitionDirection::Promotion,
        SpeakerMetrics::default(),
        0.9,
        "promotion from low_touch to no_touch at confidence 0.90".to_string(),
        Utc::now() - Duration::days(60),
    );
    h.history.append(&rogue).await.unwrap();

    let err = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvariantViolation { .. }));

    // The transition must not have been written, and the speaker is halted
    let profile = h.profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(profile.current_bucket, Bucket::MediumTouch);
    assert!(profile.progression_halted);

    // Once halted, even a forced evaluation is refused at the gate
    let admit = OverrideMode::ForceAdmit { reason: "try anyway".to_string() };
    let decision = h.evaluator.evaluate(speaker_id, &admit).await.unwrap();
    assert_eq!(
        decision,
        Decision::NoChange {
            reason: NoChangeReason::Safeguard("progression halted pending manual audit".to_string())
        }
    );
}

#[tokio::test]
async fn test_cooldown_prevents_back_to_back_transitions() {
    let pool = setup_test_db().await;
    let h = harness(&pool);

    let speaker_id = Uuid::new_v4();
    h.profiles.insert(&settled_profile(speaker_id, Bucket::MediumTouch, 30)).await.unwrap();
    seed_rectified_reports(
        h.reports.as_ref(),
        speaker_id,
        Bucket::MediumTouch,
        &promotion_ready_window(),
    )
    .await;

    let first = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();
    assert!(first.is_transition());

    // Same window still scores high against the next tier or not, either
    // way the cooldown must deny any further movement today
    let second = h.evaluator.evaluate(speaker_id, &OverrideMode::None).await.unwrap();
    if let Decision::NoChange { reason } = second {
        match reason {
            NoChangeReason::Safeguard(denial) => assert_eq!(denial, "cooldown period active"),
            NoChangeReason::BelowThreshold => {}
            other => panic!("unexpected reason {other:?}"),
        }
    } else {
        panic!("expected no change, got {second:?}");
    }

    let profile = h.profiles.get(speaker_id).await.unwrap().unwrap();
    assert_eq!(profile.change_count, 1);
}
