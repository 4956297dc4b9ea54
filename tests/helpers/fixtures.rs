use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use tierwise::domain::models::{
    Bucket, ErrorReport, RectificationStatus, SpeakerProfile,
};
use tierwise::domain::ports::ReportRepository;

/// Profile settled in `bucket` for `days_in_bucket` days, with no prior
/// changes, so the timing safeguards pass.
pub fn settled_profile(speaker_id: Uuid, bucket: Bucket, days_in_bucket: i64) -> SpeakerProfile {
    let mut profile = SpeakerProfile::new(speaker_id);
    profile.current_bucket = bucket;
    profile.bucket_entered_at = Utc::now() - Duration::days(days_in_bucket);
    profile.created_at = profile.bucket_entered_at;
    profile
}

/// Report with an explicit timestamp.
pub fn report_at(
    speaker_id: Uuid,
    errors: u32,
    length: u32,
    rectification: RectificationStatus,
    bucket: Bucket,
    occurred_at: DateTime<Utc>,
) -> ErrorReport {
    let mut report = ErrorReport::new(speaker_id, errors, length, rectification, bucket);
    report.occurred_at = occurred_at;
    report
}

/// Insert one report per `(errors, length)` pair, one day apart, oldest
/// first, all rectified.
pub async fn seed_rectified_reports(
    repo: &dyn ReportRepository,
    speaker_id: Uuid,
    bucket: Bucket,
    error_counts: &[(u32, u32)],
) {
    let start = Utc::now() - Duration::days(error_counts.len() as i64);
    for (i, (errors, length)) in error_counts.iter().enumerate() {
        let report = report_at(
            speaker_id,
            *errors,
            *length,
            RectificationStatus::Rectified,
            bucket,
            start + Duration::days(i as i64),
        );
        repo.insert(&report).await.expect("failed to insert report");
    }
}

/// A window that comfortably clears the promotion threshold out of
/// `MediumTouch`: mean rate 0.02 against the LowTouch ceiling of 0.05,
/// perfect accuracy, and a falling rate across the window halves.
pub fn promotion_ready_window() -> Vec<(u32, u32)> {
    let mut counts = vec![(3, 100); 6];
    counts.extend(vec![(1, 100); 6]);
    counts
}
