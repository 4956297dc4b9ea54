use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::EngineResult;
use crate::domain::models::{Bucket, BucketChangeRecord, SpeakerProfile};

/// Filters for listing speaker profiles.
#[derive(Default, Debug, Clone)]
pub struct ProfileFilter {
    pub bucket: Option<Bucket>,
    /// Exclude speakers whose progression is halted
    pub exclude_halted: bool,
    pub limit: Option<i64>,
}

/// Repository port for speaker-profile persistence.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile
    async fn insert(&self, profile: &SpeakerProfile) -> EngineResult<()>;

    /// Get a profile by speaker ID
    async fn get(&self, speaker_id: Uuid) -> EngineResult<Option<SpeakerProfile>>;

    /// Update an existing profile
    async fn update(&self, profile: &SpeakerProfile) -> EngineResult<()>;

    /// List profiles with optional filters
    async fn list(&self, filter: ProfileFilter) -> EngineResult<Vec<SpeakerProfile>>;

    /// Persist an approved transition atomically: the profile's new bucket
    /// state and the audit record commit together or not at all
    async fn apply_transition(
        &self,
        profile: &SpeakerProfile,
        record: &BucketChangeRecord,
    ) -> EngineResult<()>;

    /// Flip the progression-halted flag
    async fn set_halted(&self, speaker_id: Uuid, halted: bool) -> EngineResult<()>;

    /// Count of speakers per bucket
    async fn bucket_distribution(&self) -> EngineResult<HashMap<Bucket, i64>>;
}
