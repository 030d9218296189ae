// ABOUTME: Commit with a single draft-fallback recovery pass.
// ABOUTME: Demotes every pending release to draft when the app was never published.

use crate::gateway::{GatewayError, PublisherGateway, Release, ReleaseStatus, Track};
use crate::types::EditId;

use super::classifier::is_draft_only_rejection;
use super::edit::EditTransaction;

/// Outcome of a successful orchestrated commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub edit_id: EditId,
    /// Releases rewritten to draft before the retry. Zero when the first commit succeeded.
    pub forced_to_draft: usize,
}

impl CommitReport {
    /// True when the commit only went through after the draft fallback.
    pub fn recovered(&self) -> bool {
        self.forced_to_draft > 0
    }
}

/// Copy of `release` with status draft. Every other field is kept as is.
pub fn force_to_draft(release: &Release) -> Release {
    Release {
        status: ReleaseStatus::Draft,
        ..release.clone()
    }
}

pub fn force_track_to_draft(track: &Track) -> Track {
    Track {
        name: track.name.clone(),
        releases: track.releases.iter().map(force_to_draft).collect(),
    }
}

/// Commit `edit`, recovering once from the draft-app rejection.
///
/// 1. Commit. Success ends the call.
/// 2. A failure that is not the draft-app rejection is returned untouched.
/// 3. Otherwise every track with releases is rewritten with all releases in
///    draft status and pushed back to the edit.
/// 4. The commit is retried exactly once and its outcome is final.
///
/// On failure the transaction is handed back, so the caller decides whether
/// to abort it.
pub async fn commit_with_draft_fallback<'g, G: PublisherGateway>(
    edit: EditTransaction<'g, G>,
) -> Result<CommitReport, (EditTransaction<'g, G>, GatewayError)> {
    let (edit, error) = match edit.commit().await {
        Ok(edit_id) => {
            return Ok(CommitReport {
                edit_id,
                forced_to_draft: 0,
            });
        }
        Err(failed) => failed,
    };

    if !is_draft_only_rejection(&error) {
        return Err((edit, error));
    }

    tracing::warn!(
        package = %edit.package(),
        edit = %edit.id(),
        "app is still in draft state, forcing pending releases to draft"
    );

    let tracks = match edit.list_tracks().await {
        Ok(tracks) => tracks,
        Err(e) => return Err((edit, e)),
    };

    let mut forced_to_draft = 0;
    for track in tracks.iter().filter(|t| !t.releases.is_empty()) {
        let drafted = force_track_to_draft(track);
        if let Err(e) = edit.update_track(&drafted).await {
            return Err((edit, e));
        }
        forced_to_draft += drafted.releases.len();
    }

    tracing::info!(
        package = %edit.package(),
        edit = %edit.id(),
        forced_to_draft,
        "retrying commit"
    );

    edit.commit().await.map(|edit_id| CommitReport {
        edit_id,
        forced_to_draft,
    })
}
