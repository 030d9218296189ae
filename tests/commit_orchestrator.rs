// ABOUTME: Tests for commit with draft fallback against the in-memory gateway.
// ABOUTME: Verifies the single recovery pass and what the draft rewrite preserves.

mod support;

use support::{gateway, package, release, track};
use trackctl::gateway::memory::{GatewayMethod, ScriptedFailure};
use trackctl::gateway::{CountryTargeting, LocalizedText, ReleaseStatus};
use trackctl::publish::{EditTransaction, commit_with_draft_fallback, is_draft_only_rejection};

#[tokio::test]
async fn clean_commit_forces_nothing() {
    let gw = gateway();
    let pkg = package();

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    edit.update_track(&track(
        "beta",
        vec![release(&[5], ReleaseStatus::Completed, None)],
    ))
    .await
    .unwrap();

    let report = commit_with_draft_fallback(edit).await.unwrap();

    assert_eq!(report.forced_to_draft, 0);
    assert!(!report.recovered());
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 1);
    assert_eq!(gw.call_count(GatewayMethod::ListTracks), 0);
    assert_eq!(gw.open_edits(), 0);
}

#[tokio::test]
async fn draft_app_rejection_forces_every_release_to_draft() {
    let gw = gateway();
    let pkg = package();

    let mut staged = release(&[41], ReleaseStatus::InProgress, Some(0.2));
    staged.name = Some("41 (2.0.0)".to_string());
    staged.release_notes = vec![LocalizedText {
        language: "en-US".to_string(),
        text: "Dark mode".to_string(),
    }];
    staged.country_targeting = Some(CountryTargeting {
        countries: vec!["NL".to_string()],
        include_rest_of_world: Some(false),
    });
    staged.in_app_update_priority = Some(4);
    gw.seed_track(&pkg, track("beta", vec![staged.clone()]));
    gw.seed_track(&pkg, track("internal", vec![]));
    gw.set_draft_app(&pkg, true);

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    edit.update_track(&track(
        "production",
        vec![release(&[42], ReleaseStatus::Completed, None)],
    ))
    .await
    .unwrap();

    let report = commit_with_draft_fallback(edit).await.unwrap();

    assert_eq!(report.forced_to_draft, 2);
    assert!(report.recovered());
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 2);
    assert_eq!(gw.call_count(GatewayMethod::ListTracks), 1);
    // production pushed once by the caller, beta and production once each by recovery
    assert_eq!(gw.call_count(GatewayMethod::UpdateTrack), 3);

    let beta = gw.track(&pkg, "beta").unwrap();
    assert_eq!(beta.releases.len(), 1);
    let drafted = &beta.releases[0];
    assert_eq!(drafted.status, ReleaseStatus::Draft);
    assert_eq!(drafted.name, staged.name);
    assert_eq!(drafted.version_codes, vec![41]);
    assert_eq!(drafted.release_notes, staged.release_notes);
    assert_eq!(drafted.country_targeting, staged.country_targeting);
    assert_eq!(drafted.in_app_update_priority, Some(4));
    assert_eq!(drafted.rollout_fraction, Some(0.2));

    let production = gw.track(&pkg, "production").unwrap();
    assert_eq!(production.releases[0].status, ReleaseStatus::Draft);
}

#[tokio::test]
async fn unrelated_commit_failure_is_not_retried() {
    let gw = gateway();
    let pkg = package();
    gw.fail_next(
        GatewayMethod::CommitEdit,
        ScriptedFailure::Api {
            status: 500,
            message: "Internal error encountered.".to_string(),
        },
    );

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    let (edit, err) = commit_with_draft_fallback(edit).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!is_draft_only_rejection(&err));
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 1);
    assert_eq!(gw.call_count(GatewayMethod::ListTracks), 0);

    edit.abort().await;
    assert_eq!(gw.open_edits(), 0);
}

#[tokio::test]
async fn retry_outcome_is_final() {
    let gw = gateway();
    let pkg = package();
    gw.seed_track(
        &pkg,
        track("beta", vec![release(&[9], ReleaseStatus::InProgress, Some(0.5))]),
    );
    gw.fail_next(GatewayMethod::CommitEdit, ScriptedFailure::DraftOnly);
    gw.fail_next(GatewayMethod::CommitEdit, ScriptedFailure::DraftOnly);

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    let (_edit, err) = commit_with_draft_fallback(edit).await.unwrap_err();

    assert!(is_draft_only_rejection(&err));
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 2);
    assert_eq!(gw.call_count(GatewayMethod::ListTracks), 1);
}

#[tokio::test]
async fn signature_in_transport_cause_is_recognized() {
    let gw = gateway();
    let pkg = package();
    gw.fail_next(
        GatewayMethod::CommitEdit,
        ScriptedFailure::Transport(
            "proxy said: ONLY RELEASES WITH STATUS DRAFT MAY BE CREATED ON DRAFT APP".to_string(),
        ),
    );

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    let report = commit_with_draft_fallback(edit).await.unwrap();

    assert_eq!(report.forced_to_draft, 0);
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 2);
    assert_eq!(gw.call_count(GatewayMethod::ListTracks), 1);
}

#[tokio::test]
async fn recovery_failure_propagates_without_retry() {
    let gw = gateway();
    let pkg = package();
    gw.fail_next(GatewayMethod::CommitEdit, ScriptedFailure::DraftOnly);
    gw.fail_next(
        GatewayMethod::ListTracks,
        ScriptedFailure::Transport("connection reset".to_string()),
    );

    let edit = EditTransaction::open(gw.as_ref(), &pkg).await.unwrap();
    let (_edit, err) = commit_with_draft_fallback(edit).await.unwrap_err();

    assert!(err.to_string().contains("connection reset"));
    assert_eq!(gw.call_count(GatewayMethod::CommitEdit), 1);
}
