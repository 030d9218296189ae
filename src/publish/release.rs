// ABOUTME: Derives release status, rollout fraction, and notes from inputs.
// ABOUTME: Pure functions; nothing here talks to the gateway.

use crate::gateway::{LocalizedText, Release, ReleaseStatus};

/// Fraction meaning "everyone".
pub const FULL_ROLLOUT: f64 = 1.0;

/// Build a release for `version_codes` at the given rollout fraction.
///
/// A fraction of exactly `1.0` yields a completed release without a stored
/// fraction; any other value yields an in-progress release carrying the
/// fraction verbatim. Values outside `(0, 1]` are not checked here and reach
/// the remote API as given.
///
/// Non-blank `notes` become a single entry tagged with `language`.
pub fn build_release(
    version_codes: Vec<i64>,
    rollout_fraction: f64,
    notes: Option<&str>,
    language: &str,
) -> Release {
    let (status, fraction) = if rollout_fraction == FULL_ROLLOUT {
        (ReleaseStatus::Completed, None)
    } else {
        (ReleaseStatus::InProgress, Some(rollout_fraction))
    };

    Release {
        name: None,
        version_codes,
        status,
        rollout_fraction: fraction,
        release_notes: localized_notes(notes, language),
        country_targeting: None,
        in_app_update_priority: None,
    }
}

/// Copy of `source` published at full rollout.
///
/// Keeps name, version codes and notes; drops the fraction and targeting.
pub fn promoted_release(source: &Release) -> Release {
    Release {
        name: source.name.clone(),
        version_codes: source.version_codes.clone(),
        status: ReleaseStatus::Completed,
        rollout_fraction: None,
        release_notes: source.release_notes.clone(),
        country_targeting: None,
        in_app_update_priority: None,
    }
}

fn localized_notes(notes: Option<&str>, language: &str) -> Vec<LocalizedText> {
    match notes.map(str::trim) {
        Some(text) if !text.is_empty() => vec![LocalizedText {
            language: language.to_string(),
            text: text.to_string(),
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rollout_is_completed_without_fraction() {
        let release = build_release(vec![42], 1.0, None, "en-US");
        assert_eq!(release.status, ReleaseStatus::Completed);
        assert_eq!(release.rollout_fraction, None);
        assert_eq!(release.version_codes, vec![42]);
    }

    #[test]
    fn partial_rollout_is_in_progress() {
        let release = build_release(vec![42], 0.25, None, "en-US");
        assert_eq!(release.status, ReleaseStatus::InProgress);
        assert_eq!(release.rollout_fraction, Some(0.25));
    }

    #[test]
    fn out_of_range_fraction_passes_through() {
        let release = build_release(vec![1], 1.5, None, "en-US");
        assert_eq!(release.status, ReleaseStatus::InProgress);
        assert_eq!(release.rollout_fraction, Some(1.5));
    }

    #[test]
    fn notes_are_tagged_with_language() {
        let release = build_release(vec![1], 1.0, Some("  Bug fixes  "), "de-DE");
        assert_eq!(
            release.release_notes,
            vec![LocalizedText {
                language: "de-DE".to_string(),
                text: "Bug fixes".to_string(),
            }]
        );
    }

    #[test]
    fn blank_notes_are_dropped() {
        assert!(build_release(vec![1], 1.0, Some("   "), "en-US")
            .release_notes
            .is_empty());
        assert!(build_release(vec![1], 1.0, None, "en-US")
            .release_notes
            .is_empty());
    }

    #[test]
    fn promotion_forces_full_rollout() {
        let mut source = build_release(vec![7, 8], 0.1, Some("notes"), "en-US");
        source.name = Some("2.0".to_string());

        let promoted = promoted_release(&source);
        assert_eq!(promoted.status, ReleaseStatus::Completed);
        assert_eq!(promoted.rollout_fraction, None);
        assert_eq!(promoted.name.as_deref(), Some("2.0"));
        assert_eq!(promoted.version_codes, vec![7, 8]);
        assert_eq!(promoted.release_notes, source.release_notes);
    }
}
