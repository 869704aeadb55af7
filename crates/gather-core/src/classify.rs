//! # Classifier Module
//!
//! Locator validation and media-kind inference.
//!
//! - Kind comes from the locator suffix only; the bytes are checked later by
//!   the loader (see [`crate::sniff`])
//! - Comparison is case-insensitive
//! - Unrecognized suffixes default to `Image`
//! - Malformed locators are rejected here so the runtime can settle them
//!   immediately instead of watching them

use crate::primitives::{AUDIO_SUFFIXES, MAX_ASSETS, MAX_LOCATOR_LENGTH, VIDEO_SUFFIXES};
use crate::{AssetDescriptor, AssetId, AssetKind, GatherError, RawLocator};

/// Result of planning one raw entry.
#[derive(Debug)]
pub enum PlannedAsset {
    /// A classified asset to watch.
    Watch(AssetDescriptor),
    /// An entry that counts toward the batch but is settled immediately.
    Malformed {
        /// Position in the filtered batch.
        id: AssetId,
        /// Why classification failed.
        error: GatherError,
    },
}

impl PlannedAsset {
    /// The asset id.
    #[must_use]
    pub fn id(&self) -> AssetId {
        match self {
            PlannedAsset::Watch(descriptor) => descriptor.id,
            PlannedAsset::Malformed { id, .. } => *id,
        }
    }
}

/// The Classifier turns raw locator lists into planned assets.
pub struct Classifier;

impl Classifier {
    /// Validate a locator string.
    ///
    /// A locator is malformed if:
    /// - it is blank (whitespace only)
    /// - it exceeds `MAX_LOCATOR_LENGTH`
    /// - it contains control characters
    pub fn validate(locator: &str) -> Result<(), GatherError> {
        if locator.trim().is_empty() {
            return Err(GatherError::MalformedLocator("blank locator".to_string()));
        }

        if locator.len() > MAX_LOCATOR_LENGTH {
            return Err(GatherError::MalformedLocator(format!(
                "locator length {} exceeds maximum {}",
                locator.len(),
                MAX_LOCATOR_LENGTH
            )));
        }

        if locator.chars().any(char::is_control) {
            return Err(GatherError::MalformedLocator(
                "locator contains control characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Classify a locator by its suffix.
    ///
    /// Query and fragment parts are ignored, so
    /// `https://cdn.example/clip.MP4?token=1` is a video.
    pub fn classify(locator: &str) -> Result<AssetKind, GatherError> {
        Self::validate(locator)?;

        let kind = match suffix(locator) {
            Some(ext) if VIDEO_SUFFIXES.contains(&ext.as_str()) => AssetKind::Video,
            Some(ext) if AUDIO_SUFFIXES.contains(&ext.as_str()) => AssetKind::Audio,
            _ => AssetKind::Image,
        };

        Ok(kind)
    }

    /// Filter, number and classify a raw entry list.
    ///
    /// Blank and missing entries are dropped before numbering. Duplicates are
    /// kept: each entry is its own asset. Entries past `MAX_ASSETS` still count
    /// toward the batch but are planned as malformed.
    pub fn plan<I>(entries: I) -> Vec<PlannedAsset>
    where
        I: IntoIterator,
        I::Item: Into<RawLocator>,
    {
        let kept: Vec<RawLocator> = entries
            .into_iter()
            .map(Into::into)
            .filter(|entry| !entry.is_blank())
            .collect();
        let count = kept.len();

        kept.into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let id = AssetId(index);
                if index >= MAX_ASSETS {
                    return PlannedAsset::Malformed {
                        id,
                        error: GatherError::TooManyAssets {
                            count,
                            max: MAX_ASSETS,
                        },
                    };
                }
                match entry {
                    RawLocator::Text(locator) => match Self::classify(&locator) {
                        Ok(kind) => PlannedAsset::Watch(AssetDescriptor::new(id, locator, kind)),
                        Err(error) => PlannedAsset::Malformed { id, error },
                    },
                    RawLocator::Malformed(reason) => PlannedAsset::Malformed {
                        id,
                        error: GatherError::MalformedLocator(reason),
                    },
                    // Filtered above; keep the arm total.
                    RawLocator::Missing => PlannedAsset::Malformed {
                        id,
                        error: GatherError::MalformedLocator("missing entry".to_string()),
                    },
                }
            })
            .collect()
    }
}

/// Lowercased extension of the locator's last path segment.
fn suffix(locator: &str) -> Option<String> {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator)
        .trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(Classifier::classify("a.mp4").expect("kind"), AssetKind::Video);
        assert_eq!(Classifier::classify("a.webm").expect("kind"), AssetKind::Video);
        assert_eq!(Classifier::classify("a.mp3").expect("kind"), AssetKind::Audio);
        assert_eq!(Classifier::classify("a.wav").expect("kind"), AssetKind::Audio);
        assert_eq!(Classifier::classify("a.ogg").expect("kind"), AssetKind::Audio);
        assert_eq!(Classifier::classify("a.jpg").expect("kind"), AssetKind::Image);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            Classifier::classify("Clips/Intro.MP4").expect("kind"),
            AssetKind::Video
        );
        assert_eq!(
            Classifier::classify("THEME.Mp3").expect("kind"),
            AssetKind::Audio
        );
    }

    #[test]
    fn unknown_suffix_defaults_to_image() {
        assert_eq!(Classifier::classify("photo").expect("kind"), AssetKind::Image);
        assert_eq!(Classifier::classify("a.xyz").expect("kind"), AssetKind::Image);
        assert_eq!(Classifier::classify("a.").expect("kind"), AssetKind::Image);
    }

    #[test]
    fn bare_suffix_still_classifies() {
        assert_eq!(Classifier::classify(".mp4").expect("kind"), AssetKind::Video);
        assert_eq!(Classifier::classify("clips/.webm").expect("kind"), AssetKind::Video);
        assert_eq!(Classifier::classify(".ogg?v=2").expect("kind"), AssetKind::Audio);
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        assert_eq!(
            Classifier::classify("https://cdn.example/v/clip.webm?sig=abc.png").expect("kind"),
            AssetKind::Video
        );
        assert_eq!(
            Classifier::classify("song.ogg#t=10").expect("kind"),
            AssetKind::Audio
        );
    }

    #[test]
    fn directory_dots_do_not_count() {
        assert_eq!(
            Classifier::classify("media.mp4/cover").expect("kind"),
            AssetKind::Image
        );
    }

    #[test]
    fn malformed_locators_rejected() {
        assert!(Classifier::classify("   ").is_err());
        assert!(Classifier::classify("a\u{0}.png").is_err());
        assert!(Classifier::classify(&"x".repeat(MAX_LOCATOR_LENGTH + 1)).is_err());
    }

    #[test]
    fn plan_filters_blank_and_numbers_densely() {
        let entries = vec![
            RawLocator::from("a.png"),
            RawLocator::Missing,
            RawLocator::from(""),
            RawLocator::from("b.mp3"),
            RawLocator::Malformed("expected a string, found an integer".into()),
        ];

        let planned = Classifier::plan(entries);

        assert_eq!(planned.len(), 3);
        let ids: Vec<_> = planned.iter().map(PlannedAsset::id).collect();
        assert_eq!(ids, vec![AssetId(0), AssetId(1), AssetId(2)]);
        assert!(matches!(&planned[1], PlannedAsset::Watch(d) if d.kind == AssetKind::Audio));
        assert!(matches!(planned[2], PlannedAsset::Malformed { .. }));
    }

    #[test]
    fn plan_keeps_duplicates() {
        let planned = Classifier::plan(["a.png", "a.png"]);
        assert_eq!(planned.len(), 2);
    }

    #[test]
    fn plan_marks_overflow_entries_malformed() {
        let entries = vec!["a.png"; MAX_ASSETS + 2];
        let planned = Classifier::plan(entries);

        assert_eq!(planned.len(), MAX_ASSETS + 2);
        assert!(matches!(&planned[MAX_ASSETS - 1], PlannedAsset::Watch(_)));
        assert!(matches!(
            &planned[MAX_ASSETS],
            PlannedAsset::Malformed {
                error: GatherError::TooManyAssets { count, .. },
                ..
            } if *count == MAX_ASSETS + 2
        ));
        assert_eq!(planned[MAX_ASSETS + 1].id(), AssetId(MAX_ASSETS + 1));
    }
}
