use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, distance_km};

/// Minimum confidence needed before a match is suggested automatically
pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Confidence lost per kilometer of separation, reaches 0 at 50 meters
const CONFIDENCE_LOSS_PER_KM: f64 = 2000.0;

const MAX_CONFIDENCE: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A billboard as seen by the matcher, only its id and where it stands
pub struct RegisteredAsset {
    pub id: String,
    pub location: GeoPoint,
}

impl RegisteredAsset {
    pub fn new(id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A candidate asset paired with how confident we are it's the one in the complaint
pub struct MatchResult {
    pub asset: RegisteredAsset,
    /// 0 to 100
    pub confidence: u8,
}

/// Convert a distance into a 0-100 confidence score.
///
/// Halves are rounded away from zero.
pub fn confidence(distance_km: f64) -> u8 {
    let score = (MAX_CONFIDENCE - distance_km * CONFIDENCE_LOSS_PER_KM).round();
    score.clamp(0.0, MAX_CONFIDENCE) as u8
}

/// Find the candidate with the highest confidence for `location`, returns [None] if there are no
/// candidates or the best one falls below `threshold`. Ties go to whichever candidate came first.
pub fn find_best_match<'a>(
    location: GeoPoint,
    candidates: impl IntoIterator<Item = &'a RegisteredAsset>,
    threshold: u8,
) -> Option<MatchResult> {
    let mut best: Option<(&RegisteredAsset, u8)> = None;

    for candidate in candidates {
        let score = confidence(distance_km(location, candidate.location));
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    best.filter(|&(_, score)| score >= threshold)
        .map(|(asset, confidence)| MatchResult {
            asset: asset.clone(),
            confidence,
        })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Suggests which registered asset a geotagged complaint is about
pub struct ProximityMatcher {
    threshold: u8,
}

impl Default for ProximityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl ProximityMatcher {
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn find_best_match<'a>(
        &self,
        location: GeoPoint,
        candidates: impl IntoIterator<Item = &'a RegisteredAsset>,
    ) -> Option<MatchResult> {
        find_best_match(location, candidates, self.threshold)
    }

    /// Score every candidate, highest confidence first. Candidates with equal confidence keep
    /// their input order. The threshold is not applied.
    pub fn rank<'a>(
        &self,
        location: GeoPoint,
        candidates: impl IntoIterator<Item = &'a RegisteredAsset>,
    ) -> Vec<MatchResult> {
        let mut ranked = candidates
            .into_iter()
            .map(|asset| MatchResult {
                confidence: confidence(distance_km(location, asset.location)),
                asset: asset.clone(),
            })
            .collect::<Vec<_>>();

        ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        ranked
    }
}
