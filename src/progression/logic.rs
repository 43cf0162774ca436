use rand::Rng;

use super::types::*;
use crate::items::{EquipmentTemplate, StatBlock};

/// Rolls one progression attempt for `current_level` on `track`.
///
/// Pure with respect to everything but the rng: the caller owns the resource
/// debit and commits `new_level` onto the instance only if the debit went
/// through. Fails closed when the level has no table entry.
pub fn attempt<R: Rng>(
    track: &ProgressionTrack,
    current_level: u8,
    protection_used: bool,
    rng: &mut R,
) -> Result<AttemptOutcome, ProgressionError> {
    if current_level >= track.max_level {
        return Err(ProgressionError::AtMaxLevel);
    }
    let rate = *track
        .success_rates
        .get(current_level as usize)
        .ok_or(ProgressionError::NoConfig(current_level))?;

    let roll = rng.gen::<f64>();
    let outcome = if roll < rate {
        AttemptOutcome {
            success: true,
            result: AttemptResultKind::Success,
            new_level: (current_level + 1).min(track.max_level),
            downgraded: false,
            used_protection: protection_used,
        }
    } else if current_level < track.downgrade_threshold || protection_used {
        AttemptOutcome {
            success: false,
            result: AttemptResultKind::Failure,
            new_level: current_level,
            downgraded: false,
            used_protection: protection_used,
        }
    } else {
        AttemptOutcome {
            success: false,
            result: AttemptResultKind::FailureDowngrade,
            new_level: current_level - 1,
            downgraded: true,
            used_protection: protection_used,
        }
    };

    tracing::debug!(
        kind = ?track.kind,
        from = current_level,
        to = outcome.new_level,
        result = ?outcome.result,
        "progression attempt"
    );
    Ok(outcome)
}

/// Looks up the resource cost of attempting `current_level` -> `current_level + 1`.
pub fn attempt_cost(track: &ProgressionTrack, current_level: u8) -> Result<u32, ProgressionError> {
    if current_level >= track.max_level {
        return Err(ProgressionError::AtMaxLevel);
    }
    track
        .costs
        .get(current_level as usize)
        .copied()
        .ok_or(ProgressionError::NoConfig(current_level))
}

/// Reports odds, cost, and affordability for the next attempt without
/// mutating anything.
pub fn preview(track: &ProgressionTrack, current_level: u8, available: u32) -> TrackPreview {
    match attempt_cost(track, current_level) {
        Err(err) => TrackPreview {
            can_attempt: false,
            reason: Some(err.to_string()),
            current_level,
            target_level: current_level,
            success_rate: 0.0,
            cost: 0,
            has_enough_resource: false,
            stat_gain: None,
        },
        Ok(cost) => {
            let has_enough = available >= cost;
            TrackPreview {
                can_attempt: has_enough,
                reason: (!has_enough).then(|| {
                    ProgressionError::InsufficientResource {
                        needed: cost,
                        available,
                    }
                    .to_string()
                }),
                current_level,
                target_level: current_level + 1,
                success_rate: track.success_rates[current_level as usize],
                cost,
                has_enough_resource: has_enough,
                stat_gain: None,
            }
        }
    }
}

/// `preview` for a concrete item: same report, with the stat delta of a
/// successful next level embedded. The item's position on the track is read
/// from whichever level the track kind rolls against.
pub fn preview_for_item(
    track: &ProgressionTrack,
    template: &EquipmentTemplate,
    enhance_level: u8,
    sublimation_level: u8,
    available: u32,
) -> TrackPreview {
    let current_level = match track.kind {
        TrackKind::Enhancement => enhance_level,
        TrackKind::Sublimation => sublimation_level,
    };
    let mut report = preview(track, current_level, available);
    if report.target_level > current_level {
        report.stat_gain = Some(attribute_preview(
            template,
            enhance_level,
            sublimation_level,
            track.kind,
        ));
    }
    report
}

/// Stat gain the item would receive if its next level on `kind` succeeds.
/// Both deltas are computed from the same floored per-item scaling used by
/// aggregation, so the preview matches what combat will see.
pub fn attribute_preview(
    template: &EquipmentTemplate,
    enhance_level: u8,
    sublimation_level: u8,
    kind: TrackKind,
) -> StatBlock {
    let (next_enhance, next_sublimation) = match kind {
        TrackKind::Enhancement => (enhance_level + 1, sublimation_level),
        TrackKind::Sublimation => (enhance_level, sublimation_level + 1),
    };
    let current = crate::character::item_stat_block(template, enhance_level, sublimation_level);
    let next = crate::character::item_stat_block(template, next_enhance, next_sublimation);
    next.diff(&current)
}
