//! Temporal crossfade between a tile and its ancestor fallback.
//!
//! When zooming makes a higher- or lower-resolution tile the better LOD
//! match, freshly loaded imagery would otherwise pop in. Instead, the
//! evaluator dissolves between the child texture and the ancestor that
//! was covering for it, driven by wall-clock time since each image
//! became available.

use crate::tiles::TileRecord;
use std::time::{Duration, Instant};

/// Blend weights consumed by the draw step: `opacity` scales the whole
/// tile, `mix` says how much of the secondary (ancestor) sample shows
/// through. Both always clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub opacity: f32,
    pub mix: f32,
}

impl Fade {
    /// No crossfade: child only, fully opaque
    pub const OPAQUE: Fade = Fade {
        opacity: 1.0,
        mix: 0.0,
    };
}

/// Result of one fade evaluation. `refresh_window_elapsed` reports that
/// a refreshed-upon-expiration tile has aged past its fade window; the
/// orchestrator forwards it to `TileStore::mark_fade_complete`, the
/// store being the only writer of tile state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEvaluation {
    pub fade: Fade,
    pub refresh_window_elapsed: bool,
}

fn clamp01(v: f64) -> f32 {
    v.clamp(0.0, 1.0) as f32
}

fn since(now: Instant, time_added: Instant, fade_duration: Duration) -> f64 {
    now.saturating_duration_since(time_added).as_secs_f64() / fade_duration.as_secs_f64()
}

/// Computes the blend between `tile` and its resolved `ancestor` at
/// wall-clock `now`, where `ideal_zoom` is the covering zoom the view
/// actually wants.
pub fn evaluate_fade(
    tile: &TileRecord,
    ancestor: Option<&TileRecord>,
    fade_duration: Duration,
    now: Instant,
    ideal_zoom: u8,
) -> FadeEvaluation {
    if fade_duration.is_zero() {
        return FadeEvaluation {
            fade: Fade::OPAQUE,
            refresh_window_elapsed: false,
        };
    }

    let since_child = since(now, tile.time_added, fade_duration);
    let since_ancestor = ancestor
        .map(|a| since(now, a.time_added, fade_duration))
        .unwrap_or(-1.0);

    // The child fades in when it is the better LOD match; when the
    // ancestor matches the ideal zoom more closely, the child fades out
    // behind it instead.
    let fade_in = match ancestor {
        None => true,
        Some(a) => {
            let ancestor_dist = (a.id.overscaled_z as i32 - ideal_zoom as i32).abs();
            let child_dist = (tile.id.overscaled_z as i32 - ideal_zoom as i32).abs();
            ancestor_dist > child_dist
        }
    };

    // Tiles swapped in by cache expiry keep full opacity while fading
    // in; re-dissolving an image the user already saw looks like flicker.
    let child_opacity = if fade_in && tile.refreshed_upon_expiration {
        1.0
    } else if fade_in {
        clamp01(since_child)
    } else {
        clamp01(1.0 - since_ancestor)
    };

    let fade = match ancestor {
        Some(_) => Fade {
            opacity: 1.0,
            mix: 1.0 - child_opacity,
        },
        None => Fade {
            opacity: child_opacity,
            mix: 0.0,
        },
    };

    FadeEvaluation {
        fade,
        refresh_window_elapsed: tile.refreshed_upon_expiration && since_child >= 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::TileCoord;
    use crate::core::tile_id::OverscaledTileId;
    use crate::tiles::TextureHandle;

    const FADE: Duration = Duration::from_millis(300);

    fn record(z: u8, time_added: Instant) -> TileRecord {
        TileRecord::new(
            OverscaledTileId::from_coord(TileCoord::new(0, 0, z)),
            TextureHandle(1),
            time_added,
        )
    }

    #[test]
    fn test_zero_duration_disables_fading() {
        let now = Instant::now();
        let tile = record(10, now);
        let ancestor = record(8, now);

        for anc in [None, Some(&ancestor)] {
            let eval = evaluate_fade(&tile, anc, Duration::ZERO, now, 10);
            assert_eq!(eval.fade, Fade::OPAQUE);
            assert!(!eval.refresh_window_elapsed);
        }
    }

    #[test]
    fn test_fade_in_without_ancestor_tracks_elapsed_ratio() {
        let start = Instant::now();
        let tile = record(10, start);

        let mut last = -1.0_f32;
        for ms in [0u64, 75, 150, 225, 300] {
            let now = start + Duration::from_millis(ms);
            let eval = evaluate_fade(&tile, None, FADE, now, 10);
            let expected = ms as f32 / 300.0;
            assert!((eval.fade.opacity - expected).abs() < 1e-6);
            assert_eq!(eval.fade.mix, 0.0);
            // monotonically non-decreasing in `now`
            assert!(eval.fade.opacity >= last);
            last = eval.fade.opacity;
        }
    }

    #[test]
    fn test_half_faded_tile_scenario() {
        let start = Instant::now();
        let tile = record(10, start);
        let now = start + Duration::from_millis(150);

        let eval = evaluate_fade(&tile, None, FADE, now, 10);
        assert!((eval.fade.opacity - 0.5).abs() < 1e-6);
        assert_eq!(eval.fade.mix, 0.0);
    }

    #[test]
    fn test_fade_in_with_ancestor_drains_mix() {
        let start = Instant::now();
        let tile = record(10, start);
        let ancestor = record(8, start - Duration::from_secs(10));

        let mid = evaluate_fade(&tile, Some(&ancestor), FADE, start + FADE / 2, 10);
        assert_eq!(mid.fade.opacity, 1.0);
        assert!((mid.fade.mix - 0.5).abs() < 1e-6);

        // As now grows far past the window, the ancestor fades out fully.
        let late = evaluate_fade(&tile, Some(&ancestor), FADE, start + FADE * 100, 10);
        assert_eq!(late.fade.opacity, 1.0);
        assert_eq!(late.fade.mix, 0.0);
    }

    #[test]
    fn test_fade_out_when_ancestor_is_better_match() {
        // Child at z8, ancestor at z6, ideal zoom 6: the ancestor wins
        // and the child fades out against it.
        let start = Instant::now();
        let tile = record(8, start - Duration::from_secs(5));
        let ancestor = record(6, start - Duration::from_millis(90));

        let now = start;
        // since_ancestor = 90ms / 300ms = 0.3
        let eval = evaluate_fade(&tile, Some(&ancestor), FADE, now, 6);
        assert_eq!(eval.fade.opacity, 1.0);
        assert!((eval.fade.mix - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_refreshed_tile_skips_crossfade_while_fading_in() {
        let start = Instant::now();
        let mut tile = record(10, start);
        tile.refreshed_upon_expiration = true;
        let ancestor = record(8, start - Duration::from_secs(10));

        let eval = evaluate_fade(&tile, Some(&ancestor), FADE, start, 10);
        assert_eq!(eval.fade.opacity, 1.0);
        assert_eq!(eval.fade.mix, 0.0);
    }

    #[test]
    fn test_refresh_window_elapses_exactly_at_one() {
        let start = Instant::now();
        let mut tile = record(10, start);
        tile.refreshed_upon_expiration = true;

        let before = evaluate_fade(&tile, None, FADE, start + Duration::from_millis(299), 10);
        assert!(!before.refresh_window_elapsed);

        let at = evaluate_fade(&tile, None, FADE, start + FADE, 10);
        assert!(at.refresh_window_elapsed);

        // Evaluation alone never clears the flag on the record.
        assert!(tile.refreshed_upon_expiration);
    }

    #[test]
    fn test_unrefreshed_tile_never_reports_window_elapsed() {
        let start = Instant::now();
        let tile = record(10, start);
        let eval = evaluate_fade(&tile, None, FADE, start + FADE * 4, 10);
        assert!(!eval.refresh_window_elapsed);
    }

    #[test]
    fn test_values_stay_clamped() {
        let start = Instant::now();
        let tile = record(10, start);
        let ancestor = record(8, start);

        for ms in [0u64, 1, 299, 300, 10_000] {
            let now = start + Duration::from_millis(ms);
            for anc in [None, Some(&ancestor)] {
                let eval = evaluate_fade(&tile, anc, FADE, now, 9);
                assert!((0.0..=1.0).contains(&eval.fade.opacity));
                assert!((0.0..=1.0).contains(&eval.fade.mix));
            }
        }
    }
}
