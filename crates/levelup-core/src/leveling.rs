//! Leveling curve.
//!
//! Cumulative XP needed to reach level `L` is `500 * L * (L - 1)`:
//!
//! | Level | Total XP | Gap to next |
//! |-------|----------|-------------|
//! | 1     | 0        | 1000        |
//! | 2     | 1000     | 2000        |
//! | 3     | 3000     | 3000        |
//! | 4     | 6000     | 4000        |
//!
//! All functions are pure and total: out-of-range inputs are clamped.

use serde::{Deserialize, Serialize};

/// XP gap multiplier: the gap from level `L` to `L + 1` is `XP_GAP_PER_LEVEL * L`.
pub const XP_GAP_PER_LEVEL: i64 = 1000;

/// Lowest attainable level.
pub const MIN_LEVEL: u32 = 1;

/// Highest level the curve resolves; its threshold still fits in an `i64`.
pub const MAX_LEVEL: u32 = 100_000_000;

/// Cumulative XP required to reach `level`.
///
/// Levels at or below 1 need no XP. Saturates instead of overflowing past
/// [`MAX_LEVEL`].
pub fn total_xp_for_level(level: u32) -> i64 {
    if level <= MIN_LEVEL {
        return 0;
    }
    let l = i64::from(level);
    500_i64.saturating_mul(l).saturating_mul(l - 1)
}

/// Level reached with `xp` cumulative experience.
///
/// Negative XP clamps to level 1 and the result never exceeds [`MAX_LEVEL`].
/// The closed-form inverse `floor((1 + sqrt(1 + xp / 125)) / 2)` is corrected
/// against the integer thresholds so boundaries are exact.
pub fn level_from_xp(xp: i64) -> u32 {
    if xp < 0 {
        return MIN_LEVEL;
    }

    let estimate = ((1.0 + (1.0 + xp as f64 / 125.0).sqrt()) / 2.0).floor();
    let mut level = if estimate.is_finite() && estimate >= 1.0 {
        estimate.min(f64::from(MAX_LEVEL)) as u32
    } else {
        MIN_LEVEL
    };

    while level > MIN_LEVEL && total_xp_for_level(level) > xp {
        level -= 1;
    }
    while level < MAX_LEVEL && total_xp_for_level(level + 1) <= xp {
        level += 1;
    }
    level
}

/// XP gap between `level` and the next one.
pub fn xp_for_next_level(level: u32) -> i64 {
    XP_GAP_PER_LEVEL.saturating_mul(i64::from(level.max(MIN_LEVEL)))
}

/// Progress inside the current level band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// XP earned since the start of the current level (may be negative on skewed input)
    pub current: i64,
    /// XP span of the current level
    pub needed: i64,
    /// `current / needed`, clamped into `[0, 1]`
    pub percentage: f64,
}

/// Progress from `current_level` towards the next level given `current_xp`.
///
/// The percentage is clamped into `[0, 1]` even when `current_xp` does not belong
/// to `current_level`. Levels below 1 are treated as 1.
pub fn progress_to_next_level(current_xp: i64, current_level: u32) -> Progress {
    let level = current_level.max(MIN_LEVEL);
    let start = total_xp_for_level(level);
    let next = total_xp_for_level(level.saturating_add(1));
    let needed = next - start;
    let current = current_xp.saturating_sub(start);

    let percentage = if needed > 0 {
        (current as f64 / needed as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Progress {
        current,
        needed,
        percentage,
    }
}
