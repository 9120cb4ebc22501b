//! Experience and level derivation.
//!
//! Every value here is a pure function of the lifetime completion counter.
//! Nothing is stored; callers recompute after each toggle. Levels can go
//! down when a habit is unchecked.

use serde::{Deserialize, Serialize};

/// Experience awarded per completed habit.
pub const XP_PER_COMPLETION: u64 = 25;

/// Experience span of one level.
pub const XP_PER_LEVEL: u64 = 100;

pub fn experience(total_completed: u64) -> u64 {
    total_completed.saturating_mul(XP_PER_COMPLETION)
}

/// `floor(experience / 100) + 1`
pub fn level(total_completed: u64) -> u64 {
    experience(total_completed) / XP_PER_LEVEL + 1
}

/// `100 - (experience mod 100)`; a full 100 on an exact level boundary.
pub fn xp_to_next_level(total_completed: u64) -> u64 {
    XP_PER_LEVEL - experience(total_completed) % XP_PER_LEVEL
}

/// Derived progression values for one counter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub experience: u64,
    pub level: u64,
    pub xp_to_next_level: u64,
    /// Experience earned inside the current level (0..100).
    pub xp_into_level: u64,
}

impl Progress {
    pub fn from_total(total_completed: u64) -> Self {
        let experience = experience(total_completed);
        Self {
            experience,
            level: level(total_completed),
            xp_to_next_level: xp_to_next_level(total_completed),
            xp_into_level: experience % XP_PER_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_completions_is_level_one() {
        let p = Progress::from_total(0);
        assert_eq!(p.experience, 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.xp_to_next_level, 100);
    }

    #[test]
    fn exact_multiple_rolls_over_to_next_level() {
        let p = Progress::from_total(4);
        assert_eq!(p.experience, 100);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp_to_next_level, 100);
        assert_eq!(p.xp_into_level, 0);
    }

    #[test]
    fn partial_level() {
        let p = Progress::from_total(7);
        assert_eq!(p.experience, 175);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp_to_next_level, 25);
        assert_eq!(p.xp_into_level, 75);
    }

    #[test]
    fn level_follows_counter_down() {
        assert_eq!(level(8), 3);
        assert_eq!(level(7), 2);
    }
}
