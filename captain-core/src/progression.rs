use captain_types::{RewardEvent, UserProfile};

pub const XP_PER_LEVEL: u32 = 100;

/// Xp and stars granted for finishing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub xp: u32,
    pub stars: u32,
}

impl Reward {
    pub const fn new(xp: u32, stars: u32) -> Self {
        Self { xp, stars }
    }

    pub fn for_event(event: RewardEvent) -> Self {
        match event {
            RewardEvent::AstroNavComplete => Reward::new(100, 1),
            RewardEvent::TypingComplete => Reward::new(50, 1),
            RewardEvent::GameGenerated => Reward::new(50, 1),
        }
    }
}

pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Produce the profile that results from granting `xp_gain` and `star_gain`.
///
/// Pure: the input is left untouched and nothing is persisted. Gains are
/// unsigned and additions saturate, so xp and stars never go down.
pub fn apply_reward(profile: &UserProfile, xp_gain: u32, star_gain: u32) -> UserProfile {
    let xp = profile.xp.saturating_add(xp_gain);
    let stars = profile.stars.saturating_add(star_gain);

    UserProfile {
        xp,
        stars,
        level: level_for_xp(xp),
        ..profile.clone()
    }
}

pub fn apply_event(profile: &UserProfile, event: RewardEvent) -> UserProfile {
    let reward = Reward::for_event(event);
    apply_reward(profile, reward.xp, reward.stars)
}
