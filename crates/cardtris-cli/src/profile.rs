//! Player profiles: lifetime score, best score and the unlocked card pool.
//!
//! All profiles live in one JSON file mapping player name to profile.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use cardtris_engine::{CATALOG_LEN, SessionSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::util;

/// Lifetime score needed to unlock each catalog card, by catalog index.
pub const UNLOCK_THRESHOLDS: [u64; CATALOG_LEN] = [
    // common
    100, 300, 600, 1000, 1500, 2000, //
    // epic
    3000, 5000, 7500, 10000, 15000, 20000, //
    // legendary
    25000, 35000, 50000, 75000, 100_000, 150_000,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            sfx_volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub total_score: u64,
    pub best_score: u64,
    pub games_played: u32,
    /// Catalog indices in the order they were unlocked.
    pub unlocked_cards: Vec<usize>,
    pub created_date: DateTime<Local>,
    pub last_played: DateTime<Local>,
    #[serde(default)]
    pub settings: PlayerSettings,
}

impl PlayerProfile {
    pub fn new(name: &str, now: DateTime<Local>) -> Self {
        Self {
            name: name.to_owned(),
            total_score: 0,
            best_score: 0,
            games_played: 0,
            unlocked_cards: vec![],
            created_date: now,
            last_played: now,
            settings: PlayerSettings::default(),
        }
    }

    /// Adds a finished session to the totals and unlocks every card whose
    /// threshold the lifetime score has reached.
    ///
    /// Returns the newly unlocked catalog indices.
    pub fn record_session(&mut self, summary: &SessionSummary, now: DateTime<Local>) -> Vec<usize> {
        self.total_score += summary.score;
        self.games_played += 1;
        self.best_score = self.best_score.max(summary.score);
        self.last_played = now;

        let newly_unlocked: Vec<usize> = UNLOCK_THRESHOLDS
            .iter()
            .enumerate()
            .filter(|(index, threshold)| {
                self.total_score >= **threshold && !self.unlocked_cards.contains(index)
            })
            .map(|(index, _)| index)
            .collect();
        self.unlocked_cards.extend_from_slice(&newly_unlocked);
        newly_unlocked
    }
}

/// The profile file, loaded into memory.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, PlayerProfile>,
}

impl ProfileStore {
    /// Loads the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let profiles = if path.exists() {
            util::read_json_file("profile", path)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_owned(),
            profiles,
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        util::write_json_file(&self.profiles, &self.path)?;
        log::debug!("saved {} profiles to {}", self.profiles.len(), self.path.display());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PlayerProfile> {
        self.profiles.get(name)
    }

    /// Returns the profile named `name`, creating it if needed. An existing
    /// profile gets its last played time refreshed.
    pub fn get_or_create(&mut self, name: &str, now: DateTime<Local>) -> &mut PlayerProfile {
        self.profiles
            .entry(name.to_owned())
            .and_modify(|profile| profile.last_played = now)
            .or_insert_with(|| {
                log::info!("created profile {name:?}");
                PlayerProfile::new(name, now)
            })
    }

    /// Profiles by best score, highest first, at most `limit`.
    pub fn leaderboard(&self, limit: usize) -> Vec<&PlayerProfile> {
        let mut profiles: Vec<&PlayerProfile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| b.best_score.cmp(&a.best_score));
        profiles.truncate(limit);
        profiles
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.profiles.remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use cardtris_engine::SessionSeed;
    use chrono::TimeZone as _;

    use super::*;

    fn time(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    fn summary(score: u64) -> SessionSummary {
        SessionSummary {
            seed: SessionSeed::from_bytes([0; 16]),
            score,
            lines_cleared: 0,
            level: 1,
            best_clear: 0,
            pieces_locked: 0,
            cards_used: 0,
            ticks: 0,
        }
    }

    fn store() -> ProfileStore {
        ProfileStore {
            path: PathBuf::from("unused.json"),
            profiles: BTreeMap::new(),
        }
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = PlayerProfile::new("ana", time(9));
        assert_eq!(profile.games_played, 0);
        assert!(profile.unlocked_cards.is_empty());
        assert_eq!(profile.settings, PlayerSettings::default());
        assert_eq!(profile.created_date, profile.last_played);
    }

    #[test]
    fn test_record_session_unlocks_by_lifetime_score() {
        let mut profile = PlayerProfile::new("ana", time(9));
        assert!(profile.record_session(&summary(99), time(10)).is_empty());

        // 99 + 250 crosses 100 and 300.
        assert_eq!(profile.record_session(&summary(250), time(11)), [0, 1]);
        assert_eq!(profile.total_score, 349);
        assert_eq!(profile.best_score, 250);
        assert_eq!(profile.games_played, 2);
        assert_eq!(profile.last_played, time(11));

        // A weaker game still counts towards the total.
        assert_eq!(profile.record_session(&summary(300), time(12)), [2]);
        assert_eq!(profile.best_score, 300);
        assert_eq!(profile.unlocked_cards, [0, 1, 2]);
    }

    #[test]
    fn test_record_session_fills_gaps_once() {
        let mut profile = PlayerProfile::new("ana", time(9));
        profile.unlocked_cards = vec![5];
        let unlocked = profile.record_session(&summary(150_000), time(10));
        assert_eq!(unlocked.len(), CATALOG_LEN - 1);
        assert!(!unlocked.contains(&5));
        assert_eq!(profile.unlocked_cards.len(), CATALOG_LEN);
        assert!(profile.record_session(&summary(0), time(11)).is_empty());
    }

    #[test]
    fn test_get_or_create_refreshes_last_played() {
        let mut store = store();
        store.get_or_create("ana", time(9)).total_score = 42;
        let profile = store.get_or_create("ana", time(15));
        assert_eq!(profile.total_score, 42);
        assert_eq!(profile.created_date, time(9));
        assert_eq!(profile.last_played, time(15));
    }

    #[test]
    fn test_leaderboard_and_delete() {
        let mut store = store();
        for (name, best) in [("ana", 500), ("bo", 1200), ("cy", 800)] {
            store.get_or_create(name, time(9)).best_score = best;
        }
        let names: Vec<&str> = store
            .leaderboard(2)
            .iter()
            .map(|profile| profile.name.as_str())
            .collect();
        assert_eq!(names, ["bo", "cy"]);

        assert!(store.delete("bo"));
        assert!(!store.delete("bo"));
        assert!(store.get("bo").is_none());
        assert_eq!(store.leaderboard(10).len(), 2);
    }

    #[test]
    fn test_profile_json_shape() {
        let mut profile = PlayerProfile::new("ana", time(9));
        profile.record_session(&summary(120), time(10));
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["unlocked_cards"], serde_json::json!([0]));
        assert_eq!(json["games_played"], 1);
        assert!(json["created_date"].is_string());

        let parsed: PlayerProfile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, profile);
    }
}
