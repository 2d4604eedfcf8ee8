use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A simulated player with a known ("true") skill rating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(rename = "elo")]
    pub true_elo: i64,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>, true_elo: i64) -> Self {
        Self {
            name: name.into(),
            true_elo,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("player name '{name}' appears more than once in the pool")]
pub struct DuplicatePlayerError {
    pub name: String,
}

/// The ground-truth population of a simulation run.
///
/// Player names are unique. The pool is immutable once built and is shared
/// read-only by every fitness evaluation of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlayerPool {
    players: Vec<Player>,
}

impl PlayerPool {
    /// Builds a pool, rejecting duplicate names.
    pub fn new(players: Vec<Player>) -> Result<Self, DuplicatePlayerError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.name.as_str()) {
                return Err(DuplicatePlayerError {
                    name: player.name.clone(),
                });
            }
        }
        Ok(Self { players })
    }

    /// Players in insertion order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.players.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let err = PlayerPool::new(vec![
            Player::new("A", 1000),
            Player::new("B", 1200),
            Player::new("A", 1500),
        ])
        .unwrap_err();
        assert_eq!(err.name, "A");
    }

    #[test]
    fn lookup_by_name() {
        let pool = PlayerPool::new(vec![Player::new("A", 1000), Player::new("B", 1200)]).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get("B").map(|p| p.true_elo), Some(1200));
        assert!(pool.get("C").is_none());
        assert_eq!(pool.names().collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn serializes_as_list_of_name_and_elo() {
        let pool = PlayerPool::new(vec![Player::new("Player-1", 1532)]).unwrap();
        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(json, r#"[{"name":"Player-1","elo":1532}]"#);
    }
}
