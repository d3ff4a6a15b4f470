use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::state::player::Player;

/// Names used to seed an empty roster.
pub const DEFAULT_SEED_NAMES: [&str; 56] = [
    "Adrian", "AJ", "Aldrin", "Aldwin", "Alfie", "AllanC", "Anthony", "Arys", "Boj", "Brandon",
    "Clarke", "Dave", "Dennis", "Dunn", "Ebet", "Ed", "Erwin", "Gem", "Hans", "Hervin", "Huber",
    "Ivan", "Jarland", "Joemz", "Joelski", "Johner", "Jonas", "Joey", "JP", "Khristian", "Louie",
    "Louie S.", "Marlon", "Nikko", "Owen", "Padi", "Patrick", "Renz", "Reymund", "Richard",
    "Robbie", "Sherwin", "Shierwin", "Siva", "Ted", "Terrel", "Varan", "VJ", "Warren", "Topher",
    "Dennel", "Jerome", "Emerson", "Tom", "Jun", "Chito",
];

/// Ordered player collection, ranked by points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
    last_issued_ms: i128,
}

impl Roster {
    /// Build a roster from stored records.
    pub fn from_players(players: Vec<Player>) -> Self {
        let mut roster = Self {
            players,
            last_issued_ms: 0,
        };
        roster.rank();
        roster
    }

    /// Seed roster with ids `p-<index>` and hash-derived ratings.
    pub fn seeded<S: AsRef<str>>(names: &[S]) -> Self {
        let players = names
            .iter()
            .enumerate()
            .map(|(index, name)| Player {
                id: format!("p-{index}"),
                name: name.as_ref().to_string(),
                points: seed_points(name.as_ref()),
                photo_url: None,
            })
            .collect();
        Self::from_players(players)
    }

    /// Players ranked by points (descending), ties broken by id.
    pub fn list(&self) -> &[Player] {
        &self.players
    }

    /// Look a player up by id.
    pub fn find(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Insert a new player with a fresh time-derived id.
    pub fn create(&mut self, name: String, points: i32, photo_url: Option<String>) -> Player {
        let now_ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        self.create_at(now_ms, name, points, photo_url)
    }

    pub(crate) fn create_at(
        &mut self,
        now_ms: i128,
        name: String,
        points: i32,
        photo_url: Option<String>,
    ) -> Player {
        let player = Player {
            id: self.next_id(now_ms),
            name,
            points,
            photo_url,
        };
        self.players.push(player.clone());
        self.rank();
        player
    }

    /// Replace a player's fields. Unknown ids are a no-op returning `None`.
    pub fn update(
        &mut self,
        id: &str,
        name: String,
        points: i32,
        photo_url: Option<String>,
    ) -> Option<Player> {
        let player = self.players.iter_mut().find(|player| player.id == id)?;
        player.name = name;
        player.points = points;
        player.photo_url = photo_url;
        let updated = player.clone();
        self.rank();
        Some(updated)
    }

    /// Remove a player, returning whether one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|player| player.id != id);
        self.players.len() != before
    }

    /// Picker view: players sorted by name, filtered by a case-insensitive
    /// substring of the name.
    pub fn search(&self, query: &str) -> Vec<Player> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<Player> = self
            .players
            .iter()
            .filter(|player| player.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| by_name(a, b));
        matches
    }

    fn next_id(&mut self, now_ms: i128) -> String {
        let mut candidate = now_ms.max(self.last_issued_ms + 1);
        while self.find(&format!("new-{candidate}")).is_some() {
            candidate += 1;
        }
        self.last_issued_ms = candidate;
        format!("new-{candidate}")
    }

    fn rank(&mut self) {
        self.players.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

fn by_name(a: &Player, b: &Player) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Deterministic seed rating in `500..1000`.
///
/// Mirrors the rolling hash the browser roster used
/// (`hash = code + ((hash << 5) - hash)` over UTF-16 units, where only the
/// shift operand is truncated to 32 bits), so seeded ratings match data saved
/// by earlier versions.
pub fn seed_points(name: &str) -> i32 {
    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        hash = i64::from(unit) + (shifted - hash);
    }
    500 + (hash.unsigned_abs() % 500) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str, points: i32) -> Player {
        Player {
            id: id.into(),
            name: name.into(),
            points,
            photo_url: None,
        }
    }

    #[test]
    fn seed_points_match_rolling_hash() {
        assert_eq!(seed_points("AJ"), 589);
        assert_eq!(seed_points("Ed"), 739);
        assert_eq!(seed_points(""), 500);
        for name in DEFAULT_SEED_NAMES {
            let points = seed_points(name);
            assert!((500..1000).contains(&points), "{name} -> {points}");
            assert_eq!(points, seed_points(name));
        }
    }

    #[test]
    fn seeded_roster_is_ranked() {
        let roster = Roster::seeded(&DEFAULT_SEED_NAMES);
        assert_eq!(roster.list().len(), 56);
        assert!(
            roster
                .list()
                .windows(2)
                .all(|pair| pair[0].points >= pair[1].points)
        );
        assert!(roster.find("p-55").is_some_and(|p| p.name == "Chito"));
    }

    #[test]
    fn create_inserts_once_at_rank_position() {
        let mut roster = Roster::from_players(vec![
            player("p-0", "Adrian", 900),
            player("p-1", "Boj", 600),
        ]);
        let created = roster.create_at(1_700_000_000_000, "Nikko".into(), 750, None);

        assert_eq!(created.id, "new-1700000000000");
        let ids: Vec<&str> = roster.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p-0", "new-1700000000000", "p-1"]);
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut roster = Roster::default();
        let first = roster.create_at(42, "A".into(), 500, None);
        let second = roster.create_at(42, "B".into(), 500, None);
        let third = roster.create_at(10, "C".into(), 500, None);
        assert_eq!(first.id, "new-42");
        assert_eq!(second.id, "new-43");
        assert_eq!(third.id, "new-44");
    }

    #[test]
    fn ties_break_on_id() {
        let roster = Roster::from_players(vec![
            player("p-9", "Owen", 700),
            player("p-2", "Arys", 700),
        ]);
        assert_eq!(roster.list()[0].id, "p-2");
    }

    #[test]
    fn update_reranks_and_ignores_unknown_ids() {
        let mut roster = Roster::from_players(vec![
            player("p-0", "Adrian", 900),
            player("p-1", "Boj", 600),
        ]);
        let updated = roster.update("p-1", "Boj".into(), 950, None).unwrap();
        assert_eq!(updated.points, 950);
        assert_eq!(roster.list()[0].id, "p-1");

        let before = roster.clone();
        assert!(roster.update("missing", "X".into(), 1, None).is_none());
        assert_eq!(roster, before);
    }

    #[test]
    fn delete_removes_player() {
        let mut roster = Roster::seeded(&["Ted", "Tom"]);
        assert!(roster.delete("p-0"));
        assert!(roster.list().iter().all(|p| p.id != "p-0"));
        assert!(!roster.delete("p-0"));
    }

    #[test]
    fn search_filters_case_insensitively_and_sorts_by_name() {
        let roster = Roster::from_players(vec![
            player("p-0", "Sherwin", 900),
            player("p-1", "Erwin", 600),
            player("p-2", "Warren", 800),
            player("p-3", "shierwin", 700),
        ]);

        let names: Vec<String> = roster.search("ERW").into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Erwin", "Sherwin"]);

        let everyone: Vec<String> = roster.search("").into_iter().map(|p| p.name).collect();
        assert_eq!(everyone, ["Erwin", "Sherwin", "shierwin", "Warren"]);
    }
}
