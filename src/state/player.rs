use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Player record as kept in the roster and copied into a table seat.
///
/// A seat holds its own clone, so later roster edits never rewrite a match
/// that is already running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Identifier unique within a roster.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rating used to rank the roster.
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: i32,
    /// Optional photo as a `data:` URI.
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl Player {
    /// Placeholder bound to a seat before anyone is picked ("Player 1", id `p1`).
    pub fn placeholder(seat_number: usize) -> Self {
        Self {
            id: format!("p{seat_number}"),
            name: format!("Player {seat_number}"),
            points: 0,
            photo_url: None,
        }
    }
}

/// Treat an explicit `null` like a missing value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_by_seat() {
        let third = Player::placeholder(3);
        assert_eq!(third.id, "p3");
        assert_eq!(third.name, "Player 3");
        assert_eq!(third.points, 0);
    }

    #[test]
    fn null_points_and_missing_photo_fall_back() {
        let player: Player =
            serde_json::from_str(r#"{"id":"x","name":"Siva","points":null}"#).unwrap();
        assert_eq!(player.points, 0);
        assert_eq!(player.photo_url, None);
    }

    #[test]
    fn photo_uses_legacy_key() {
        let player = Player {
            id: "new-1".into(),
            name: "Ted".into(),
            points: 640,
            photo_url: Some("data:image/png;base64,AAAA".into()),
        };
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["photoURL"], "data:image/png;base64,AAAA");
    }
}
