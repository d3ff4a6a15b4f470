use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::{validate_photo_url, validate_player_name},
    state::player::Player,
};

/// Rating given to players created without one.
pub const DEFAULT_NEW_PLAYER_POINTS: i32 = 500;

/// Player fields supplied when creating or editing a roster entry.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlayerInput {
    pub name: String,
    /// Rating; defaults to 500 when omitted.
    #[serde(default)]
    pub points: Option<i32>,
    /// Optional `data:image/...` URI; `null` removes the photo.
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }

        if let Some(ref photo) = self.photo_url {
            if let Err(e) = validate_photo_url(photo) {
                errors.add("photoURL", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Roster listing, ranked by points.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    pub players: Vec<Player>,
}

/// Search filter of the player picker.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PickerQuery {
    /// Case-insensitive substring of the player name.
    #[serde(default)]
    pub search: String,
}

/// Explicit confirmation required to delete a roster entry.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Must be `true`.
    #[serde(default)]
    pub confirm: bool,
}
