use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{PlayerUuid, Username};
use crate::forms::FormError;

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Validate)]
/// Body of `POST /api/session` and payload of the `join` event.
pub struct SessionForm {
    /// Requested display name; blank means "keep" or "default".
    #[validate(length(max = 256))]
    #[serde(default)]
    pub username: Option<String>,
    /// Uuid remembered by the browser from a previous visit.
    #[validate(length(max = 64))]
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /api/session/username`.
pub struct UsernameForm {
    #[validate(length(min = 1, max = 256))]
    pub username: String,
}

/// Validated [`SessionForm`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerRequest {
    /// `None` when missing or malformed; an unknown uuid starts a new player.
    pub uuid: Option<PlayerUuid>,
    pub username: Option<Username>,
}

impl TryFrom<SessionForm> for PlayerRequest {
    type Error = FormError;

    fn try_from(form: SessionForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let username = form
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Username::new)
            .transpose()
            .map_err(FormError::InvalidUsername)?;

        let uuid = form.uuid.and_then(|uuid| PlayerUuid::new(uuid).ok());

        Ok(Self { uuid, username })
    }
}

impl TryFrom<UsernameForm> for Username {
    type Error = FormError;

    fn try_from(form: UsernameForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Username::new(form.username).map_err(FormError::InvalidUsername)
    }
}
