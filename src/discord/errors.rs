use serenity::http::HttpError;
use thiserror::Error;

/// Why a raw icon token or attachment was refused. The message is shown to the member as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IconRejection {
    #[error("Invalid emoji {0} passed in.")]
    InvalidEmoji(String),

    #[error("Error while finding Discord emoji {0}. Emoji may not exist in this guild or is invalid.")]
    EmojiNotFound(String),

    #[error("No attachment received.")]
    NoAttachment,

    #[error("Non-image attachment received.")]
    NonImage,

    #[error("Error while processing attachment.")]
    AttachmentUnreadable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Discord answered and refused the request (permissions, rate limit, bad payload).
    #[error("{0}")]
    Rejected(String),

    #[error("Role directory unavailable: {0}")]
    Unavailable(String),
}

impl From<serenity::Error> for DirectoryError {
    fn from(err: serenity::Error) -> Self {
        match err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
                DirectoryError::Rejected(response.error.message)
            }
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(reqwest::StatusCode),
}

/// Negative outcome of a resolver operation. Not a crash; it is reported back to the member.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleIconFailure {
    #[error("No role exists.")]
    NoRoleExists,

    #[error("{0}")]
    Directory(String),
}

/// Anything a handler did not expect. Logged in full, never shown to the member.
#[derive(Error, Debug)]
pub enum RoleIconError {
    #[error("Command was not invoked from a guild")]
    MissingGuild,

    #[error("Handler panicked: {0}")]
    Panicked(String),
}
