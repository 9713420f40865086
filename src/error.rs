use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("fewer than 2 non-empty options")]
    NotEnoughOptions,
    #[error("more than 6 options")]
    TooManyOptions,
    #[error("invalid poll duration")]
    InvalidDuration,
    #[error("poll not found")]
    PollNotFound,
    #[error("poll option not found")]
    OptionNotFound,
    #[error("poll is closed")]
    PollClosed,
    #[error("viewer already voted on this poll")]
    AlreadyVoted,
    #[error("no resolved identity to vote with")]
    GuestVote,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("host platform not available")]
    Unavailable,
    #[error("host rejected the request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl PollError {
    /// Stable message for the toast surface.
    pub fn user_message(&self) -> &'static str {
        match self {
            PollError::EmptyQuestion => "Please enter a question",
            PollError::NotEnoughOptions => "Please add at least 2 options",
            PollError::TooManyOptions => "A poll can have at most 6 options",
            PollError::InvalidDuration => "Please choose a valid duration",
            PollError::PollNotFound => "Poll Not Found",
            PollError::OptionNotFound => "That option does not exist",
            PollError::PollClosed => "This poll has closed",
            PollError::AlreadyVoted => "You already voted on this poll",
            PollError::GuestVote => "Unable to vote",
        }
    }
}

impl BridgeError {
    /// Stable message for the toast surface.
    pub fn user_message(&self) -> &'static str {
        match self {
            BridgeError::Unavailable => {
                "Farcaster SDK not available. Please open this app in the Farcaster client."
            }
            BridgeError::Rejected(_) => "Failed to open composer. Please try again.",
        }
    }
}
