use std::time::Duration;

use tokio::time::sleep;

use crate::error::PollError;
use crate::model::{Fid, Poll, PollDuration};
use crate::store::{PollStore, RECENT_LIMIT};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

/// The poll creation form. Mirrors what the user is editing; nothing touches
/// storage until a submit passes validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateForm {
    pub question: String,
    pub options: Vec<String>,
    pub duration: PollDuration,
}

impl Default for CreateForm {
    fn default() -> Self {
        CreateForm {
            question: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
            duration: PollDuration::default(),
        }
    }
}

impl CreateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub fn set_duration(&mut self, duration: PollDuration) {
        self.duration = duration;
    }

    /// Adds an empty option row; no-op once the form holds 6.
    pub fn add_option(&mut self) -> bool {
        if self.options.len() >= MAX_OPTIONS {
            return false;
        }
        self.options.push(String::new());
        true
    }

    /// Removes an option row; no-op at the 2-row floor or out of range.
    pub fn remove_option(&mut self, index: usize) -> bool {
        if self.options.len() <= MIN_OPTIONS || index >= self.options.len() {
            return false;
        }
        self.options.remove(index);
        true
    }

    pub fn set_option(&mut self, index: usize, text: impl Into<String>) {
        if let Some(slot) = self.options.get_mut(index) {
            *slot = text.into();
        }
    }

    /// Checks the form and returns the trimmed question plus the non-empty
    /// trimmed options. Blank rows are skipped, not errors.
    pub fn validate(&self) -> Result<(String, Vec<String>), PollError> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(PollError::EmptyQuestion);
        }
        let options: Vec<String> = self
            .options
            .iter()
            .map(|opt| opt.trim())
            .filter(|opt| !opt.is_empty())
            .map(str::to_string)
            .collect();
        if options.len() < MIN_OPTIONS {
            return Err(PollError::NotEnoughOptions);
        }
        if options.len() > MAX_OPTIONS {
            return Err(PollError::TooManyOptions);
        }
        Ok((question.to_string(), options))
    }

    /// Validates, builds the poll, and commits it. On success the form resets
    /// to its initial empty state. Validation failures mutate nothing.
    ///
    /// The delay before the commit is deliberate: it lets a pending indicator
    /// register on screen before the synchronous store write lands.
    pub async fn submit(
        &mut self,
        store: &PollStore,
        creator: Option<Fid>,
        delay: Duration,
    ) -> Result<Poll, PollError> {
        let (question, options) = self.validate()?;
        sleep(delay).await;

        let poll = Poll::new(question, options, self.duration, creator);
        store.add(poll.clone());
        info!("created poll {} with {} options", poll.id, poll.options.len());

        *self = Self::default();
        Ok(poll)
    }
}

/// One row of the recent-polls list under the form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentPoll {
    pub id: String,
    pub question: String,
    pub total_votes: u32,
    pub expired: bool,
}

/// At most 5 polls, newest-created first, summarized the way the list renders
/// them.
pub fn recent_polls(store: &PollStore) -> Vec<RecentPoll> {
    store
        .get_recent(RECENT_LIMIT)
        .into_iter()
        .map(|poll| RecentPoll {
            total_votes: poll.total_votes(),
            expired: poll.is_expired(),
            id: poll.id,
            question: poll.question,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const NO_DELAY: Duration = Duration::from_millis(0);

    fn filled_form(question: &str, options: &[&str]) -> CreateForm {
        let mut form = CreateForm::new();
        form.set_question(question);
        form.options = options.iter().map(|s| s.to_string()).collect();
        form
    }

    #[tokio::test]
    async fn submit_creates_poll_and_resets_form() {
        let store = PollStore::in_memory();
        let mut form = filled_form("Best meal?", &["breakfast", "lunch", "dinner"]);
        form.set_duration("24".parse().unwrap());

        let poll = form
            .submit(&store, Some(Fid(7)), NO_DELAY)
            .await
            .unwrap();

        assert_eq!(poll.question, "Best meal?");
        assert_eq!(poll.options.len(), 3);
        assert_eq!(poll.expires_at - poll.created_at, ChronoDuration::hours(24));
        assert_eq!(poll.creator, Some(Fid(7)));
        assert!(poll.options.iter().all(|o| o.votes == 0 && o.voters.is_empty()));

        assert_eq!(store.get_by_id(&poll.id).unwrap(), poll);
        assert_eq!(form, CreateForm::default());
    }

    #[tokio::test]
    async fn anonymous_creation_is_allowed() {
        let store = PollStore::in_memory();
        let mut form = filled_form("Guest poll?", &["a", "b"]);
        let poll = form.submit(&store, None, NO_DELAY).await.unwrap();
        assert_eq!(poll.creator, None);
    }

    #[tokio::test]
    async fn empty_question_is_rejected_without_mutation() {
        let store = PollStore::in_memory();
        let mut form = filled_form("   ", &["a", "b"]);
        let result = form.submit(&store, Some(Fid(1)), NO_DELAY).await;
        assert!(matches!(result, Err(PollError::EmptyQuestion)));
        assert!(store.get_all().is_empty());
        // The form keeps what the user typed.
        assert_eq!(form.options, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn single_nonempty_option_is_rejected() {
        let store = PollStore::in_memory();
        let mut form = filled_form("Question?", &["a", "   "]);
        let result = form.submit(&store, Some(Fid(1)), NO_DELAY).await;
        assert!(matches!(result, Err(PollError::NotEnoughOptions)));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn blank_rows_are_skipped_and_texts_trimmed() {
        let form = filled_form("Q?", &["  a  ", "", "b", "  "]);
        let (question, options) = form.validate().unwrap();
        assert_eq!(question, "Q?");
        assert_eq!(options, vec!["a", "b"]);
    }

    #[test]
    fn option_rows_stay_between_2_and_6() {
        let mut form = CreateForm::new();
        assert_eq!(form.options.len(), 2);
        assert!(!form.remove_option(0));

        for _ in 0..4 {
            assert!(form.add_option());
        }
        assert_eq!(form.options.len(), 6);
        assert!(!form.add_option());

        assert!(form.remove_option(5));
        assert_eq!(form.options.len(), 5);
    }

    #[test]
    fn overfilled_form_is_rejected() {
        // Bypasses the row helpers on purpose.
        let form = filled_form("Q?", &["a", "b", "c", "d", "e", "f", "g"]);
        assert!(matches!(form.validate(), Err(PollError::TooManyOptions)));
    }

    #[tokio::test]
    async fn recent_polls_cap_at_five_newest_first() {
        let store = PollStore::in_memory();
        for i in 0..6 {
            let mut form = filled_form(&format!("poll {i}?"), &["a", "b"]);
            form.submit(&store, None, NO_DELAY).await.unwrap();
        }

        let recent = recent_polls(&store);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].question, "poll 5?");
        assert_eq!(recent[4].question, "poll 1?");
        assert!(recent.iter().all(|r| r.total_votes == 0 && !r.expired));
    }
}
