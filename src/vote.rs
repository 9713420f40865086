use chrono::Utc;

use crate::bridge::{self, HostBridge};
use crate::config::AppConfig;
use crate::error::{BridgeError, PollError};
use crate::model::{Fid, Poll};
use crate::store::PollStore;

/// What the poll view is currently showing. `NotFound` is terminal for this
/// view instance; the only way out is navigating back to creation.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    NotFound,
    Ballot(Poll),
    Results(Poll),
}

/// One poll opened for viewing/voting by one viewer.
#[derive(Debug, Clone)]
pub struct PollView {
    viewer: Option<Fid>,
    state: ViewState,
}

/// Results row for one option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionResult {
    pub text: String,
    pub votes: u32,
    /// 0.0 when the poll has no votes at all.
    pub percentage: f64,
    /// Only ever set once the poll has expired; a merely-voted poll shows no
    /// winner yet.
    pub winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollResults {
    pub options: Vec<OptionResult>,
    pub total_votes: u32,
    pub expired: bool,
}

impl PollView {
    /// Looks up the poll and decides the entry state: results when the viewer
    /// has voted or the poll has expired, the ballot otherwise.
    pub fn load(store: &PollStore, poll_id: &str, viewer: Option<Fid>) -> Self {
        let state = match store.get_by_id(poll_id) {
            None => {
                warn!("poll {poll_id} not found");
                ViewState::NotFound
            }
            Some(poll) => {
                if poll.has_voted(viewer) || poll.is_expired() {
                    ViewState::Results(poll)
                } else {
                    ViewState::Ballot(poll)
                }
            }
        };
        PollView { viewer, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn viewer(&self) -> Option<Fid> {
        self.viewer
    }

    pub fn poll(&self) -> Option<&Poll> {
        match &self.state {
            ViewState::NotFound => None,
            ViewState::Ballot(poll) | ViewState::Results(poll) => Some(poll),
        }
    }

    /// Casts the viewer's vote for the option at `option_index`.
    ///
    /// Guests cannot vote. All other guards run inside the store's
    /// transactional update, immediately before the commit, so a stale view
    /// cannot double-count a vote or accept one after expiry: the stored poll
    /// is re-checked, not the one rendered here.
    pub fn cast_vote(&mut self, store: &PollStore, option_index: usize) -> Result<(), PollError> {
        let Some(fid) = self.viewer else {
            return Err(PollError::GuestVote);
        };
        let poll_id = match self.poll() {
            None => return Err(PollError::PollNotFound),
            Some(poll) => poll.id.clone(),
        };

        let now = Utc::now();
        let updated = store.update_with(&poll_id, |poll| {
            if option_index >= poll.options.len() {
                return Err(PollError::OptionNotFound);
            }
            if poll.is_expired_at(now) {
                return Err(PollError::PollClosed);
            }
            if poll.has_voted(Some(fid)) {
                return Err(PollError::AlreadyVoted);
            }
            let option = &mut poll.options[option_index];
            option.votes += 1;
            option.voters.push(fid);
            Ok(())
        })?;

        info!("fid {fid} voted on poll {poll_id}");
        self.state = ViewState::Results(updated);
        Ok(())
    }

    /// Vote counts, percentages, and winner flags for the results screen.
    /// `None` unless the view is showing results.
    pub fn results(&self) -> Option<PollResults> {
        let ViewState::Results(poll) = &self.state else {
            return None;
        };
        let total = poll.total_votes();
        let expired = poll.is_expired();
        let winners = if expired {
            poll.winning_options()
        } else {
            Vec::new()
        };
        let options = poll
            .options
            .iter()
            .enumerate()
            .map(|(idx, opt)| OptionResult {
                text: opt.text.clone(),
                votes: opt.votes,
                percentage: if total > 0 {
                    f64::from(opt.votes) / f64::from(total) * 100.0
                } else {
                    0.0
                },
                winner: winners.contains(&idx),
            })
            .collect();
        Some(PollResults {
            options,
            total_votes: total,
            expired,
        })
    }

    /// Sharing is offered once the viewer has voted, or to the poll's creator
    /// at any time. An anonymous creator cannot be recognized, so a guest
    /// never shares.
    pub fn can_share(&self) -> bool {
        let Some(poll) = self.poll() else {
            return false;
        };
        poll.has_voted(self.viewer) || (self.viewer.is_some() && poll.creator == self.viewer)
    }

    /// The compose text and embed link for this poll.
    pub fn share_message(&self, config: &AppConfig) -> Option<(String, String)> {
        let poll = self.poll()?;
        let text = format!("🗳️ Vote: {}", poll.question);
        let url = format!("{}?poll={}", config.app_url, poll.id);
        Some((text, url))
    }

    /// Hands the share template to the host compose surface. Failures come
    /// back to the caller for a user-visible message; nothing raises.
    pub fn share(&self, bridge: &impl HostBridge, config: &AppConfig) -> Result<(), BridgeError> {
        let (text, url) = self.share_message(config).ok_or(BridgeError::Unavailable)?;
        bridge::compose_cast(bridge, &text, &url)
    }
}
