use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PollError;

/// Viewer identity as resolved by the embedding host (a Farcaster fid).
/// Guests have no `Fid`; code that needs one takes `Option<Fid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(pub u64);

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How long a poll accepts votes, picked from a fixed menu at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollDuration {
    Hour1,
    Hour6,
    #[default]
    Hour24,
    Day3,
    Day7,
}

impl PollDuration {
    pub const ALL: [PollDuration; 5] = [
        PollDuration::Hour1,
        PollDuration::Hour6,
        PollDuration::Hour24,
        PollDuration::Day3,
        PollDuration::Day7,
    ];

    pub fn hours(self) -> i64 {
        match self {
            PollDuration::Hour1 => 1,
            PollDuration::Hour6 => 6,
            PollDuration::Hour24 => 24,
            PollDuration::Day3 => 72,
            PollDuration::Day7 => 168,
        }
    }

    pub fn length(self) -> Duration {
        Duration::hours(self.hours())
    }

    pub fn label(self) -> &'static str {
        match self {
            PollDuration::Hour1 => "1 Hour",
            PollDuration::Hour6 => "6 Hours",
            PollDuration::Hour24 => "24 Hours",
            PollDuration::Day3 => "3 Days",
            PollDuration::Day7 => "7 Days",
        }
    }
}

impl FromStr for PollDuration {
    type Err = PollError;

    /// Parses the form value, which is the duration in hours ("1" .. "168").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours: i64 = s.trim().parse().map_err(|_| PollError::InvalidDuration)?;
        PollDuration::ALL
            .into_iter()
            .find(|d| d.hours() == hours)
            .ok_or(PollError::InvalidDuration)
    }
}

/// One selectable answer, owned by its poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub votes: u32,
    pub voters: Vec<Fid>,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        PollOption {
            text: text.into(),
            votes: 0,
            voters: Vec::new(),
        }
    }
}

/// A question with a fixed, ordered set of options and an expiry time.
///
/// Serde field names keep the abbreviated layout the stored blob has always
/// used, so data persisted by earlier releases round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "opts")]
    pub options: Vec<PollOption>,
    #[serde(rename = "created", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expires", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "creator")]
    pub creator: Option<Fid>,
}

impl Poll {
    /// Builds a fresh poll from already-validated inputs. The id is a v4 uuid
    /// rendered without dashes: opaque, link-safe, 122 bits of entropy.
    pub fn new(
        question: String,
        options: Vec<String>,
        duration: PollDuration,
        creator: Option<Fid>,
    ) -> Self {
        // The blob stores timestamps as epoch milliseconds; truncate up front
        // so a fresh poll compares equal to its stored copy.
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Poll {
            id: Uuid::new_v4().simple().to_string(),
            question,
            options: options.into_iter().map(PollOption::new).collect(),
            created_at: now,
            expires_at: now + duration.length(),
            creator,
        }
    }

    /// A poll is expired strictly after its expiry instant; at the instant
    /// itself it still accepts votes.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// False for guests; otherwise true iff the fid appears in any option's
    /// voter list.
    pub fn has_voted(&self, viewer: Option<Fid>) -> bool {
        match viewer {
            None => false,
            Some(fid) => self.options.iter().any(|opt| opt.voters.contains(&fid)),
        }
    }

    pub fn total_votes(&self) -> u32 {
        self.options.iter().map(|opt| opt.votes).sum()
    }

    /// Indices of the options tied for the highest tally. Empty when no votes
    /// have been cast: a poll with zero votes declares no winner, even after
    /// expiry.
    pub fn winning_options(&self) -> Vec<usize> {
        let max = self.options.iter().map(|opt| opt.votes).max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        self.options
            .iter()
            .enumerate()
            .filter(|(_, opt)| opt.votes == max)
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Millisecond-precision now, the same resolution the blob stores.
    fn now_ms() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
    }

    fn poll_with_votes(votes: &[u32]) -> Poll {
        let mut next_fid = 1000;
        let options = votes
            .iter()
            .map(|&count| {
                let voters: Vec<Fid> = (0..count)
                    .map(|_| {
                        next_fid += 1;
                        Fid(next_fid)
                    })
                    .collect();
                PollOption {
                    text: format!("option {count}"),
                    votes: count,
                    voters,
                }
            })
            .collect();
        Poll {
            id: "test-poll".to_string(),
            question: "test?".to_string(),
            options,
            created_at: now_ms(),
            expires_at: now_ms() + Duration::hours(1),
            creator: Some(Fid(1)),
        }
    }

    #[test]
    fn winners_are_all_tied_leaders() {
        assert_eq!(poll_with_votes(&[3, 3, 1]).winning_options(), vec![0, 1]);
        assert_eq!(poll_with_votes(&[0, 5, 2]).winning_options(), vec![1]);
    }

    #[test]
    fn no_winner_without_votes() {
        assert!(poll_with_votes(&[0, 0, 0]).winning_options().is_empty());
    }

    #[test]
    fn expiry_is_strict() {
        let poll = poll_with_votes(&[0, 0]);
        assert!(!poll.is_expired_at(poll.expires_at));
        assert!(poll.is_expired_at(poll.expires_at + Duration::milliseconds(1)));
        assert!(!poll.is_expired_at(poll.created_at));
    }

    #[test]
    fn guests_never_count_as_having_voted() {
        let poll = poll_with_votes(&[2, 0]);
        assert!(!poll.has_voted(None));
    }

    #[test]
    fn has_voted_scans_every_option() {
        let mut poll = poll_with_votes(&[1, 0, 0]);
        poll.options[2].voters.push(Fid(42));
        poll.options[2].votes += 1;
        assert!(poll.has_voted(Some(Fid(42))));
        assert!(!poll.has_voted(Some(Fid(43))));
    }

    #[test]
    fn total_votes_sums_option_tallies() {
        assert_eq!(poll_with_votes(&[3, 3, 1]).total_votes(), 7);
        assert_eq!(poll_with_votes(&[0, 0]).total_votes(), 0);
    }

    #[test]
    fn duration_parses_form_values() {
        assert_eq!("24".parse::<PollDuration>().unwrap(), PollDuration::Hour24);
        assert_eq!("72".parse::<PollDuration>().unwrap(), PollDuration::Day3);
        assert!("2".parse::<PollDuration>().is_err());
        assert!("abc".parse::<PollDuration>().is_err());
    }

    #[test]
    fn duration_lengths() {
        assert_eq!(PollDuration::Hour1.length(), Duration::hours(1));
        assert_eq!(PollDuration::Day7.length(), Duration::hours(168));
    }

    #[test]
    fn serde_layout_matches_stored_blob() {
        let poll = poll_with_votes(&[1, 0]);
        let json = serde_json::to_value(&poll).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["id", "q", "opts", "created", "expires", "creator"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        let opt = json["opts"][0].as_object().unwrap();
        for key in ["text", "votes", "voters"] {
            assert!(opt.contains_key(key), "missing option key {key}");
        }
        // Timestamps persist as epoch milliseconds.
        assert!(json["created"].is_i64());

        let back: Poll = serde_json::from_value(json).unwrap();
        assert_eq!(back, poll);
    }

    #[test]
    fn anonymous_creator_round_trips_as_null() {
        let mut poll = poll_with_votes(&[0, 0]);
        poll.creator = None;
        let json = serde_json::to_value(&poll).unwrap();
        assert!(json["creator"].is_null());
        let back: Poll = serde_json::from_value(json).unwrap();
        assert_eq!(back.creator, None);
    }

    #[test]
    fn fresh_poll_ids_are_opaque_and_distinct() {
        let a = Poll::new("a?".into(), vec!["x".into(), "y".into()], PollDuration::Hour1, None);
        let b = Poll::new("b?".into(), vec!["x".into(), "y".into()], PollDuration::Hour1, None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
        // Ids go into the address bar verbatim, so they must be URL-safe.
        assert!(a.id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(a.expires_at - a.created_at, Duration::hours(1));
    }

    #[test]
    fn fresh_poll_survives_the_blob_round_trip() {
        // A poll straight out of the constructor must compare equal to its
        // serialized-and-restored self; the blob keeps only milliseconds.
        let poll = Poll::new(
            "Round trip?".into(),
            vec!["x".into(), "y".into()],
            PollDuration::Hour6,
            Some(Fid(7)),
        );
        let blob = serde_json::to_string(&poll).unwrap();
        let back: Poll = serde_json::from_str(&blob).unwrap();
        assert_eq!(back, poll);
        assert_eq!(back.created_at, poll.created_at);
        assert_eq!(back.expires_at, poll.expires_at);
    }
}
