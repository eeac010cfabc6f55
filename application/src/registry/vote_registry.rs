//! Registry of outstanding panic votes.
//!
//! Every read-modify-write on a vote happens inside one critical section of
//! the registry mutex. Removing the vote is the only way to reach a
//! terminal state, so whichever of [`VoteRegistry::cast`] (quorum reached)
//! or [`VoteRegistry::expire`] (deadline) removes it first wins and the
//! other observes an absent vote.

use panicbot_domain::{BallotOutcome, MemberId, PanicVote, QuorumThreshold, VoteId, VoteKind};
use std::collections::HashMap;
use std::sync::Mutex;

/// Result of recording a ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastResult {
    /// No live vote with that id: already resolved, expired, or never existed.
    NotFound,
    /// The member is not allowed to vote on this kind of vote.
    NotEligible { kind: VoteKind },
    /// The member already voted.
    Duplicate { kind: VoteKind },
    /// Counted; the vote is still collecting.
    Recorded {
        kind: VoteKind,
        count: usize,
        remaining: usize,
    },
    /// Counted and the quorum is met. The vote has been removed and is
    /// handed to the caller to execute.
    QuorumReached(PanicVote),
}

struct LiveVote {
    vote: PanicVote,
    quorum: QuorumThreshold,
}

#[derive(Default)]
pub struct VoteRegistry {
    votes: Mutex<HashMap<VoteId, LiveVote>>,
}

impl VoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a vote. Ids are random, so an existing entry is never replaced.
    pub fn insert(&self, vote: PanicVote, quorum: QuorumThreshold) -> bool {
        let mut votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        if votes.contains_key(&vote.id) {
            return false;
        }
        votes.insert(vote.id, LiveVote { vote, quorum });
        true
    }

    /// Record `member`'s ballot on vote `id`.
    ///
    /// `is_eligible` is evaluated under the lock with the vote's kind, so it
    /// must be a cheap pure check.
    pub fn cast(
        &self,
        id: &VoteId,
        member: &MemberId,
        is_eligible: impl FnOnce(VoteKind) -> bool,
    ) -> CastResult {
        let mut votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        let Some(live) = votes.get_mut(id) else {
            return CastResult::NotFound;
        };

        let kind = live.vote.kind();
        // A counted voter stays a duplicate even after losing eligibility
        if live.vote.has_voted(member) {
            return CastResult::Duplicate { kind };
        }
        if !is_eligible(kind) {
            return CastResult::NotEligible { kind };
        }

        match live.vote.record_ballot(member.clone()) {
            BallotOutcome::Duplicate => CastResult::Duplicate { kind },
            BallotOutcome::Recorded { count } if live.quorum.is_met(count) => {
                match votes.remove(id) {
                    Some(live) => CastResult::QuorumReached(live.vote),
                    None => CastResult::NotFound,
                }
            }
            BallotOutcome::Recorded { count } => CastResult::Recorded {
                kind,
                count,
                remaining: live.quorum.remaining(count),
            },
        }
    }

    /// Remove vote `id` because its deadline passed.
    ///
    /// Returns `None` when the vote is already gone.
    pub fn expire(&self, id: &VoteId) -> Option<PanicVote> {
        let mut votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        votes.remove(id).map(|live| live.vote)
    }

    pub fn contains(&self, id: &VoteId) -> bool {
        let votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        votes.contains_key(id)
    }

    pub fn get(&self, id: &VoteId) -> Option<PanicVote> {
        let votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        votes.get(id).map(|live| live.vote.clone())
    }

    /// Live votes, oldest first.
    pub fn snapshot(&self) -> Vec<PanicVote> {
        let votes = self.votes.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = votes.values().map(|live| live.vote.clone()).collect();
        out.sort_by_key(|vote| vote.created_at);
        out
    }

    pub fn len(&self) -> usize {
        self.votes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panicbot_domain::PanicAction;
    use std::sync::Arc;
    use std::time::Duration;

    fn ban_vote() -> PanicVote {
        let action = PanicAction::ban(MemberId::from("troll"), "spam", Some(1)).unwrap();
        PanicVote::new(MemberId::from("mod"), action, Duration::from_secs(300))
    }

    fn anyone(_: VoteKind) -> bool {
        true
    }

    #[test]
    fn test_quorum_of_three() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        assert!(registry.insert(vote, QuorumThreshold::new(3)));

        assert_eq!(
            registry.cast(&id, &MemberId::from("a"), anyone),
            CastResult::Recorded {
                kind: VoteKind::Ban,
                count: 1,
                remaining: 2
            }
        );
        assert!(matches!(
            registry.cast(&id, &MemberId::from("b"), anyone),
            CastResult::Recorded { count: 2, .. }
        ));
        assert!(registry.contains(&id));

        match registry.cast(&id, &MemberId::from("c"), anyone) {
            CastResult::QuorumReached(vote) => assert_eq!(vote.ballot_count(), 3),
            other => panic!("expected quorum, got {:?}", other),
        }
        assert!(registry.is_empty());
        assert_eq!(
            registry.cast(&id, &MemberId::from("d"), anyone),
            CastResult::NotFound
        );
    }

    #[test]
    fn test_duplicate_cast_does_not_change_count() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        registry.insert(vote, QuorumThreshold::new(3));

        registry.cast(&id, &MemberId::from("a"), anyone);
        for _ in 0..5 {
            assert_eq!(
                registry.cast(&id, &MemberId::from("a"), anyone),
                CastResult::Duplicate {
                    kind: VoteKind::Ban
                }
            );
        }
        assert_eq!(registry.get(&id).unwrap().ballot_count(), 1);
    }

    #[test]
    fn test_ineligible_cast_is_not_counted() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        registry.insert(vote, QuorumThreshold::new(1));

        assert_eq!(
            registry.cast(&id, &MemberId::from("a"), |_| false),
            CastResult::NotEligible {
                kind: VoteKind::Ban
            }
        );
        assert_eq!(registry.get(&id).unwrap().ballot_count(), 0);
    }

    #[test]
    fn test_counted_voter_who_became_ineligible_is_a_duplicate() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        registry.insert(vote, QuorumThreshold::new(3));

        registry.cast(&id, &MemberId::from("a"), anyone);
        assert_eq!(
            registry.cast(&id, &MemberId::from("a"), |_| false),
            CastResult::Duplicate {
                kind: VoteKind::Ban
            }
        );
        assert_eq!(registry.get(&id).unwrap().ballot_count(), 1);
    }

    #[test]
    fn test_expire_after_resolve_is_noop() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        registry.insert(vote, QuorumThreshold::new(1));

        assert!(matches!(
            registry.cast(&id, &MemberId::from("a"), anyone),
            CastResult::QuorumReached(_)
        ));
        assert!(registry.expire(&id).is_none());
    }

    #[test]
    fn test_resolve_after_expire_is_noop() {
        let registry = VoteRegistry::new();
        let vote = ban_vote();
        let id = vote.id;
        registry.insert(vote, QuorumThreshold::new(1));

        assert!(registry.expire(&id).is_some());
        assert!(registry.expire(&id).is_none());
        assert_eq!(
            registry.cast(&id, &MemberId::from("a"), anyone),
            CastResult::NotFound
        );
    }

    #[test]
    fn test_concurrent_cast_and_expire_terminate_once() {
        for _ in 0..50 {
            let registry = Arc::new(VoteRegistry::new());
            let vote = ban_vote();
            let id = vote.id;
            registry.insert(vote, QuorumThreshold::new(4));

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let registry = Arc::clone(&registry);
                    std::thread::spawn(move || {
                        if i == 7 {
                            registry.expire(&id).is_some() as usize
                        } else {
                            let member = MemberId::new(format!("m{}", i % 4));
                            matches!(
                                registry.cast(&id, &member, anyone),
                                CastResult::QuorumReached(_)
                            ) as usize
                        }
                    })
                })
                .collect();

            let terminations: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
            assert_eq!(terminations, 1);
            assert!(registry.is_empty());
        }
    }

    #[test]
    fn test_snapshot_is_oldest_first() {
        let registry = VoteRegistry::new();
        let first = ban_vote();
        let mut second = ban_vote();
        second.created_at = first.created_at + chrono::TimeDelta::seconds(5);
        let (a, b) = (first.id, second.id);
        registry.insert(second, QuorumThreshold::new(2));
        registry.insert(first, QuorumThreshold::new(2));

        let ids: Vec<_> = registry.snapshot().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
