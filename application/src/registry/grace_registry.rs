//! Grace Period Registry.
//!
//! A member who loses a qualifying role keeps a [`GraceEntry`] for the
//! configured window. Each revocation overwrites the member's entry and
//! schedules a removal carrying the entry's `revoked_at` as a fencing
//! token; the removal only deletes an entry that still carries that token.

use crate::scheduler::schedule_once;
use chrono::{TimeDelta, Utc};
use panicbot_domain::{GraceEntry, MemberId, RoleId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

pub struct GraceRegistry {
    entries: Mutex<HashMap<MemberId, GraceEntry>>,
    window: Duration,
    qualifying_roles: Vec<RoleId>,
}

impl GraceRegistry {
    pub fn new(window: Duration, qualifying_roles: Vec<RoleId>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
            qualifying_roles,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn qualifies(&self, role: &RoleId) -> bool {
        self.qualifying_roles.contains(role)
    }

    /// Record that `member` lost `role`.
    ///
    /// Returns the new entry, or `None` when the role does not qualify.
    /// Must be called inside a tokio runtime (schedules the removal).
    pub fn on_role_revoked(self: &Arc<Self>, member: &MemberId, role: &RoleId) -> Option<GraceEntry> {
        if !self.qualifies(role) {
            debug!(member = %member, role = %role, "Removed role does not open a grace period");
            return None;
        }

        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            let mut revoked_at = Utc::now();
            // Tokens must be unique per member even if the clock has not moved.
            if let Some(previous) = entries.get(member)
                && revoked_at <= previous.revoked_at
            {
                revoked_at = previous.revoked_at + TimeDelta::nanoseconds(1);
            }
            let entry = GraceEntry::new(member.clone(), role.clone(), revoked_at);
            entries.insert(member.clone(), entry.clone());
            entry
        };

        info!(
            member = %member,
            role = %role,
            window_secs = self.window.as_secs(),
            "Grace period started"
        );

        let registry = Arc::clone(self);
        let member = member.clone();
        let token = entry.token();
        schedule_once(self.window, async move {
            registry.remove_if_current(&member, token);
        });

        Some(entry)
    }

    /// Delete `member`'s entry iff it still carries `token`.
    pub fn remove_if_current(&self, member: &MemberId, token: chrono::DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(member) {
            Some(entry) if entry.matches(token) => {
                entries.remove(member);
                debug!(member = %member, "Grace period ended");
                true
            }
            Some(_) => {
                debug!(member = %member, "Grace removal superseded by a later revocation");
                false
            }
            None => false,
        }
    }

    pub fn is_in_grace(&self, member: &MemberId) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(member)
    }

    pub fn entry(&self, member: &MemberId) -> Option<GraceEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(member).cloned()
    }

    /// Members currently in grace.
    pub fn members(&self) -> Vec<MemberId> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut members: Vec<_> = entries.keys().cloned().collect();
        members.sort();
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(30 * 60);

    fn registry() -> Arc<GraceRegistry> {
        Arc::new(GraceRegistry::new(WINDOW, vec![RoleId::from("mod")]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_qualifying_role_is_ignored() {
        let grace = registry();
        let member = MemberId::from("alice");
        assert!(grace.on_role_revoked(&member, &RoleId::from("artist")).is_none());
        assert!(!grace.is_in_grace(&member));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_window() {
        let grace = registry();
        let member = MemberId::from("alice");
        grace.on_role_revoked(&member, &RoleId::from("mod")).unwrap();
        assert!(grace.is_in_grace(&member));

        tokio::time::sleep(WINDOW - Duration::from_secs(1)).await;
        assert!(grace.is_in_grace(&member));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!grace.is_in_grace(&member));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_revocation_survives_first_timer() {
        let grace = registry();
        let member = MemberId::from("alice");
        let first = grace.on_role_revoked(&member, &RoleId::from("mod")).unwrap();

        tokio::time::sleep(Duration::from_secs(20 * 60)).await;
        let second = grace.on_role_revoked(&member, &RoleId::from("mod")).unwrap();
        assert!(second.revoked_at > first.revoked_at);

        // First timer fires at 30m and must leave the newer entry alone.
        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        assert_eq!(grace.entry(&member), Some(second));

        // Second timer fires at 50m.
        tokio::time::sleep(Duration::from_secs(20 * 60)).await;
        assert!(!grace.is_in_grace(&member));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_revocations_get_distinct_tokens() {
        let grace = registry();
        let member = MemberId::from("alice");
        let first = grace.on_role_revoked(&member, &RoleId::from("mod")).unwrap();
        let second = grace.on_role_revoked(&member, &RoleId::from("mod")).unwrap();
        assert_ne!(first.token(), second.token());

        assert!(!grace.remove_if_current(&member, first.token()));
        assert!(grace.is_in_grace(&member));
        assert!(grace.remove_if_current(&member, second.token()));
        assert!(grace.members().is_empty());
    }
}
