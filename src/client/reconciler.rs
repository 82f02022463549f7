use indexmap::IndexMap;
use uuid::Uuid;

use crate::dto::{
    room::RoomSnapshot,
    sse::{
        ActiveStoryChangedEvent, CelebrationsEnabledUpdatedEvent, DeckUpdatedEvent, EmojiSentEvent,
        EmojisEnabledUpdatedEvent, HostTransferredEvent, MemberAddedEvent, MemberRemovedEvent,
        PlayerJoinedEvent, PlayerKickedEvent, PlayerLeftEvent, PlayerReactionEvent,
        PlayerUpdatedEvent, RoomNameUpdatedEvent, RoomSettingsUpdatedEvent, StoryAddedEvent,
        StoryCompletedEvent, StoryDeletedEvent, StoryUpdatedEvent, VoteRemovedEvent,
        VoteSubmittedEvent, VotesResetEvent, VotesRevealedEvent, names,
    },
};

/// Typed form of a bus message, parsed from its `(name, data)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// See [`names::PLAYER_JOINED`].
    PlayerJoined(PlayerJoinedEvent),
    /// See [`names::PLAYER_UPDATED`].
    PlayerUpdated(PlayerUpdatedEvent),
    /// See [`names::PLAYER_KICKED`].
    PlayerKicked(PlayerKickedEvent),
    /// See [`names::PLAYER_LEFT`].
    PlayerLeft(PlayerLeftEvent),
    /// See [`names::HOST_TRANSFERRED`].
    HostTransferred(HostTransferredEvent),
    /// See [`names::STORY_ADDED`].
    StoryAdded(StoryAddedEvent),
    /// See [`names::STORY_UPDATED`].
    StoryUpdated(StoryUpdatedEvent),
    /// See [`names::ACTIVE_STORY_CHANGED`].
    ActiveStoryChanged(ActiveStoryChangedEvent),
    /// See [`names::STORY_COMPLETED`].
    StoryCompleted(StoryCompletedEvent),
    /// See [`names::STORY_DELETED`].
    StoryDeleted(StoryDeletedEvent),
    /// See [`names::VOTE_SUBMITTED`].
    VoteSubmitted(VoteSubmittedEvent),
    /// See [`names::VOTE_REMOVED`].
    VoteRemoved(VoteRemovedEvent),
    /// See [`names::VOTES_REVEALED`].
    VotesRevealed(VotesRevealedEvent),
    /// See [`names::VOTES_RESET`].
    VotesReset(VotesResetEvent),
    /// See [`names::DECK_UPDATED`].
    DeckUpdated(DeckUpdatedEvent),
    /// See [`names::ROOM_SETTINGS_UPDATED`].
    RoomSettingsUpdated(RoomSettingsUpdatedEvent),
    /// See [`names::ROOM_NAME_UPDATED`].
    RoomNameUpdated(RoomNameUpdatedEvent),
    /// See [`names::CELEBRATIONS_ENABLED_UPDATED`].
    CelebrationsEnabledUpdated(CelebrationsEnabledUpdatedEvent),
    /// See [`names::EMOJIS_ENABLED_UPDATED`].
    EmojisEnabledUpdated(EmojisEnabledUpdatedEvent),
    /// See [`names::PLAYER_REACTION`]. Transient; no view-state change.
    PlayerReaction(PlayerReactionEvent),
    /// See [`names::EMOJI_SENT`]. Transient; no view-state change.
    EmojiSent(EmojiSentEvent),
    /// See [`names::MEMBER_ADDED`].
    MemberAdded(MemberAddedEvent),
    /// See [`names::MEMBER_REMOVED`].
    MemberRemoved(MemberRemovedEvent),
}

impl RoomEvent {
    /// Parse a named bus message. Unknown names and malformed payloads yield
    /// `None`; the client simply skips what it cannot understand.
    pub fn parse(event: &str, data: &str) -> Option<RoomEvent> {
        let parsed = match event {
            names::PLAYER_JOINED => RoomEvent::PlayerJoined(serde_json::from_str(data).ok()?),
            names::PLAYER_UPDATED => RoomEvent::PlayerUpdated(serde_json::from_str(data).ok()?),
            names::PLAYER_KICKED => RoomEvent::PlayerKicked(serde_json::from_str(data).ok()?),
            names::PLAYER_LEFT => RoomEvent::PlayerLeft(serde_json::from_str(data).ok()?),
            names::HOST_TRANSFERRED => {
                RoomEvent::HostTransferred(serde_json::from_str(data).ok()?)
            }
            names::STORY_ADDED => RoomEvent::StoryAdded(serde_json::from_str(data).ok()?),
            names::STORY_UPDATED => RoomEvent::StoryUpdated(serde_json::from_str(data).ok()?),
            names::ACTIVE_STORY_CHANGED => {
                RoomEvent::ActiveStoryChanged(serde_json::from_str(data).ok()?)
            }
            names::STORY_COMPLETED => {
                RoomEvent::StoryCompleted(serde_json::from_str(data).ok()?)
            }
            names::STORY_DELETED => RoomEvent::StoryDeleted(serde_json::from_str(data).ok()?),
            names::VOTE_SUBMITTED => RoomEvent::VoteSubmitted(serde_json::from_str(data).ok()?),
            names::VOTE_REMOVED => RoomEvent::VoteRemoved(serde_json::from_str(data).ok()?),
            names::VOTES_REVEALED => RoomEvent::VotesRevealed(serde_json::from_str(data).ok()?),
            names::VOTES_RESET => RoomEvent::VotesReset(serde_json::from_str(data).ok()?),
            names::DECK_UPDATED => RoomEvent::DeckUpdated(serde_json::from_str(data).ok()?),
            names::ROOM_SETTINGS_UPDATED => {
                RoomEvent::RoomSettingsUpdated(serde_json::from_str(data).ok()?)
            }
            names::ROOM_NAME_UPDATED => {
                RoomEvent::RoomNameUpdated(serde_json::from_str(data).ok()?)
            }
            names::CELEBRATIONS_ENABLED_UPDATED => {
                RoomEvent::CelebrationsEnabledUpdated(serde_json::from_str(data).ok()?)
            }
            names::EMOJIS_ENABLED_UPDATED => {
                RoomEvent::EmojisEnabledUpdated(serde_json::from_str(data).ok()?)
            }
            names::PLAYER_REACTION => {
                RoomEvent::PlayerReaction(serde_json::from_str(data).ok()?)
            }
            names::EMOJI_SENT => RoomEvent::EmojiSent(serde_json::from_str(data).ok()?),
            names::MEMBER_ADDED => RoomEvent::MemberAdded(serde_json::from_str(data).ok()?),
            names::MEMBER_REMOVED => RoomEvent::MemberRemoved(serde_json::from_str(data).ok()?),
            _ => return None,
        };
        Some(parsed)
    }
}

/// Local view of one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    /// Display name.
    pub name: String,
    /// Host flag as last announced by the server.
    pub is_host: bool,
    /// Presence: driven solely by member-added/member-removed.
    pub online: bool,
    /// Whether this player has a vote on the current story.
    pub has_voted: bool,
    /// The vote value, visible only when the view believes votes are
    /// revealed (or it is the local player's own optimistic pick).
    pub vote: Option<String>,
}

impl PlayerView {
    fn named(name: String) -> Self {
        Self {
            name,
            is_host: false,
            online: false,
            has_voted: false,
            vote: None,
        }
    }

    fn clear_vote(&mut self) {
        self.has_voted = false;
        self.vote = None;
    }
}

/// Local view of the story currently being estimated.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryView {
    /// Story id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Whether the view believes votes are visible.
    pub votes_revealed: bool,
}

/// One backlog row kept for list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BacklogEntry {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Final score once the story completed.
    pub final_score: Option<f64>,
    /// Whether the story completed.
    pub completed: bool,
}

/// Local room state: seeded from a snapshot, patched by [`RoomEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    /// Room display name.
    pub room_name: String,
    /// Card labels of the current deck.
    pub deck: Vec<String>,
    /// Auto-reveal setting as last announced.
    pub auto_reveal_votes: bool,
    /// Celebrations toggle.
    pub celebrations_enabled: bool,
    /// Emoji toggle.
    pub emojis_enabled: bool,
    /// Players keyed by id, in arrival order.
    pub players: IndexMap<Uuid, PlayerView>,
    /// Story currently being estimated, when any.
    pub current_story: Option<StoryView>,
    /// Backlog rows keyed by story id.
    pub backlog: IndexMap<Uuid, BacklogEntry>,
}

impl RoomView {
    /// Seed the view from a full-room snapshot.
    pub fn from_snapshot(snapshot: &RoomSnapshot) -> Self {
        let mut players: IndexMap<Uuid, PlayerView> = snapshot
            .players
            .iter()
            .map(|player| {
                (
                    player.id,
                    PlayerView {
                        name: player.name.clone(),
                        is_host: player.is_host,
                        online: player.online,
                        has_voted: false,
                        vote: None,
                    },
                )
            })
            .collect();

        for status in &snapshot.votes {
            if let Some(player) = players.get_mut(&status.player_id) {
                player.has_voted = status.has_voted;
                player.vote = status.value.clone();
            }
        }

        let current_story = snapshot.room.active_story_id.and_then(|story_id| {
            snapshot
                .stories
                .iter()
                .find(|story| story.id == story_id)
                .map(|story| StoryView {
                    id: story.id,
                    title: story.title.clone(),
                    description: story.description.clone(),
                    votes_revealed: story.votes_revealed,
                })
        });

        let backlog = snapshot
            .stories
            .iter()
            .map(|story| {
                (
                    story.id,
                    BacklogEntry {
                        title: story.title.clone(),
                        description: story.description.clone(),
                        final_score: story.final_score,
                        completed: matches!(
                            story.status,
                            crate::dao::models::StoryStatus::Completed
                        ),
                    },
                )
            })
            .collect();

        Self {
            room_name: snapshot.room.name.clone(),
            deck: snapshot.room.deck.clone(),
            auto_reveal_votes: snapshot.room.auto_reveal_votes,
            celebrations_enabled: snapshot.room.celebrations_enabled,
            emojis_enabled: snapshot.room.emojis_enabled,
            players,
            current_story,
            backlog,
        }
    }

    /// Replace the whole view with a fresh snapshot. Recovery path for missed
    /// or dropped bus events.
    pub fn resync(&mut self, snapshot: &RoomSnapshot) {
        *self = Self::from_snapshot(snapshot);
    }

    fn clear_all_votes(&mut self) {
        for (_, player) in self.players.iter_mut() {
            player.clear_vote();
        }
    }

    /// Apply one bus event: the pure reducer `(state, event) -> state`.
    ///
    /// Incremental events are applied best-effort; the authoritative
    /// full-state events (`votes-revealed`, `active-story-changed`,
    /// `story-completed`) override whatever incremental updates said before,
    /// which is what makes out-of-order delivery tolerable.
    pub fn apply(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::PlayerJoined(payload) => {
                let entry = self
                    .players
                    .entry(payload.player_id)
                    .or_insert_with(|| PlayerView::named(payload.player_name.clone()));
                entry.name = payload.player_name;
            }
            RoomEvent::PlayerUpdated(payload) => {
                if let Some(player) = self.players.get_mut(&payload.id) {
                    player.name = payload.name;
                }
            }
            RoomEvent::PlayerKicked(payload) => {
                self.players.shift_remove(&payload.player_id);
            }
            RoomEvent::PlayerLeft(payload) => {
                self.players.shift_remove(&payload.player_id);
            }
            RoomEvent::HostTransferred(payload) => {
                if let Some(old) = self.players.get_mut(&payload.old_host_id) {
                    old.is_host = false;
                }
                if let Some(new) = self.players.get_mut(&payload.new_host_id) {
                    new.is_host = true;
                }
            }
            RoomEvent::StoryAdded(payload) => {
                self.backlog.insert(
                    payload.id,
                    BacklogEntry {
                        title: payload.title,
                        description: payload.description,
                        final_score: None,
                        completed: false,
                    },
                );
            }
            RoomEvent::StoryUpdated(payload) => {
                if let Some(entry) = self.backlog.get_mut(&payload.id) {
                    entry.title = payload.title.clone();
                    entry.description = payload.description.clone();
                }
                if let Some(current) = &mut self.current_story {
                    if current.id == payload.id {
                        current.title = payload.title;
                        current.description = payload.description;
                    }
                }
            }
            RoomEvent::ActiveStoryChanged(payload) => {
                // Authoritative: adopt the story and drop every vote mark.
                self.current_story = Some(StoryView {
                    id: payload.id,
                    title: payload.title,
                    description: payload.description,
                    votes_revealed: payload.votes_revealed,
                });
                self.clear_all_votes();
            }
            RoomEvent::StoryCompleted(payload) => {
                // The server is authoritative: clear the current story even
                // when the id does not match the locally-tracked one.
                self.current_story = None;
                self.clear_all_votes();
                if let Some(entry) = self.backlog.get_mut(&payload.id) {
                    entry.completed = true;
                    entry.final_score = payload.final_score;
                }
            }
            RoomEvent::StoryDeleted(payload) => {
                self.backlog.shift_remove(&payload.id);
                if self
                    .current_story
                    .as_ref()
                    .is_some_and(|current| current.id == payload.id)
                {
                    self.current_story = None;
                    self.clear_all_votes();
                }
            }
            RoomEvent::VoteSubmitted(payload) => {
                let revealed = self
                    .current_story
                    .as_ref()
                    .is_some_and(|story| story.votes_revealed);
                if let Some(player) = self.players.get_mut(&payload.player_id) {
                    player.has_voted = true;
                    // The value only surfaces once the view believes votes
                    // are revealed.
                    player.vote = revealed.then_some(payload.value);
                }
            }
            RoomEvent::VoteRemoved(payload) => {
                let matches_current = self
                    .current_story
                    .as_ref()
                    .is_some_and(|story| story.id == payload.story_id);
                if matches_current {
                    if let Some(player) = self.players.get_mut(&payload.player_id) {
                        player.clear_vote();
                    }
                }
            }
            RoomEvent::VotesRevealed(payload) => {
                let matches_current = self
                    .current_story
                    .as_ref()
                    .is_some_and(|story| story.id == payload.story_id);
                if !matches_current {
                    // Stale reveal for a story this view no longer tracks.
                    return;
                }
                if let Some(current) = &mut self.current_story {
                    current.votes_revealed = true;
                }
                // Wholesale replacement: absent players did not vote.
                self.clear_all_votes();
                for vote in payload.votes {
                    if let Some(player) = self.players.get_mut(&vote.player_id) {
                        player.has_voted = true;
                        player.vote = Some(vote.value);
                    }
                }
            }
            RoomEvent::VotesReset(_) => {
                if let Some(current) = &mut self.current_story {
                    current.votes_revealed = false;
                }
                self.clear_all_votes();
            }
            RoomEvent::DeckUpdated(payload) => {
                self.deck = payload.deck;
            }
            RoomEvent::RoomSettingsUpdated(payload) => {
                self.auto_reveal_votes = payload.auto_reveal_votes;
            }
            RoomEvent::RoomNameUpdated(payload) => {
                self.room_name = payload.name;
            }
            RoomEvent::CelebrationsEnabledUpdated(payload) => {
                self.celebrations_enabled = payload.enabled;
            }
            RoomEvent::EmojisEnabledUpdated(payload) => {
                self.emojis_enabled = payload.enabled;
            }
            // Transient display-only events carry no view state.
            RoomEvent::PlayerReaction(_) | RoomEvent::EmojiSent(_) => {}
            RoomEvent::MemberAdded(payload) => {
                // Presence may arrive before the join event; keep a
                // placeholder so the flag is not lost.
                let entry = self
                    .players
                    .entry(payload.player_id)
                    .or_insert_with(|| PlayerView::named(payload.player_name.clone()));
                entry.online = true;
            }
            RoomEvent::MemberRemoved(payload) => {
                if let Some(player) = self.players.get_mut(&payload.player_id) {
                    player.online = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::sse::RevealedVote;

    fn story_id() -> Uuid {
        Uuid::new_v4()
    }

    fn empty_view() -> RoomView {
        RoomView {
            room_name: "room".into(),
            deck: vec!["1".into(), "2".into(), "3".into()],
            auto_reveal_votes: true,
            celebrations_enabled: true,
            emojis_enabled: true,
            players: IndexMap::new(),
            current_story: None,
            backlog: IndexMap::new(),
        }
    }

    fn view_with_active_story(story: Uuid, players: &[(Uuid, &str)]) -> RoomView {
        let mut view = empty_view();
        view.current_story = Some(StoryView {
            id: story,
            title: "story".into(),
            description: String::new(),
            votes_revealed: false,
        });
        for (id, name) in players {
            view.players.insert(*id, PlayerView::named((*name).into()));
        }
        view
    }

    fn vote_submitted(player_id: Uuid, value: &str) -> RoomEvent {
        RoomEvent::VoteSubmitted(VoteSubmittedEvent {
            player_id,
            player_name: "someone".into(),
            value: value.into(),
            total_votes: 1,
            total_players: 2,
            is_complete: false,
        })
    }

    fn votes_revealed(story: Uuid, votes: &[(Uuid, &str)]) -> RoomEvent {
        RoomEvent::VotesRevealed(VotesRevealedEvent {
            story_id: story,
            votes: votes
                .iter()
                .map(|(id, value)| RevealedVote {
                    player_id: *id,
                    player_name: "someone".into(),
                    value: (*value).into(),
                })
                .collect(),
        })
    }

    #[test]
    fn vote_submitted_hides_the_value_until_reveal() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);

        view.apply(vote_submitted(alice, "3"));

        let player = &view.players[&alice];
        assert!(player.has_voted);
        assert_eq!(player.vote, None);
    }

    #[test]
    fn vote_submitted_shows_the_value_once_revealed() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice"), (bob, "bob")]);

        view.apply(votes_revealed(story, &[(alice, "3")]));
        // A vote landing after reveal surfaces immediately.
        view.apply(vote_submitted(bob, "5"));

        assert_eq!(view.players[&bob].vote.as_deref(), Some("5"));
    }

    #[test]
    fn votes_revealed_replaces_the_view_wholesale() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice"), (bob, "bob")]);

        // A stale incremental event claims bob voted.
        view.apply(vote_submitted(bob, "8"));
        // The authoritative reveal only contains alice: bob did not vote.
        view.apply(votes_revealed(story, &[(alice, "3")]));

        assert_eq!(view.players[&alice].vote.as_deref(), Some("3"));
        assert!(!view.players[&bob].has_voted);
        assert_eq!(view.players[&bob].vote, None);
        assert!(view.current_story.as_ref().unwrap().votes_revealed);
    }

    #[test]
    fn stale_reveal_for_another_story_is_ignored() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);

        view.apply(votes_revealed(story_id(), &[(alice, "13")]));

        assert!(!view.current_story.as_ref().unwrap().votes_revealed);
        assert!(!view.players[&alice].has_voted);
    }

    #[test]
    fn votes_reset_clears_unconditionally() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);

        view.apply(votes_revealed(story, &[(alice, "3")]));
        view.apply(RoomEvent::VotesReset(VotesResetEvent { story_id: story }));

        assert!(!view.players[&alice].has_voted);
        assert!(!view.current_story.as_ref().unwrap().votes_revealed);
    }

    #[test]
    fn stale_vote_submitted_after_reset_is_corrected_by_the_next_reveal() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);

        view.apply(RoomEvent::VotesReset(VotesResetEvent { story_id: story }));
        // Out-of-order: an old vote-submitted lands after the reset and
        // re-marks the player.
        view.apply(vote_submitted(alice, "3"));
        assert!(view.players[&alice].has_voted);

        // The next authoritative full-state event wins the conflict.
        view.apply(votes_revealed(story, &[]));
        assert!(!view.players[&alice].has_voted);
    }

    #[test]
    fn active_story_changed_clears_vote_state() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);
        view.apply(vote_submitted(alice, "2"));

        let next = story_id();
        view.apply(RoomEvent::ActiveStoryChanged(ActiveStoryChangedEvent {
            id: next,
            title: "next".into(),
            description: String::new(),
            status: crate::dao::models::StoryStatus::Active,
            votes_revealed: false,
        }));

        assert_eq!(view.current_story.as_ref().unwrap().id, next);
        assert!(!view.players[&alice].has_voted);
    }

    #[test]
    fn story_completed_clears_current_story_even_on_id_mismatch() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);
        view.apply(vote_submitted(alice, "2"));

        view.apply(RoomEvent::StoryCompleted(StoryCompletedEvent {
            id: story_id(), // a different story: server wins anyway
            final_score: Some(5.0),
            status: crate::dao::models::StoryStatus::Completed,
            reset_current_story: true,
        }));

        assert!(view.current_story.is_none());
        assert!(!view.players[&alice].has_voted);
    }

    #[test]
    fn presence_is_separate_from_vote_state() {
        let story = story_id();
        let alice = Uuid::new_v4();
        let mut view = view_with_active_story(story, &[(alice, "alice")]);

        view.apply(RoomEvent::MemberAdded(MemberAddedEvent {
            player_id: alice,
            player_name: "alice".into(),
        }));
        view.apply(vote_submitted(alice, "3"));

        // Going offline does not retract the vote.
        view.apply(RoomEvent::MemberRemoved(MemberRemovedEvent {
            player_id: alice,
        }));
        assert!(!view.players[&alice].online);
        assert!(view.players[&alice].has_voted);
    }

    #[test]
    fn presence_before_join_is_tolerated() {
        let mut view = empty_view();
        let ghost = Uuid::new_v4();

        view.apply(RoomEvent::MemberAdded(MemberAddedEvent {
            player_id: ghost,
            player_name: "ghost".into(),
        }));
        assert!(view.players[&ghost].online);

        view.apply(RoomEvent::PlayerJoined(PlayerJoinedEvent {
            player_id: ghost,
            player_name: "ghost".into(),
            avatar_style: "bottts".into(),
            avatar_seed: "seed".into(),
        }));
        // The placeholder survives, presence intact.
        assert!(view.players[&ghost].online);
        assert_eq!(view.players.len(), 1);
    }

    #[test]
    fn host_transfer_flips_flags() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut view = empty_view();
        view.players.insert(
            alice,
            PlayerView {
                is_host: true,
                ..PlayerView::named("alice".into())
            },
        );
        view.players.insert(bob, PlayerView::named("bob".into()));

        view.apply(RoomEvent::HostTransferred(HostTransferredEvent {
            new_host_id: bob,
            old_host_id: alice,
            new_host_name: "bob".into(),
        }));

        assert!(!view.players[&alice].is_host);
        assert!(view.players[&bob].is_host);
    }

    #[test]
    fn parse_round_trips_event_payloads() {
        let story = story_id();
        let event = VotesResetEvent { story_id: story };
        let data = serde_json::to_string(&event).unwrap();

        let parsed = RoomEvent::parse(names::VOTES_RESET, &data).unwrap();
        assert_eq!(parsed, RoomEvent::VotesReset(event));

        assert!(RoomEvent::parse("unknown-event", "{}").is_none());
        assert!(RoomEvent::parse(names::VOTES_RESET, "not json").is_none());
    }
}
