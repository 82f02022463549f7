//! Optimistic local mutations modelled as commands.
//!
//! The UI applies the change immediately, fires the REST call, and either
//! commits (the confirming bus event carries the authoritative state) or
//! rolls the view back to what it showed before.

use uuid::Uuid;

use crate::client::reconciler::RoomView;

/// A locally-applied vote selection that can be undone.
#[derive(Debug)]
pub struct VoteCommand {
    player_id: Uuid,
    prior_vote: Option<String>,
    prior_has_voted: bool,
}

impl VoteCommand {
    /// Apply the selection to the local view, remembering what it replaces.
    ///
    /// The player's own pick is always visible locally, regardless of the
    /// reveal state — everyone sees their own card.
    pub fn apply(view: &mut RoomView, player_id: Uuid, value: String) -> Option<VoteCommand> {
        let player = view.players.get_mut(&player_id)?;
        let command = VoteCommand {
            player_id,
            prior_vote: player.vote.clone(),
            prior_has_voted: player.has_voted,
        };
        player.has_voted = true;
        player.vote = Some(value);
        Some(command)
    }

    /// The submit call succeeded; the optimistic state stands until the
    /// confirming event arrives.
    pub fn commit(self) {}

    /// The submit call failed; restore exactly what the view showed before.
    pub fn rollback(self, view: &mut RoomView) {
        if let Some(player) = view.players.get_mut(&self.player_id) {
            player.has_voted = self.prior_has_voted;
            player.vote = self.prior_vote;
        }
    }
}
