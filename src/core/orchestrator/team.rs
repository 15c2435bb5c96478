//! Team membership operations.

use tracing::info;

use super::{Applied, Orchestrator};
use crate::core::domain::import_id::TEAM_ARITY;
use crate::core::domain::{parse_roster, CompositeId, TeamMember};
use crate::core::reconcile::{self, DesiredMember, MemberUpdate};
use crate::core::transport::{Operation, Transport};
use crate::error::{OpContext, OpKind, Result};

impl<T: Transport> Orchestrator<T> {
    /// Read a team's roster. Returns `Ok(None)` if the team doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTeam` when no team is given or configured.
    pub fn read_team_members(&self, team: Option<&str>) -> Result<Option<Vec<TeamMember>>> {
        let team_id = self.platform.require_team(team)?;
        let op = Operation::list_members(&team_id);
        match self.read(
            OpContext::new(OpKind::Read, format!("team {} members", team_id), None),
            &op,
        )? {
            Some(roster) => Ok(Some(parse_roster(roster)?)),
            None => Ok(None),
        }
    }

    /// Read the roster and plan role and confirmation changes.
    pub fn plan_team_members(
        &self,
        team: Option<&str>,
        desired: &[DesiredMember],
    ) -> Result<Vec<MemberUpdate>> {
        let roster = self.roster(team)?;
        reconcile::team::plan(desired, &roster)
    }

    /// Apply role and confirmation changes for `desired`.
    ///
    /// The merged result is the full roster with the applied changes.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::MemberUnresolved` for an unknown member, or
    /// an `ApplyError` if an update fails.
    pub fn reconcile_team_members(
        &self,
        team: Option<&str>,
        desired: &[DesiredMember],
    ) -> Result<Applied<TeamMember>> {
        let team_id = self.platform.require_team(team)?;
        let mut roster = self.roster(Some(&team_id))?;
        let updates = reconcile::team::plan(desired, &roster)?;

        info!(team = %team_id, updates = updates.len(), "reconciling team members");

        let mut batch = self.batch(updates.len());
        for update in &updates {
            let op = Operation::update_member(&team_id, update);
            batch.issue(
                OpContext::new(
                    OpKind::Update,
                    format!("member {} ({} -> {})", update.uid, update.previous_role, update.role),
                    Some(&update.uid),
                ),
                || self.call(&op),
            )?;

            if let Some(member) = roster.iter_mut().find(|m| m.uid == update.uid) {
                member.role = update.role;
                member.confirmed = update.confirmed;
            }
        }

        Ok(Applied {
            merged: roster,
            completed: batch.finish(),
        })
    }

    /// Import a team's roster by team identifier.
    ///
    /// # Errors
    ///
    /// Returns `ImportIdError::Malformed` if `raw` isn't a single segment,
    /// or `ApplyError::Failed` if the team doesn't exist.
    pub fn import_team_members(&self, raw: &str) -> Result<Vec<TeamMember>> {
        let id = CompositeId::decode_with_arity(raw, TEAM_ARITY)?;
        let team_id = self.platform.require_team(id.team.as_deref())?;

        self.read_existing(
            OpContext::new(OpKind::Read, format!("team {}", team_id), None),
            &Operation::get_team(&team_id),
        )?;
        let roster = self.roster(Some(&team_id))?;
        info!(team = %team_id, members = roster.len(), "imported team members");
        Ok(roster)
    }

    /// The roster of a team that must exist.
    fn roster(&self, team: Option<&str>) -> Result<Vec<TeamMember>> {
        let team_id = self.platform.require_team(team)?;
        let response = self.read_existing(
            OpContext::new(OpKind::Read, format!("team {} members", team_id), None),
            &Operation::list_members(&team_id),
        )?;
        parse_roster(response)
    }
}
