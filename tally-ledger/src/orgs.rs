//! Organizations partition the ledger; only members may read or write one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::Clock;

use crate::error::{LedgerError, Result};
use crate::store::LedgerStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Slug derived from the name ("Household Budget" -> "household-budget")
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Lower-case, alphanumeric runs joined by single dashes.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

impl LedgerStore {
    /// Create an organization with `owner` as its first member.
    pub fn create_organization(
        &mut self,
        name: &str,
        owner: &str,
        clock: &impl Clock,
    ) -> Result<Organization> {
        let id = slugify(name);
        if id.is_empty() {
            return Err(LedgerError::InvalidOrganizationName(name.to_string()));
        }
        if self.organization(&id).is_some() {
            return Err(LedgerError::OrganizationExists(id));
        }

        let org = Organization {
            id,
            name: name.trim().to_string(),
            members: vec![owner.to_string()],
            created_at: clock.now_utc(),
        };
        self.organizations_mut().push(org.clone());
        tracing::info!(org = %org.id, owner, "organization created");
        Ok(org)
    }

    pub fn organization(&self, org_id: &str) -> Option<&Organization> {
        self.organizations().iter().find(|o| o.id == org_id)
    }

    /// Add a member. Adding an existing member is a no-op.
    pub fn add_member(&mut self, org_id: &str, user_id: &str) -> Result<()> {
        let org = self
            .organizations_mut()
            .iter_mut()
            .find(|o| o.id == org_id)
            .ok_or_else(|| LedgerError::OrganizationNotFound(org_id.to_string()))?;

        if !org.has_member(user_id) {
            org.members.push(user_id.to_string());
            tracing::info!(org = org_id, user = user_id, "member added");
        }
        Ok(())
    }

    /// Fail unless `user_id` belongs to `org_id`.
    pub fn require_member(&self, org_id: &str, user_id: &str) -> Result<&Organization> {
        if org_id.trim().is_empty() {
            return Err(LedgerError::OrganizationRequired);
        }
        let org = self
            .organization(org_id)
            .ok_or_else(|| LedgerError::OrganizationNotFound(org_id.to_string()))?;
        if !org.has_member(user_id) {
            return Err(LedgerError::NotAMember(org_id.to_string()));
        }
        Ok(org)
    }

    pub fn organizations_for<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Organization> {
        self.organizations().iter().filter(move |o| o.has_member(user_id))
    }
}
