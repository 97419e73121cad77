//! Role-scoped recipient sets.
//!
//! The recipient set is the membership authority for an object. It also
//! drives which public keys a new payload version is sealed for; changing it
//! affects only versions sealed afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type UserId = String;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSet {
    pub owner: UserId,
    #[serde(default)]
    pub collaborators: BTreeSet<UserId>,
    #[serde(default)]
    pub reviewers: BTreeSet<UserId>,
    #[serde(default)]
    pub editors: BTreeSet<UserId>,
}

impl RecipientSet {
    pub fn new(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            collaborators: BTreeSet::new(),
            reviewers: BTreeSet::new(),
            editors: BTreeSet::new(),
        }
    }

    pub fn with_collaborators<I>(mut self, collaborators: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        self.collaborators
            .extend(collaborators.into_iter().map(Into::into));
        self
    }

    pub fn with_editors<I>(mut self, editors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        self.editors.extend(editors.into_iter().map(Into::into));
        self
    }

    /// Membership governs scope: can *this* user act on *this* object.
    pub fn is_member(&self, user: &str) -> bool {
        self.owner == user
            || self.collaborators.contains(user)
            || self.reviewers.contains(user)
            || self.editors.contains(user)
    }

    /// All distinct member identities, in stable order.
    pub fn members(&self) -> BTreeSet<&str> {
        let mut members: BTreeSet<&str> = BTreeSet::new();
        members.insert(self.owner.as_str());
        members.extend(self.collaborators.iter().map(String::as_str));
        members.extend(self.reviewers.iter().map(String::as_str));
        members.extend(self.editors.iter().map(String::as_str));
        members
    }

    pub fn add_reviewer(&mut self, reviewer: impl Into<UserId>) {
        self.reviewers.insert(reviewer.into());
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        false // there is always an owner
    }
}
