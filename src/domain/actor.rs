use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Login identifier of a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Store,
    Quality,
    Finance,
    Milling,
    Sales,
    FieldOperations,
    DataAnalysis,
    Admin,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Quality => "quality",
            Self::Finance => "finance",
            Self::Milling => "milling",
            Self::Sales => "sales",
            Self::FieldOperations => "field_operations",
            Self::DataAnalysis => "data_analysis",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Finance,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Self::Staff => "staff",
            Self::Finance => "finance",
            Self::Admin => "admin",
        };
        f.write_str(role)
    }
}

/// A user acting on the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "user")]
    pub id: UserId,
    pub name: String,
    pub department: Department,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, department: Department, role: Role) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: UserId(id),
            department,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Known users, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    actors: HashMap<UserId, Actor>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    pub fn resolve(&self, id: &UserId) -> Result<&Actor> {
        self.actors
            .get(id)
            .ok_or_else(|| WorkflowError::UnknownUser(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl FromIterator<Actor> for Roster {
    fn from_iter<I: IntoIterator<Item = Actor>>(iter: I) -> Self {
        let mut roster = Self::new();
        for actor in iter {
            roster.insert(actor);
        }
        roster
    }
}
