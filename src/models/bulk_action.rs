use super::user::UserStatus;
use serde_json::Value;
use std::fmt;

/// A status change or removal applied to a set of users in one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Block,
    Unblock,
    Delete,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Block => "block",
            BulkAction::Unblock => "unblock",
            BulkAction::Delete => "delete",
        }
    }

    /// Status written by the action; `None` for delete.
    pub fn target_status(&self) -> Option<UserStatus> {
        match self {
            BulkAction::Block => Some(UserStatus::Blocked),
            BulkAction::Unblock => Some(UserStatus::Active),
            BulkAction::Delete => None,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            BulkAction::Block => "Users blocked successfully",
            BulkAction::Unblock => "Users unblocked successfully",
            BulkAction::Delete => "Users deleted successfully",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            BulkAction::Block => "Failed to block users",
            BulkAction::Unblock => "Failed to unblock users",
            BulkAction::Delete => "Failed to delete users",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRef {
    /// Absent or falsy (`null`, `false`, `0`, `""`).
    Missing,
    Id(i64),
    /// Present, but can never name a stored user.
    Unresolved,
}

impl ActorRef {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => ActorRef::Missing,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => ActorRef::Missing,
            Some(Value::String(s)) if s.is_empty() => ActorRef::Missing,
            Some(other) => id_from_json(other)
                .map(ActorRef::Id)
                .unwrap_or(ActorRef::Unresolved),
        }
    }
}

impl From<i64> for ActorRef {
    fn from(id: i64) -> Self {
        ActorRef::Id(id)
    }
}

/// Target user ids of a bulk action.
///
/// `requested` counts every element the caller sent; `ids` keeps only the
/// ones that can match a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIds {
    requested: usize,
    ids: Vec<i64>,
}

impl TargetIds {
    pub fn new(ids: Vec<i64>) -> Self {
        TargetIds {
            requested: ids.len(),
            ids,
        }
    }

    /// Returns `None` unless the value is a JSON array.
    pub fn from_json(value: Option<&Value>) -> Option<Self> {
        let items = value?.as_array()?;
        Some(TargetIds {
            requested: items.len(),
            ids: items.iter().filter_map(id_from_json).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.requested == 0
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

fn id_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
