use crate::models::bulk_action::{ActorRef, BulkAction, TargetIds};
use crate::models::user::UserStatus;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum BulkActionError {
    #[error("Current user ID required")]
    MissingActor,
    #[error("You are not allowed to perform this action")]
    NotAuthorized,
    #[error("No users selected")]
    InvalidTargets,
    #[error("Actor status check failed: {0}")]
    AuthorizationCheck(#[source] RepositoryError),
    #[error("Bulk {action} failed: {source}")]
    Storage {
        action: BulkAction,
        #[source]
        source: RepositoryError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub action: BulkAction,
    pub requested: usize,
    /// Rows the statement matched; ids with no row are not counted.
    pub affected: u64,
}

/// Guards mutating actions behind the "acting user is active" check.
pub struct AccessService {
    user_repository: Arc<dyn UserRepository>,
}

impl AccessService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// True only when a row with this id exists and its status is `active`.
    /// A missing row and a blocked row are the same answer.
    pub async fn is_actor_active(&self, actor_id: i64) -> Result<bool, RepositoryError> {
        let status = self.user_repository.find_status(actor_id).await?;
        Ok(status == Some(UserStatus::Active))
    }

    /// Applies `action` to every target in one write.
    ///
    /// Gates run in order and the first failure ends the call: actor
    /// present, actor active, targets non-empty. Ids with no row are ignored,
    /// and nothing stops an actor from targeting themself.
    #[instrument(
        skip(self, targets),
        fields(requested = targets.as_ref().map(TargetIds::requested))
    )]
    pub async fn apply_bulk_action(
        &self,
        actor: ActorRef,
        targets: Option<TargetIds>,
        action: BulkAction,
    ) -> Result<BulkOutcome, BulkActionError> {
        let allowed = match actor {
            ActorRef::Missing => return Err(BulkActionError::MissingActor),
            ActorRef::Unresolved => false,
            ActorRef::Id(actor_id) => self
                .is_actor_active(actor_id)
                .await
                .map_err(BulkActionError::AuthorizationCheck)?,
        };
        if !allowed {
            warn!(?actor, %action, "bulk action refused: actor not active");
            return Err(BulkActionError::NotAuthorized);
        }

        let targets = match targets {
            Some(targets) if !targets.is_empty() => targets,
            _ => return Err(BulkActionError::InvalidTargets),
        };

        let ids = targets.ids();
        let written = match action.target_status() {
            Some(status) => self.user_repository.set_status(ids, status).await,
            None => self.user_repository.delete_users(ids).await,
        };
        let affected = written.map_err(|source| BulkActionError::Storage { action, source })?;

        info!(
            ?actor,
            %action,
            requested = targets.requested(),
            affected,
            "bulk action applied"
        );

        Ok(BulkOutcome {
            action,
            requested: targets.requested(),
            affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn actor_with_status(mock_repo: &mut MockUserRepository, status: Option<UserStatus>) {
        mock_repo
            .expect_find_status()
            .with(eq(1))
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(status) }));
    }

    #[tokio::test]
    async fn test_is_actor_active() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_status().returning(|id| {
            Box::pin(async move {
                Ok(match id {
                    1 => Some(UserStatus::Active),
                    2 => Some(UserStatus::Blocked),
                    _ => None,
                })
            })
        });

        let service = AccessService::new(Arc::new(mock_repo));
        assert!(service.is_actor_active(1).await.unwrap());
        assert!(!service.is_actor_active(2).await.unwrap());
        assert!(!service.is_actor_active(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_actor_fails_before_any_lookup() {
        let service = AccessService::new(Arc::new(MockUserRepository::new()));

        let result = service
            .apply_bulk_action(ActorRef::Missing, Some(TargetIds::new(vec![1])), BulkAction::Block)
            .await;
        assert!(matches!(result, Err(BulkActionError::MissingActor)));
    }

    #[tokio::test]
    async fn test_unresolved_actor_is_not_authorized() {
        let service = AccessService::new(Arc::new(MockUserRepository::new()));

        let result = service
            .apply_bulk_action(
                ActorRef::Unresolved,
                Some(TargetIds::new(vec![1])),
                BulkAction::Delete,
            )
            .await;
        assert!(matches!(result, Err(BulkActionError::NotAuthorized)));
    }

    #[tokio::test]
    async fn test_blocked_or_unknown_actor_never_writes() {
        for status in [Some(UserStatus::Blocked), None] {
            for action in [BulkAction::Block, BulkAction::Unblock, BulkAction::Delete] {
                let mut mock_repo = MockUserRepository::new();
                actor_with_status(&mut mock_repo, status);
                mock_repo.expect_set_status().never();
                mock_repo.expect_delete_users().never();

                let service = AccessService::new(Arc::new(mock_repo));
                let result = service
                    .apply_bulk_action(ActorRef::Id(1), Some(TargetIds::new(vec![2])), action)
                    .await;
                assert!(matches!(result, Err(BulkActionError::NotAuthorized)));
            }
        }
    }

    #[tokio::test]
    async fn test_status_check_failure_is_distinct() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_status()
            .times(1)
            .returning(|_| {
                Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)) })
            });

        let service = AccessService::new(Arc::new(mock_repo));
        let result = service
            .apply_bulk_action(ActorRef::Id(1), Some(TargetIds::new(vec![2])), BulkAction::Block)
            .await;
        assert!(matches!(result, Err(BulkActionError::AuthorizationCheck(_))));
    }

    #[tokio::test]
    async fn test_targets_checked_after_authorization() {
        for targets in [None, Some(TargetIds::new(vec![]))] {
            let mut mock_repo = MockUserRepository::new();
            actor_with_status(&mut mock_repo, Some(UserStatus::Active));
            mock_repo.expect_set_status().never();

            let service = AccessService::new(Arc::new(mock_repo));
            let result = service
                .apply_bulk_action(ActorRef::Id(1), targets, BulkAction::Block)
                .await;
            assert!(matches!(result, Err(BulkActionError::InvalidTargets)));
        }
    }

    #[tokio::test]
    async fn test_block_and_unblock_write_status() {
        for (action, expected) in [
            (BulkAction::Block, UserStatus::Blocked),
            (BulkAction::Unblock, UserStatus::Active),
        ] {
            let mut mock_repo = MockUserRepository::new();
            actor_with_status(&mut mock_repo, Some(UserStatus::Active));
            mock_repo
                .expect_set_status()
                .withf(move |ids, status| *ids == [1, 2, 3] && *status == expected)
                .times(1)
                .returning(|_, _| Box::pin(async move { Ok(2) }));

            let service = AccessService::new(Arc::new(mock_repo));
            let outcome = service
                .apply_bulk_action(ActorRef::Id(1), Some(TargetIds::new(vec![1, 2, 3])), action)
                .await
                .unwrap();
            assert_eq!(outcome.requested, 3);
            assert_eq!(outcome.affected, 2);
        }
    }

    #[tokio::test]
    async fn test_delete_removes_rows() {
        let mut mock_repo = MockUserRepository::new();
        actor_with_status(&mut mock_repo, Some(UserStatus::Active));
        mock_repo
            .expect_delete_users()
            .withf(|ids| *ids == [1, 99])
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));
        mock_repo.expect_set_status().never();

        let service = AccessService::new(Arc::new(mock_repo));
        let outcome = service
            .apply_bulk_action(
                ActorRef::Id(1),
                Some(TargetIds::new(vec![1, 99])),
                BulkAction::Delete,
            )
            .await
            .unwrap();
        assert_eq!(outcome.action, BulkAction::Delete);
        assert_eq!(outcome.affected, 1);
    }

    #[tokio::test]
    async fn test_write_failure_names_the_action() {
        let mut mock_repo = MockUserRepository::new();
        actor_with_status(&mut mock_repo, Some(UserStatus::Active));
        mock_repo
            .expect_set_status()
            .times(1)
            .returning(|_, _| {
                Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolClosed)) })
            });

        let service = AccessService::new(Arc::new(mock_repo));
        let result = service
            .apply_bulk_action(ActorRef::Id(1), Some(TargetIds::new(vec![4])), BulkAction::Unblock)
            .await;
        assert!(matches!(
            result,
            Err(BulkActionError::Storage {
                action: BulkAction::Unblock,
                ..
            })
        ));
    }
}
