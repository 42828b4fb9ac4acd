//! Grant and revoke commands.

use gitlab_connector::connector::{Connector, MutationOutcome};

/// Grant `user_id` the capability named by `entitlement_id`.
pub async fn handle_grant(
    connector: &Connector,
    entitlement_id: &str,
    user_id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = connector.grant(entitlement_id, user_id).await?;
    match outcome {
        MutationOutcome::Applied => {
            println!("granted {entitlement_id} to user {user_id}");
        }
        MutationOutcome::AlreadyExists => {
            println!("user {user_id} already holds {entitlement_id}; nothing to do");
        }
        MutationOutcome::AlreadyRevoked => unreachable!("grant never reports a revoke outcome"),
    }
    Ok(())
}

/// Revoke `user_id`'s capability named by `entitlement_id`.
pub async fn handle_revoke(
    connector: &Connector,
    entitlement_id: &str,
    user_id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = connector.revoke(entitlement_id, user_id).await?;
    match outcome {
        MutationOutcome::Applied => {
            println!("revoked {entitlement_id} from user {user_id}");
        }
        MutationOutcome::AlreadyRevoked => {
            println!("user {user_id} does not hold {entitlement_id}; nothing to do");
        }
        MutationOutcome::AlreadyExists => unreachable!("revoke never reports a grant outcome"),
    }
    Ok(())
}
