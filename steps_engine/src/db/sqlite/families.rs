use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::{users, SqliteDatabaseError},
    db_types::{Family, FamilyAccount, FamilyInvitation, InviteStatus, Points},
};

/// Inserts a new family. Returns `Ok(None)` if the name is already taken.
pub async fn insert_family(name: &str, conn: &mut SqliteConnection) -> Result<Option<Family>, SqliteDatabaseError> {
    let now = Utc::now();
    let result = sqlx::query_as("INSERT INTO families (name, created_at, updated_at) VALUES ($1, $2, $2) RETURNING *")
        .bind(name)
        .bind(now)
        .fetch_one(conn)
        .await;
    match result {
        Ok(family) => Ok(Some(family)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("👪️ Family name '{name}' is already taken");
            Ok(None)
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_family(family_id: i64, conn: &mut SqliteConnection) -> Result<Option<Family>, SqliteDatabaseError> {
    let family = sqlx::query_as("SELECT * FROM families WHERE id = $1").bind(family_id).fetch_optional(conn).await?;
    Ok(family)
}

/// Takes the write lock and returns the family row. See [`users`] for why this is an update.
pub async fn lock_family(family_id: i64, conn: &mut SqliteConnection) -> Result<Option<Family>, SqliteDatabaseError> {
    let family = sqlx::query_as("UPDATE families SET updated_at = updated_at WHERE id = $1 RETURNING *")
        .bind(family_id)
        .fetch_optional(conn)
        .await?;
    trace!("👪️ Locked family #{family_id}");
    Ok(family)
}

/// Fetches the family and its members, ordered by user id.
pub async fn family_account(
    family_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<FamilyAccount>, SqliteDatabaseError> {
    let family = match fetch_family(family_id, &mut *conn).await? {
        Some(f) => f,
        None => return Ok(None),
    };
    let members = users::members_of(family_id, conn).await?;
    Ok(Some(FamilyAccount { family, members }))
}

pub async fn adjust_balance(
    family_id: i64,
    delta: Points,
    conn: &mut SqliteConnection,
) -> Result<Points, SqliteDatabaseError> {
    let balance: Points = sqlx::query_scalar(
        "UPDATE families SET balance = balance + $1, updated_at = $2 WHERE id = $3 RETURNING balance",
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(family_id)
    .fetch_optional(conn)
    .await?
    .ok_or(SqliteDatabaseError::FamilyNotFound(family_id))?;
    trace!("👪️ Family #{family_id} balance adjusted by {delta} to {balance}");
    Ok(balance)
}

pub async fn add_steps(family_id: i64, steps: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE families SET step_count = step_count + $1, updated_at = $2 WHERE id = $3")
        .bind(steps)
        .bind(Utc::now())
        .bind(family_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Renames the family. Returns `Ok(None)` if the name is already taken.
pub async fn rename_family(
    family_id: i64,
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Family>, SqliteDatabaseError> {
    let result = sqlx::query_as("UPDATE families SET name = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(name)
        .bind(Utc::now())
        .bind(family_id)
        .fetch_optional(conn)
        .await;
    match result {
        Ok(Some(family)) => Ok(Some(family)),
        Ok(None) => Err(SqliteDatabaseError::FamilyNotFound(family_id)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_family(family_id: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("DELETE FROM families WHERE id = $1").bind(family_id).execute(conn).await?;
    debug!("👪️ Family #{family_id} deleted");
    Ok(())
}

//----------------------------------------------   Invitations  ----------------------------------------------------

pub async fn insert_invitation(
    family_id: i64,
    inviter_id: i64,
    invitee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<FamilyInvitation, SqliteDatabaseError> {
    let invitation = sqlx::query_as(
        r#"
        INSERT INTO family_invitations (family_id, inviter_id, invitee_id, status, created_at)
        VALUES ($1, $2, $3, 'pending', $4)
        RETURNING *
        "#,
    )
    .bind(family_id)
    .bind(inviter_id)
    .bind(invitee_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(invitation)
}

pub async fn pending_invitation_exists(
    family_id: i64,
    invitee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM family_invitations WHERE family_id = $1 AND invitee_id = $2 AND status = 'pending'",
    )
    .bind(family_id)
    .bind(invitee_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

pub async fn pending_invitation(
    invitation_id: i64,
    invitee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<FamilyInvitation>, SqliteDatabaseError> {
    let invitation = sqlx::query_as(
        "SELECT * FROM family_invitations WHERE id = $1 AND invitee_id = $2 AND status = 'pending'",
    )
    .bind(invitation_id)
    .bind(invitee_id)
    .fetch_optional(conn)
    .await?;
    Ok(invitation)
}

pub async fn pending_invitations_for(
    invitee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<FamilyInvitation>, SqliteDatabaseError> {
    let invitations = sqlx::query_as(
        "SELECT * FROM family_invitations WHERE invitee_id = $1 AND status = 'pending' ORDER BY created_at DESC, id DESC",
    )
    .bind(invitee_id)
    .fetch_all(conn)
    .await?;
    Ok(invitations)
}

pub async fn set_invitation_status(
    invitation_id: i64,
    status: InviteStatus,
    conn: &mut SqliteConnection,
) -> Result<FamilyInvitation, SqliteDatabaseError> {
    let invitation = sqlx::query_as(
        "UPDATE family_invitations SET status = $1, responded_at = $2 WHERE id = $3 RETURNING *",
    )
    .bind(status)
    .bind(Utc::now())
    .bind(invitation_id)
    .fetch_one(conn)
    .await?;
    Ok(invitation)
}

/// Drops every invitation sent to or by the user. Used when membership changes make them meaningless.
pub async fn delete_invitations_involving(user_id: i64, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM family_invitations WHERE (invitee_id = $1 OR inviter_id = $1) AND status = 'pending'")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_invitations_for_family(family_id: i64, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM family_invitations WHERE family_id = $1").bind(family_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete_invitation(invitation_id: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("DELETE FROM family_invitations WHERE id = $1").bind(invitation_id).execute(conn).await?;
    Ok(())
}
