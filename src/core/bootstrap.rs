use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::Gender;
use crate::repositories;
use crate::repositories::users::{CreateUser, UpdateUser};

/// Creates or repairs the staff account named by `FIRST_SUPERUSER_RUT`.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let rut = &admin.first_superuser_rut;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_rut(state.db(), rut).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        let mut update = UpdateUser::default();
        if !verified {
            update.hashed_password =
                Some(security::hash_password(&admin.first_superuser_password)?);
        }
        if !user.is_staff {
            update.is_staff = Some(true);
        }
        if !user.is_superuser {
            update.is_superuser = Some(true);
        }
        if !user.is_active {
            update.is_active = Some(true);
        }

        let needs_update = update.hashed_password.is_some()
            || update.is_staff.is_some()
            || update.is_superuser.is_some()
            || update.is_active.is_some();
        if needs_update {
            repositories::users::update(state.db(), &user.id, update, now).await?;
            tracing::info!("Updated default superuser {rut}");
        } else {
            tracing::info!("Default superuser already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    let id = Uuid::new_v4().to_string();
    repositories::users::create(
        state.db(),
        CreateUser {
            id: &id,
            rut,
            username: rut,
            hashed_password,
            first_name: "Administrador",
            last_name: "INACAP",
            email: "admin@inacap.cl",
            phone: None,
            birth_date: None,
            gender: Gender::PreferNotToSay,
            campus: "",
            career: "",
            current_semester: 1,
            gpa: 4.0,
            is_tutor: false,
            is_staff: true,
            is_superuser: true,
            now,
        },
    )
    .await?;

    tracing::info!("Created default superuser {rut}");
    Ok(())
}

/// Drops session records whose cookie lifetime has elapsed.
pub(crate) async fn purge_expired_sessions(state: &AppState) -> anyhow::Result<u64> {
    let removed =
        repositories::auth_sessions::delete_expired(state.db(), primitive_now_utc()).await?;
    if removed > 0 {
        tracing::info!(removed, "Purged expired sessions");
    }
    Ok(removed)
}
