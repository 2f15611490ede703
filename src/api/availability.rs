use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTutor;
use crate::core::state::AppState;
use crate::core::time::format_clock;
use crate::repositories;
use crate::schemas::availability::{AvailabilityItem, AvailabilityResponse, AvailabilityUpdated};
use crate::services::availability;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/my-availability", get(show_availability).put(update_availability))
}

async fn show_availability(
    State(state): State<AppState>,
    current: CurrentTutor,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let slots = repositories::availability::list_active_for_tutor(state.db(), &current.tutor.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load availability"))?;

    Ok(Json(AvailabilityResponse {
        hours: availability::hour_grid(),
        days: availability::day_labels(),
        saved: slots
            .into_iter()
            .map(|slot| AvailabilityItem {
                dia: Some(slot.day.label().to_string()),
                hora: Some(format_clock(slot.start_time)),
            })
            .collect(),
    }))
}

async fn update_availability(
    State(state): State<AppState>,
    current: CurrentTutor,
    Json(items): Json<Vec<AvailabilityItem>>,
) -> Result<Json<AvailabilityUpdated>, ApiError> {
    let slots = availability::parse_slots(
        items.iter().map(|item| (item.dia.as_deref(), item.hora.as_deref())),
    );

    availability::replace(state.db(), &current.tutor.id, &slots)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save availability"))?;

    tracing::info!(
        user_id = %current.user.id,
        tutor_id = %current.tutor.id,
        slots = slots.len(),
        action = "availability_replaced",
        "Availability updated"
    );

    Ok(Json(AvailabilityUpdated {
        status: "success",
        message: "Disponibilidad guardada correctamente",
        saved: slots.len(),
    }))
}
