use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::AppState;

mod calendar;
mod gym;
mod library;
mod metric;
mod pattern;
mod program;
mod report;
mod user;
mod workout;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(user::list).post(user::create))
        .route("/api/users/:id", put(user::modify).delete(user::delete))
        .route(
            "/api/profile",
            get(user::profile).put(user::replace_profile),
        )
        .route(
            "/api/equipment",
            get(library::list_equipment).post(library::create_equipment),
        )
        .route(
            "/api/equipment/:id",
            put(library::replace_equipment).delete(library::delete_equipment),
        )
        .route(
            "/api/exercises",
            get(library::list_exercises).post(library::create_exercise),
        )
        .route(
            "/api/exercises/:id",
            get(library::get_exercise)
                .put(library::replace_exercise)
                .delete(library::delete_exercise),
        )
        .route(
            "/api/exercises/:id/preference",
            get(library::exercise_preference).put(library::replace_exercise_preference),
        )
        .route(
            "/api/exercises/:id/previous-sets",
            get(workout::previous_sets),
        )
        .route("/api/gyms", get(gym::list).post(gym::create))
        .route(
            "/api/gyms/:id",
            get(gym::get).put(gym::replace).delete(gym::delete),
        )
        .route("/api/gyms/:id/equipment", post(gym::add_equipment))
        .route(
            "/api/gyms/:id/equipment/:equipment_id",
            delete(gym::remove_equipment),
        )
        .route("/api/gyms/:id/exercises", get(gym::exercises))
        .route(
            "/api/gyms/:id/exercises/:exercise_id",
            put(gym::replace_exercise),
        )
        .route("/api/programs", get(program::list).post(program::create))
        .route(
            "/api/programs/:id",
            get(program::get)
                .patch(program::modify)
                .delete(program::delete),
        )
        .route("/api/programs/:id/duplicate", post(program::duplicate))
        .route(
            "/api/programs/:id/shares",
            get(program::shares).post(program::share),
        )
        .route("/api/program-shares/:id", delete(program::unshare))
        .route("/api/program-weeks/:id", put(program::modify_week))
        .route("/api/program-days/:id", put(program::modify_day))
        .route("/api/program-days/:id/series", post(program::add_series))
        .route(
            "/api/series/:id",
            put(program::replace_series).delete(program::delete_series),
        )
        .route("/api/series/:id/move", post(program::move_series))
        .route("/api/calendar/events", get(calendar::events))
        .route(
            "/api/calendar/days/:id",
            get(calendar::scheduled_day).delete(calendar::delete_scheduled_day),
        )
        .route(
            "/api/calendar/days/:id/reschedule",
            post(calendar::reschedule),
        )
        .route("/api/calendar/missing-days", get(calendar::missing_days))
        .route(
            "/api/instances",
            get(calendar::instances).post(calendar::schedule),
        )
        .route("/api/instances/:id", delete(calendar::delete_instance))
        .route(
            "/api/instances/:id/missing-days",
            post(calendar::schedule_missing_day),
        )
        .route(
            "/api/instances/:id/weights",
            put(calendar::replace_instance_weight),
        )
        .route("/api/workouts", get(workout::list))
        .route("/api/workouts/standalone", post(workout::start_standalone))
        .route(
            "/api/workouts/start/:scheduled_day_id",
            post(workout::start),
        )
        .route("/api/workouts/:id", get(workout::get))
        .route("/api/workouts/:id/sets", post(workout::log_set))
        .route(
            "/api/workouts/:id/overall-rpe",
            post(workout::save_overall_rpe),
        )
        .route("/api/workouts/:id/complete", post(workout::complete))
        .route(
            "/api/body-metrics",
            get(metric::list).post(metric::record),
        )
        .route(
            "/api/body-patterns",
            get(pattern::list).post(pattern::create),
        )
        .route("/api/body-patterns/:id", delete(pattern::delete))
        .route("/api/reports/summary", get(report::summary))
        .route("/api/reports/exercises", get(report::exercises))
        .route(
            "/api/reports/exercises/:id/history",
            get(report::exercise_history),
        )
        .route("/api/reports/programs", get(report::programs))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
