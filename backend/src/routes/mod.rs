//! Route definitions for the Gradebook server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create application routes
pub fn app_routes(state: AppState) -> Router<AppState> {
    // Protected routes
    let protected = Router::new()
        .merge(record_routes())
        .merge(report_routes())
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Session routes (public)
        .merge(session_routes())
        .merge(protected)
}

/// Login and logout (public)
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
}

/// Students, subjects and grades
fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(handlers::list_students))
        .route("/add_student", post(handlers::add_student))
        .route(
            "/subjects",
            get(handlers::list_subjects).post(handlers::add_subject),
        )
        .route(
            "/add_grade",
            get(handlers::add_grade_form).post(handlers::add_grade),
        )
        .route("/grades", get(handlers::view_grades))
}

/// Averages and failing-grade reports
fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/average_grade",
            get(handlers::average_grade_form).post(handlers::average_grade),
        )
        .route(
            "/count_twos",
            get(handlers::count_twos).post(handlers::count_twos_submit),
        )
        .route(
            "/failing_students",
            get(handlers::failing_students).post(handlers::failing_students_submit),
        )
}

/// Account administration
fn admin_routes() -> Router<AppState> {
    Router::new().route("/register", post(handlers::register))
}
