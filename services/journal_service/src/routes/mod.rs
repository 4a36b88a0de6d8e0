use actix_web::{web, HttpResponse};
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;

mod assignments;
mod auth;
mod dashboard;
mod form;
mod groups;
mod logs;
mod profile;
mod reports;

pub(crate) fn configure_service(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(auth::register)))
        .service(web::resource("/login").route(web::post().to(auth::login)))
        .service(web::resource("/logout").route(web::get().to(auth::logout)))
        .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
        .service(web::resource("/groups/create").route(web::post().to(groups::create)))
        .service(web::resource("/groups/join").route(web::post().to(groups::join)))
        .service(web::resource("/groups/{group_id}").route(web::get().to(groups::describe)))
        .service(web::resource("/logs/create").route(web::post().to(logs::create)))
        .service(web::resource("/logs/{log_id}").route(web::get().to(logs::describe)))
        .service(web::resource("/logs/{log_id}/feedback").route(web::post().to(logs::feedback)))
        .service(web::resource("/assignments/create").route(web::post().to(assignments::create)))
        .service(web::resource("/assignments/{assignment_id}").route(web::get().to(assignments::describe)))
        .service(web::resource("/assignments/{assignment_id}/submit").route(web::post().to(assignments::submit)))
        .service(web::resource("/assignments/{assignment_id}/grade").route(web::post().to(assignments::grade)))
        .service(web::resource("/generate-report/{group_id}").route(web::get().to(reports::generate)))
        .service(web::resource("/api/timeline/{group_id}").route(web::get().to(reports::timeline)))
        .service(web::resource("/profile/update").route(web::post().to(profile::update)));
}

/// Maps an operation failure to its status code with an `{"error": ...}`
/// body. Internal faults were already logged where they occurred.
pub(crate) fn error_response<E: OperationError>(err: &EndpointError<E>) -> HttpResponse {
    HttpResponse::build(err.status_code()).json(serde_json::json!({ "error": err.message() }))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    enum FakeError {
        #[error("Thing not found.")]
        NotFound,
    }

    impl OperationError for FakeError {
        fn status_code(&self) -> StatusCode {
            StatusCode::NOT_FOUND
        }
    }

    #[test]
    fn error_body_carries_the_message() {
        let response = error_response(&EndpointError::operation(FakeError::NotFound));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_is_opaque() {
        let response = error_response(&EndpointError::<FakeError>::internal());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
