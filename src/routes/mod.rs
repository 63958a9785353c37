use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::services::ServiceError;

pub mod api;
pub mod categories;
pub mod main;
pub mod service_types;
pub mod statuses;

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(tera.render(template, context).unwrap_or_else(|e| {
        log::error!("Failed to render template '{template}': {e}");
        String::new()
    }))
}

/// Bootstrap alert class of a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Flashes a failed operation for the next page.
///
/// Returns the response to send instead of the redirect when the failure is
/// not something the user can fix.
pub fn flash_service_error(err: ServiceError, action: &str) -> Option<HttpResponse> {
    match err {
        ServiceError::NotFound => FlashMessage::error(format!("Failed to {action}: not found.")).send(),
        ServiceError::Validation(report) => {
            for violation in report.violations() {
                FlashMessage::error(violation.message.clone()).send();
            }
        }
        ServiceError::Conflict(message)
        | ServiceError::Form(message)
        | ServiceError::TypeConstraint(message) => FlashMessage::error(message).send(),
        ServiceError::Internal => {
            log::error!("Failed to {action}");
            return Some(HttpResponse::InternalServerError().finish());
        }
    }
    None
}

/// Redirects to `location` after flashing `success` or the failure.
pub fn finish_mutation<T>(
    result: Result<T, ServiceError>,
    success: impl FnOnce(T) -> String,
    action: &str,
    location: &str,
) -> HttpResponse {
    match result {
        Ok(value) => FlashMessage::success(success(value)).send(),
        Err(err) => {
            if let Some(response) = flash_service_error(err, action) {
                return response;
            }
        }
    }
    redirect(location)
}
