use actix_web::{HttpResponse, Responder, get, web};

use crate::domain::types::ServiceTypeId;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::service_types::effective_values;

/// Effective assignee and price of a service type with their sources.
#[get("/v1/service-types/{service_type_id}/effective")]
pub async fn api_v1_effective_values(
    service_type_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(id) = ServiceTypeId::new(service_type_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match effective_values(id, repo.get_ref()) {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to resolve effective values: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
