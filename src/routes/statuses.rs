use actix_multipart::form::MultipartForm;
use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::notifications::NotificationAudience;
use crate::domain::types::{CategoryId, ServiceTypeId, StatusId};
use crate::dto::statuses::color_options;
use crate::forms::ListFilterQuery;
use crate::forms::import_export::{StatusImportForm, parse_status_upload};
use crate::forms::service_types::NotificationFlagForm;
use crate::forms::statuses::{StatusForm, StatusFormPayload};
use crate::repository::{DieselRepository, StatusListQuery};
use crate::routes::{base_context, finish_mutation, flash_service_error, redirect, render_template};
use crate::services::ServiceError;
use crate::services::import_export::{export_statuses, import_statuses};
use crate::services::service_types::toggle_notification;
use crate::services::statuses::{
    add_status as add_status_service, delete_status as delete_status_service,
    show_notification_tree, show_statuses as show_statuses_service, toggle_notification_category,
    toggle_notification_request_type, toggle_status as toggle_status_service,
    update_status as update_status_service,
};

const STATUSES_URL: &str = "/settings/statuses";

fn notifications_url(status_id: StatusId) -> String {
    format!("{STATUSES_URL}/{status_id}/notifications")
}

#[get("/settings/statuses")]
pub async fn show_statuses(
    params: web::Query<ListFilterQuery>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = StatusListQuery::default()
        .search(params.q.as_deref())
        .enabled(params.enabled_filter());

    match show_statuses_service(query, repo.get_ref()) {
        Ok(statuses) => {
            let mut context = base_context(&flash_messages, "statuses");
            context.insert("statuses", &statuses);
            context.insert("colors", &color_options());
            context.insert("search", &params.q);
            context.insert("enabled", params.enabled_filter().as_str());
            render_template(&tera, "statuses/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render statuses page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn parse_form(form: StatusForm) -> Result<StatusFormPayload, HttpResponse> {
    StatusFormPayload::try_from(form).map_err(|e| {
        let err: ServiceError = e.into();
        flash_service_error(err, "save status").unwrap_or_else(|| redirect(STATUSES_URL))
    })
}

fn parse_id(status_id: i32) -> Result<StatusId, HttpResponse> {
    StatusId::new(status_id).map_err(|e| {
        FlashMessage::error(e.to_string()).send();
        redirect(STATUSES_URL)
    })
}

#[post("/settings/statuses")]
pub async fn add_status(
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StatusForm>,
) -> impl Responder {
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        add_status_service(payload, repo.get_ref()),
        |status| format!("Status \"{}\" added.", status.name),
        "add status",
        STATUSES_URL,
    )
}

#[post("/settings/statuses/{status_id}/update")]
pub async fn update_status(
    status_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StatusForm>,
) -> impl Responder {
    let id = match parse_id(status_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        update_status_service(id, payload, repo.get_ref()),
        |_| "Status updated.".to_string(),
        "update status",
        STATUSES_URL,
    )
}

#[post("/settings/statuses/{status_id}/delete")]
pub async fn delete_status(
    status_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(status_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        delete_status_service(id, repo.get_ref()),
        |_| "Status deleted.".to_string(),
        "delete status",
        STATUSES_URL,
    )
}

#[post("/settings/statuses/{status_id}/toggle")]
pub async fn toggle_status(
    status_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(status_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        toggle_status_service(id, repo.get_ref()),
        |enabled| {
            if enabled {
                "Status enabled.".to_string()
            } else {
                "Status disabled.".to_string()
            }
        },
        "toggle status",
        STATUSES_URL,
    )
}

#[get("/settings/statuses/export")]
pub async fn export_status_collection(repo: web::Data<DieselRepository>) -> impl Responder {
    match export_statuses(repo.get_ref()) {
        Ok(snapshots) => HttpResponse::Ok()
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"serviceRequestStatuses.json\"",
            ))
            .json(snapshots),
        Err(err) => {
            log::error!("Failed to export statuses: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/settings/statuses/import")]
pub async fn import_status_collection(
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<StatusImportForm>,
) -> impl Responder {
    let snapshots = match parse_status_upload(&mut form) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            log::warn!("Rejected status import: {e}");
            FlashMessage::error(e.to_string()).send();
            return redirect(STATUSES_URL);
        }
    };

    finish_mutation(
        import_statuses(snapshots, repo.get_ref()),
        |report| report.summary(),
        "import statuses",
        STATUSES_URL,
    )
}

#[get("/settings/statuses/{status_id}/notifications")]
pub async fn show_status_notifications(
    status_id: web::Path<i32>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = StatusId::new(status_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match show_notification_tree(id, repo.get_ref()) {
        Ok(tree) => {
            let mut context = base_context(&flash_messages, "statuses");
            context.insert("tree", &tree);
            render_template(&tera, "statuses/notifications.html", &context)
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to render status notifications: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/settings/statuses/{status_id}/notifications/categories/{category_id}/toggle")]
pub async fn toggle_status_notification_category(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (status_id, category_id) = path.into_inner();
    let id = match parse_id(status_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Ok(category_id) = CategoryId::new(category_id) else {
        return HttpResponse::NotFound().finish();
    };

    finish_mutation(
        toggle_notification_category(id, category_id, repo.get_ref()),
        |_| "Notification settings saved.".to_string(),
        "toggle category notifications",
        &notifications_url(id),
    )
}

#[post("/settings/statuses/{status_id}/notifications/request-types/{service_type_id}/toggle")]
pub async fn toggle_status_notification_request_type(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (status_id, service_type_id) = path.into_inner();
    let id = match parse_id(status_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Ok(service_type_id) = ServiceTypeId::new(service_type_id) else {
        return HttpResponse::NotFound().finish();
    };

    finish_mutation(
        toggle_notification_request_type(id, service_type_id, repo.get_ref()),
        |_| "Notification settings saved.".to_string(),
        "toggle request type notifications",
        &notifications_url(id),
    )
}

#[post("/settings/statuses/{status_id}/notifications/request-types/{service_type_id}/notify")]
pub async fn toggle_status_notification_flag(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<NotificationFlagForm>,
) -> impl Responder {
    let (status_id, service_type_id) = path.into_inner();
    let id = match parse_id(status_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Ok(service_type_id) = ServiceTypeId::new(service_type_id) else {
        return HttpResponse::NotFound().finish();
    };
    let audience = match NotificationAudience::try_from(form) {
        Ok(audience) => audience,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&notifications_url(id));
        }
    };

    finish_mutation(
        toggle_notification(service_type_id, id, audience, repo.get_ref()),
        |_| "Notification settings saved.".to_string(),
        "toggle notification flag",
        &notifications_url(id),
    )
}
