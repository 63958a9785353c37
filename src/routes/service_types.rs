use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::notifications::NotificationAudience;
use crate::domain::types::{ServiceTypeId, StatusId};
use crate::dto::service_types::approver_options;
use crate::forms::ListFilterQuery;
use crate::forms::import_export::DownloadQuery;
use crate::forms::service_types::{NotificationFlagForm, ServiceTypeForm, ServiceTypeFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::{DieselRepository, ServiceTypeListQuery};
use crate::routes::{base_context, finish_mutation, flash_service_error, redirect, render_template};
use crate::services::ServiceError;
use crate::services::import_export::download_service_types as download_service_types_service;
use crate::services::service_types::{
    add_service_type as add_service_type_service,
    delete_service_type as delete_service_type_service,
    show_service_types as show_service_types_service, toggle_notification,
    toggle_service_type as toggle_service_type_service, toggle_status_membership,
    update_service_type as update_service_type_service,
};

const SERVICE_TYPES_URL: &str = "/settings/service-types";

#[get("/settings/service-types")]
pub async fn show_service_types(
    params: web::Query<ListFilterQuery>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut query = ServiceTypeListQuery::default()
        .search(params.q.as_deref())
        .enabled(params.enabled_filter());
    if let Some(category_id) = params.category_id() {
        query = query.category(category_id);
    }
    if let Some(status_id) = params.status_id() {
        query = query.status(status_id);
    }

    match show_service_types_service(query, repo.get_ref()) {
        Ok(page) => {
            let mut context = base_context(&flash_messages, "service_types");
            context.insert("service_types", &page.service_types);
            context.insert("categories", &page.categories);
            context.insert("statuses", &page.statuses);
            context.insert("approvers", &approver_options());
            context.insert("search", &params.q);
            context.insert("enabled", params.enabled_filter().as_str());
            context.insert("category_id", &params.category_id().map(|id| id.get()));
            context.insert("status_id", &params.status_id().map(|id| id.get()));
            context.insert("directory_users", &server_config.directory.users);
            context.insert("directory_teams", &server_config.directory.teams);
            render_template(&tera, "service_types/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render service types page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/settings/service-types/download")]
pub async fn download_service_types(
    params: web::Query<DownloadQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let format = match params.format() {
        Ok(format) => format,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(SERVICE_TYPES_URL);
        }
    };

    match download_service_types_service(format, repo.get_ref()) {
        Ok(file) => HttpResponse::Ok()
            .content_type(file.content_type)
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Err(err) => {
            log::error!("Failed to download service types: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn parse_form(form: ServiceTypeForm) -> Result<ServiceTypeFormPayload, HttpResponse> {
    ServiceTypeFormPayload::try_from(form).map_err(|e| {
        let err: ServiceError = e.into();
        flash_service_error(err, "save service type")
            .unwrap_or_else(|| redirect(SERVICE_TYPES_URL))
    })
}

fn parse_id(service_type_id: i32) -> Result<ServiceTypeId, HttpResponse> {
    ServiceTypeId::new(service_type_id).map_err(|e| {
        FlashMessage::error(e.to_string()).send();
        redirect(SERVICE_TYPES_URL)
    })
}

fn parse_ids(path: (i32, i32)) -> Result<(ServiceTypeId, StatusId), HttpResponse> {
    let service_type_id = parse_id(path.0)?;
    let status_id = StatusId::new(path.1).map_err(|e| {
        FlashMessage::error(e.to_string()).send();
        redirect(SERVICE_TYPES_URL)
    })?;
    Ok((service_type_id, status_id))
}

#[post("/settings/service-types")]
pub async fn add_service_type(
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ServiceTypeForm>,
) -> impl Responder {
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        add_service_type_service(payload, repo.get_ref()),
        |service_type| format!("Service type \"{}\" added.", service_type.request_type),
        "add service type",
        SERVICE_TYPES_URL,
    )
}

#[post("/settings/service-types/{service_type_id}/update")]
pub async fn update_service_type(
    service_type_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ServiceTypeForm>,
) -> impl Responder {
    let id = match parse_id(service_type_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        update_service_type_service(id, payload, repo.get_ref()),
        |_| "Service type updated.".to_string(),
        "update service type",
        SERVICE_TYPES_URL,
    )
}

#[post("/settings/service-types/{service_type_id}/delete")]
pub async fn delete_service_type(
    service_type_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(service_type_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        delete_service_type_service(id, repo.get_ref()),
        |_| "Service type deleted.".to_string(),
        "delete service type",
        SERVICE_TYPES_URL,
    )
}

#[post("/settings/service-types/{service_type_id}/toggle")]
pub async fn toggle_service_type(
    service_type_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(service_type_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        toggle_service_type_service(id, repo.get_ref()),
        |enabled| {
            if enabled {
                "Service type enabled.".to_string()
            } else {
                "Service type disabled.".to_string()
            }
        },
        "toggle service type",
        SERVICE_TYPES_URL,
    )
}

#[post("/settings/service-types/{service_type_id}/statuses/{status_id}/toggle")]
pub async fn toggle_service_type_status(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (id, status_id) = match parse_ids(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    finish_mutation(
        toggle_status_membership(id, status_id, repo.get_ref()),
        |attached| {
            if attached {
                "Status attached.".to_string()
            } else {
                "Status detached.".to_string()
            }
        },
        "toggle status",
        SERVICE_TYPES_URL,
    )
}

#[post("/settings/service-types/{service_type_id}/statuses/{status_id}/notify")]
pub async fn toggle_service_type_notification(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<NotificationFlagForm>,
) -> impl Responder {
    let (id, status_id) = match parse_ids(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };
    let audience = match NotificationAudience::try_from(form) {
        Ok(audience) => audience,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(SERVICE_TYPES_URL);
        }
    };

    finish_mutation(
        toggle_notification(id, status_id, audience, repo.get_ref()),
        |flags| {
            let state = if flags.get(audience) { "on" } else { "off" };
            format!("Notify {}: {state}.", audience.as_str())
        },
        "toggle notification",
        SERVICE_TYPES_URL,
    )
}
