use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::CategoryId;
use crate::forms::ListFilterQuery;
use crate::forms::categories::{CategoryForm, CategoryFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::{CategoryListQuery, DieselRepository};
use crate::routes::{base_context, finish_mutation, flash_service_error, redirect, render_template};
use crate::services::ServiceError;
use crate::services::categories::{
    add_category as add_category_service, delete_category as delete_category_service,
    show_categories as show_categories_service, toggle_category as toggle_category_service,
    update_category as update_category_service,
};

const CATEGORIES_URL: &str = "/settings/categories";

#[get("/settings/categories")]
pub async fn show_categories(
    params: web::Query<ListFilterQuery>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = CategoryListQuery::default()
        .search(params.q.as_deref())
        .enabled(params.enabled_filter());

    match show_categories_service(query, repo.get_ref()) {
        Ok(categories) => {
            let mut context = base_context(&flash_messages, "categories");
            context.insert("categories", &categories);
            context.insert("search", &params.q);
            context.insert("enabled", params.enabled_filter().as_str());
            context.insert("directory_users", &server_config.directory.users);
            context.insert("directory_teams", &server_config.directory.teams);
            render_template(&tera, "categories/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render categories page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn parse_form(form: CategoryForm) -> Result<CategoryFormPayload, HttpResponse> {
    CategoryFormPayload::try_from(form).map_err(|e| {
        let err: ServiceError = e.into();
        flash_service_error(err, "save category").unwrap_or_else(|| redirect(CATEGORIES_URL))
    })
}

fn parse_id(category_id: i32) -> Result<CategoryId, HttpResponse> {
    CategoryId::new(category_id).map_err(|e| {
        FlashMessage::error(e.to_string()).send();
        redirect(CATEGORIES_URL)
    })
}

#[post("/settings/categories")]
pub async fn add_category(
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        add_category_service(payload, repo.get_ref()),
        |category| format!("Category \"{}\" added.", category.name),
        "add category",
        CATEGORIES_URL,
    )
}

#[post("/settings/categories/{category_id}/update")]
pub async fn update_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    let id = match parse_id(category_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let payload = match parse_form(form) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    finish_mutation(
        update_category_service(id, payload, repo.get_ref()),
        |_| "Category updated.".to_string(),
        "update category",
        CATEGORIES_URL,
    )
}

#[post("/settings/categories/{category_id}/delete")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(category_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        delete_category_service(id, repo.get_ref()),
        |_| "Category deleted.".to_string(),
        "delete category",
        CATEGORIES_URL,
    )
}

#[post("/settings/categories/{category_id}/toggle")]
pub async fn toggle_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(category_id.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    finish_mutation(
        toggle_category_service(id, repo.get_ref()),
        |enabled| {
            if enabled {
                "Category enabled.".to_string()
            } else {
                "Category disabled.".to_string()
            }
        },
        "toggle category",
        CATEGORIES_URL,
    )
}
