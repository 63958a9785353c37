use std::io;

use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use dotenvy::dotenv;
use tera::Tera;

use pushkind_facilities::db::{establish_connection_pool, run_migrations};
use pushkind_facilities::models::config::ServerConfig;
use pushkind_facilities::repository::DieselRepository;
use pushkind_facilities::routes::api::api_v1_effective_values;
use pushkind_facilities::routes::categories::{
    add_category, delete_category, show_categories, toggle_category, update_category,
};
use pushkind_facilities::routes::main::index;
use pushkind_facilities::routes::service_types::{
    add_service_type, delete_service_type, download_service_types, show_service_types,
    toggle_service_type, toggle_service_type_notification, toggle_service_type_status,
    update_service_type,
};
use pushkind_facilities::routes::statuses::{
    add_status, delete_status, export_status_collection, import_status_collection,
    show_status_notifications, show_statuses, toggle_status, toggle_status_notification_category,
    toggle_status_notification_flag, toggle_status_notification_request_type, update_status,
};
use pushkind_facilities::services::statuses::ensure_reserved_status;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        io::Error::other(e)
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to establish database connection: {e}");
        io::Error::other(e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to migrate database: {e}");
        io::Error::other(e)
    })?;

    let repo = DieselRepository::new(pool);
    ensure_reserved_status(&repo).map_err(|e| {
        log::error!("Failed to seed the reserved status: {e}");
        io::Error::other(e)
    })?;

    let secret_key = if server_config.secret_key.len() >= 64 {
        Key::from(server_config.secret_key.as_bytes())
    } else {
        log::warn!("secret_key shorter than 64 bytes; generating a random key");
        Key::generate()
    };
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&format!("{}/**/*", server_config.templates_dir)).map_err(|e| {
        log::error!("Failed to parse templates: {e}");
        io::Error::other(e)
    })?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Starting server at http://{}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", &server_config.static_dir))
            .service(index)
            .service(web::scope("/api").service(api_v1_effective_values))
            .service(show_categories)
            .service(add_category)
            .service(update_category)
            .service(delete_category)
            .service(toggle_category)
            .service(show_service_types)
            .service(download_service_types)
            .service(add_service_type)
            .service(update_service_type)
            .service(delete_service_type)
            .service(toggle_service_type)
            .service(toggle_service_type_status)
            .service(toggle_service_type_notification)
            .service(show_statuses)
            .service(export_status_collection)
            .service(import_status_collection)
            .service(add_status)
            .service(update_status)
            .service(delete_status)
            .service(toggle_status)
            .service(show_status_notifications)
            .service(toggle_status_notification_category)
            .service(toggle_status_notification_request_type)
            .service(toggle_status_notification_flag)
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
