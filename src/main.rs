mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{guard, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{AuthMiddleware, RequireRole};
use crate::utils::error::AppError;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Missing required configuration is fatal at startup
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Field Force Service...");
    log::info!("📊 Database: {}", config.database_url);

    // Initialize MongoDB connection; a failure here is fatal, never retried
    let db = match database::MongoDB::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("✅ MongoDB connected successfully");

    let db_data = web::Data::new(db.clone());
    let config_data = web::Data::new(config.clone());
    let bind_addr = format!("{}:{}", config.host, config.port);

    log::info!("🌐 Server starting on {}", bind_addr);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_addr);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            // Malformed JSON bodies surface as our standard 400 shape
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::Validation(err.to_string()).into()
            }))
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints (register/login public, logout authenticated)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .service(
                        web::resource("/logout")
                            .wrap(AuthMiddleware)
                            .route(web::post().to(api::auth::logout)),
                    ),
            )
            // Profile: any authenticated caller
            .service(
                web::resource("/profile")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(api::profile::get_profile)),
            )
            // Clients: manager/admin, delete admin-only
            .service(
                web::scope("/clients")
                    .wrap(RequireRole::manager_or_admin())
                    .wrap(AuthMiddleware)
                    .route("", web::post().to(api::clients::create_client))
                    .route("", web::get().to(api::clients::get_clients))
                    .route(
                        "/{id}/meetings",
                        web::get().to(api::clients::get_client_meetings),
                    )
                    // DELETE peels off into its own guarded resource so the
                    // admin gate applies to it alone
                    .service(
                        web::resource("/{id}")
                            .guard(guard::Delete())
                            .wrap(RequireRole::admin())
                            .route(web::delete().to(api::clients::delete_client)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(api::clients::get_client))
                            .route(web::put().to(api::clients::update_client)),
                    ),
            )
            // Meetings: manager/admin, delete admin-only
            .service(
                web::scope("/meetings")
                    .wrap(RequireRole::manager_or_admin())
                    .wrap(AuthMiddleware)
                    .route("", web::post().to(api::meetings::create_meeting))
                    .route("", web::get().to(api::meetings::get_meetings))
                    .service(
                        web::resource("/{id}")
                            .guard(guard::Delete())
                            .wrap(RequireRole::admin())
                            .route(web::delete().to(api::meetings::delete_meeting)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(api::meetings::get_meeting))
                            .route(web::put().to(api::meetings::update_meeting)),
                    ),
            )
            // Attendance: any authenticated caller
            .service(
                web::scope("/attendance")
                    .wrap(AuthMiddleware)
                    .route("/checkin", web::post().to(api::attendance::check_in))
                    .route("/checkout", web::post().to(api::attendance::check_out)),
            )
            // Reimbursement: claims for everyone, decisions for admins
            .service(
                web::scope("/reimbursement")
                    .wrap(AuthMiddleware)
                    .route("/create", web::post().to(api::reimbursement::create_claim))
                    .route("/my-claims", web::get().to(api::reimbursement::my_claims))
                    .service(
                        web::resource("/all")
                            .wrap(RequireRole::admin())
                            .route(web::get().to(api::reimbursement::all_claims)),
                    )
                    .service(
                        web::resource("/update/{id}")
                            .wrap(RequireRole::admin())
                            .route(web::put().to(api::reimbursement::update_claim_status)),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
