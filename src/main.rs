use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use tempo_be::database::{
    init_database,
    repositories::{
        ComplianceRepository, ModificationRepository, OrganizationRepository, ProjectRepository,
        TeamRepository, TimeEntryRepository, TimesheetRepository, UserRepository,
    },
};
use tempo_be::handlers::{
    auth, compliance, modifications, organizations, projects, teams, time_entries, timesheets,
    users,
};
use tempo_be::jobs::{JobContext, spawn_background_jobs};
use tempo_be::middleware::RequestId;
use tempo_be::{AppState, AuthService, Config, TimeClockService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Tempo API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories and services
    let organization_repository = OrganizationRepository::new(pool.clone());
    let user_repository = UserRepository::new(pool.clone());
    let team_repository = TeamRepository::new(pool.clone());
    let project_repository = ProjectRepository::new(pool.clone());
    let time_entry_repository = TimeEntryRepository::new(pool.clone());
    let modification_repository = ModificationRepository::new(pool.clone());
    let compliance_repository = ComplianceRepository::new(pool.clone());
    let timesheet_repository = TimesheetRepository::new(pool.clone());

    let auth_service = AuthService::new(
        config.clone(),
        user_repository.clone(),
        organization_repository.clone(),
    );
    let timeclock_service = TimeClockService::new(
        pool.clone(),
        time_entry_repository.clone(),
        user_repository.clone(),
        organization_repository.clone(),
        project_repository.clone(),
        modification_repository.clone(),
    );

    // Periodic sweeps (overtime check, auto-stop, timesheet closing,
    // daily summaries)
    if config.jobs_enabled {
        spawn_background_jobs(&config, JobContext::new(pool.clone()));
        log::info!("Background jobs scheduled");
    }

    let app_state = web::Data::new(AppState { auth_service });
    let organization_repo_data = web::Data::new(organization_repository);
    let user_repo_data = web::Data::new(user_repository);
    let team_repo_data = web::Data::new(team_repository);
    let project_repo_data = web::Data::new(project_repository);
    let time_entry_repo_data = web::Data::new(time_entry_repository);
    let modification_repo_data = web::Data::new(modification_repository);
    let compliance_repo_data = web::Data::new(compliance_repository);
    let timesheet_repo_data = web::Data::new(timesheet_repository);
    let timeclock_data = web::Data::new(timeclock_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(organization_repo_data.clone())
            .app_data(user_repo_data.clone())
            .app_data(team_repo_data.clone())
            .app_data(project_repo_data.clone())
            .app_data(time_entry_repo_data.clone())
            .app_data(modification_repo_data.clone())
            .app_data(compliance_repo_data.clone())
            .app_data(timesheet_repo_data.clone())
            .app_data(timeclock_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/organization")
                            .route("", web::get().to(organizations::get_organization))
                            .route("", web::put().to(organizations::update_organization))
                            .route("", web::delete().to(organizations::delete_organization))
                            .route(
                                "/settings",
                                web::get().to(organizations::get_organization_settings),
                            )
                            .route(
                                "/settings",
                                web::put().to(organizations::update_organization_settings),
                            ),
                    )
                    .service(
                        web::scope("/departments")
                            .route("", web::post().to(organizations::create_department))
                            .route("", web::get().to(organizations::get_departments))
                            .route("/{id}", web::get().to(organizations::get_department))
                            .route("/{id}", web::put().to(organizations::update_department))
                            .route("/{id}", web::delete().to(organizations::delete_department)),
                    )
                    .service(
                        web::scope("/teams")
                            .route("", web::post().to(teams::create_team))
                            .route("", web::get().to(teams::get_teams))
                            .route("/{id}", web::get().to(teams::get_team))
                            .route("/{id}", web::put().to(teams::update_team))
                            .route("/{id}", web::delete().to(teams::delete_team))
                            .route("/{id}/members", web::get().to(teams::get_team_members))
                            .route(
                                "/{team_id}/members/{user_id}",
                                web::post().to(teams::add_team_member),
                            )
                            .route(
                                "/{team_id}/members/{user_id}",
                                web::delete().to(teams::remove_team_member),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            .route("", web::post().to(users::create_user))
                            .route("", web::get().to(users::get_users))
                            .route("/{id}", web::get().to(users::get_user))
                            .route("/{id}", web::put().to(users::update_user))
                            .route("/{id}", web::delete().to(users::delete_user))
                            .route(
                                "/{id}/compliance-settings",
                                web::get().to(users::get_compliance_settings),
                            )
                            .route(
                                "/{id}/compliance-settings",
                                web::put().to(users::update_compliance_settings),
                            ),
                    )
                    .service(
                        web::scope("/projects")
                            .route("", web::post().to(projects::create_project))
                            .route("", web::get().to(projects::get_projects))
                            .route("/{id}", web::get().to(projects::get_project))
                            .route("/{id}", web::put().to(projects::update_project))
                            .route("/{id}", web::delete().to(projects::delete_project))
                            .route("/{id}/tasks", web::post().to(projects::create_task))
                            .route("/{id}/tasks", web::get().to(projects::get_tasks)),
                    )
                    .service(
                        web::scope("/tasks")
                            .route("/{id}", web::get().to(projects::get_task))
                            .route("/{id}", web::put().to(projects::update_task))
                            .route("/{id}", web::delete().to(projects::delete_task)),
                    )
                    .service(
                        web::scope("/time-entries")
                            .route("", web::get().to(time_entries::list_time_entries))
                            .route("/clock-in", web::post().to(time_entries::clock_in))
                            .route("/clock-out", web::post().to(time_entries::clock_out))
                            .route(
                                "/current",
                                web::get().to(time_entries::current_time_entry),
                            )
                            .route("/summary", web::get().to(time_entries::time_summary))
                            .route("/{id}", web::get().to(time_entries::get_time_entry))
                            .route("/{id}", web::put().to(time_entries::update_time_entry))
                            .route("/{id}", web::delete().to(time_entries::delete_time_entry))
                            .route(
                                "/{id}/breaks/start",
                                web::post().to(time_entries::start_break),
                            )
                            .route(
                                "/{id}/breaks/end",
                                web::post().to(time_entries::end_break),
                            )
                            .route(
                                "/{id}/submit",
                                web::post().to(time_entries::submit_time_entry),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(time_entries::approve_time_entry),
                            )
                            .route(
                                "/{id}/reject",
                                web::post().to(time_entries::reject_time_entry),
                            )
                            .route(
                                "/{id}/reset",
                                web::post().to(time_entries::reset_time_entry),
                            )
                            .route(
                                "/{id}/modifications",
                                web::post().to(modifications::create_modification_request),
                            ),
                    )
                    .service(
                        web::scope("/modification-requests")
                            .route("", web::get().to(modifications::list_modification_requests))
                            .route(
                                "/{id}",
                                web::get().to(modifications::get_modification_request),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(modifications::approve_modification_request),
                            )
                            .route(
                                "/{id}/reject",
                                web::post().to(modifications::reject_modification_request),
                            ),
                    )
                    .service(
                        web::scope("/compliance-alerts")
                            .route("", web::get().to(compliance::get_alerts))
                            .route("/{id}", web::get().to(compliance::get_alert))
                            .route(
                                "/{id}/acknowledge",
                                web::post().to(compliance::acknowledge_alert),
                            )
                            .route("/{id}/resolve", web::post().to(compliance::resolve_alert)),
                    )
                    .service(
                        web::scope("/timesheet-periods")
                            .route("", web::post().to(timesheets::create_period))
                            .route("", web::get().to(timesheets::get_periods))
                            .route("/{id}", web::get().to(timesheets::get_period))
                            .route("/{id}/close", web::post().to(timesheets::close_period))
                            .route("/{id}/lock", web::post().to(timesheets::lock_period)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
