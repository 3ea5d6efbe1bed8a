use crate::{
    api::{attendance, employee},
    auth::{handlers, middleware::admin_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / burst as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let clock_in_limiter = Arc::new(build_limiter(config.rate_clock_in_per_min));
    let admin_limiter = Arc::new(build_limiter(config.rate_admin_per_min));

    // Admin session
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(from_fn(admin_middleware))
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            // Employee-facing clock-in screen
            .service(
                web::resource("/employees").route(web::get().to(employee::list_public_employees)),
            )
            .service(
                web::resource("/clock-in")
                    .wrap(clock_in_limiter)
                    .route(web::post().to(attendance::clock_in)),
            )
            // Admin back office
            .service(
                web::scope("/admin")
                    .wrap(from_fn(admin_middleware))
                    .wrap(admin_limiter)
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/attendance").route(web::get().to(attendance::dashboard)),
                    )
                    .service(
                        web::resource("/attendance/export")
                            .route(web::get().to(attendance::export_csv)),
                    ),
            ),
    );
}

// CLOCK-IN
//  └─ GET /api/employees → POST /api/clock-in {employee_id, password}

// ADMIN
//  ├─ POST /auth/login → access_token
//  ├─ POST /auth/logout  with  Authorization: Bearer access_token
//  └─ /api/admin/*  with  Authorization: Bearer access_token
