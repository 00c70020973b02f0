use crate::{api::attendance, auth::middleware::auth_middleware, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = 60_000 / requests_per_min as u64;
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("limiter period and burst are non-zero");
        Governor::new(&cfg)
    }

    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_all))
                            .route(web::post().to(attendance::record_event)),
                    )
                    // /attendance/recent?limit=
                    .service(web::resource("/recent").route(web::get().to(attendance::recent)))
                    // /attendance/next?employee_id=&branch=
                    .service(web::resource("/next").route(web::get().to(attendance::next_event)))
                    // /attendance/{employee_id}/latest
                    .service(
                        web::resource("/{employee_id}/latest")
                            .route(web::get().to(attendance::latest)),
                    )
                    // /attendance/{employee_id}/history?limit=
                    .service(
                        web::resource("/{employee_id}/history")
                            .route(web::get().to(attendance::history)),
                    ),
            ),
    );
}
