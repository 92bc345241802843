use actix_web::web;

mod admin;
mod parking;
mod reservations;
mod rides;
mod stations;
mod wallet;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(stations::init_routes)
            .configure(parking::init_routes)
            .configure(reservations::init_routes)
            .configure(rides::init_routes)
            .configure(wallet::init_routes)
            .configure(admin::init_routes),
    );
}
