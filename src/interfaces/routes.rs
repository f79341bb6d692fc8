use actix_web::web;

use crate::handlers::{home::home, system::liveness};

mod admin;
mod auth;
mod contact;
mod guestbook;
mod json_error;
mod posts;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(liveness);

    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(admin::config_routes)
            .configure(posts::config_routes)
            .configure(projects::config_routes)
            .configure(guestbook::config_routes)
            .configure(contact::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
