use actix_web::web;

use crate::handlers::guestbook;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/guestbook")
            .route(web::get().to(guestbook::list_entries))
            .route(web::post().to(guestbook::sign_guestbook))
    );
}
