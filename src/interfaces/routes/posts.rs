use actix_web::web;

use crate::handlers::posts;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .service(
                web::resource("")
                    .route(web::get().to(posts::list_posts))
            )
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(posts::get_post))
            )
            .service(
                web::resource("/{post_id}/related")
                    .route(web::get().to(posts::related_posts))
            )
    );
}
