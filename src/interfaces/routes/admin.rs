use actix_web::web;

use crate::handlers::{admin::admin_dashboard, posts, projects, system::admin_health_check};
use crate::middlewares::session::SessionMiddleware;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(SessionMiddleware)
            .service(admin_dashboard)
            .service(admin_health_check)
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::admin_list_posts))
                    .route(web::post().to(posts::create_post))
            )
            .service(
                web::resource("/posts/{post_id}")
                    .route(web::patch().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post))
            )
            .service(
                web::resource("/projects")
                    .route(web::get().to(projects::admin_list_projects))
                    .route(web::post().to(projects::create_project))
            )
            .service(
                web::resource("/projects/{project_id}")
                    .route(web::patch().to(projects::update_project))
                    .route(web::delete().to(projects::delete_project))
            )
    );
}
