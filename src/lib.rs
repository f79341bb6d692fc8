mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, session, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{auth, db, limiter, relay, utils};

use auth::jwt::JwtService;
use entities::contact::RelayCredentials;
use repositories::{document_store::SharedStore, identity::SharedProfileProvider, relay::SharedRelay};
use use_cases::{
    auth::AuthHandler, contact::ContactHandler, guestbook::GuestbookHandler, posts::PostHandler,
    projects::ProjectHandler,
};

pub type AppAuthHandler = AuthHandler<JwtService, SharedProfileProvider>;
pub type AppPostHandler = PostHandler<SharedStore>;
pub type AppProjectHandler = ProjectHandler<SharedStore>;
pub type AppGuestbookHandler = GuestbookHandler<SharedStore>;
pub type AppContactHandler = ContactHandler<SharedRelay>;

pub struct AppState {
    pub store: SharedStore,
    pub post_handler: AppPostHandler,
    pub project_handler: AppProjectHandler,
    pub guestbook_handler: AppGuestbookHandler,
    pub contact_handler: AppContactHandler,
    pub auth_handler: AppAuthHandler,
    pub login_path: String,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        store: SharedStore,
        relay: SharedRelay,
        oauth: SharedProfileProvider,
    ) -> Self {
        let jwt_service = JwtService::new(config);

        AppState {
            post_handler: PostHandler::new(store.clone()),
            project_handler: ProjectHandler::new(store.clone()),
            guestbook_handler: GuestbookHandler::new(store.clone(), config.guestbook_page_size),
            contact_handler: ContactHandler::new(relay, RelayCredentials::from_config(config)),
            auth_handler: AuthHandler::new(config, jwt_service, oauth),
            login_path: config.login_path.clone(),
            trust_forwarded_for: config.trust_forwarded_for,
            store,
        }
    }
}
