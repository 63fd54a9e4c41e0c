//! Pages for looking inside a running server. They exist only when the
//! `debug` setting is on, and read as unknown routes otherwise.

use crate::route_not_found;
use actix_web::{web, HttpRequest, HttpResponse};
use playreviews_settings::Settings;

/// Mount the pages under the current scope.
pub fn configure(config: &mut web::ServiceConfig) {
    config.route("/settings", web::get().to(show_settings));
}

/// The settings the server was started with.
async fn show_settings(request: HttpRequest, settings: web::Data<Settings>) -> HttpResponse {
    if !settings.debug {
        return route_not_found(request).await;
    }
    HttpResponse::Ok().json(settings.get_ref())
}
