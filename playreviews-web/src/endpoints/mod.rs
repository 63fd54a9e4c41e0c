//! Web handlers for the reviews API.

pub mod params;
mod reviews;
mod store;

use actix_web::web::ServiceConfig;

/// Configure the routes under `/app`.
pub fn configure(config: &mut ServiceConfig) {
    config
        .service(reviews::reviews)
        .service(store::app_info)
        .service(store::search)
        .service(store::suggestions);
}
