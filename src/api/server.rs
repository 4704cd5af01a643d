use crate::api::routes;
use crate::config::SharedConfig;
use crate::service::RecordService;
use axum::Router;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub records: RecordService,
}

/// The API's routes, ready to be served by any [`axum::Server`].
pub fn router(config: SharedConfig, records: RecordService) -> Router {
    routes::new(AppState { config, records })
}

pub fn new(
    config: SharedConfig,
    records: RecordService,
) -> impl Future<Output = hyper::Result<()>> {
    let addr = config.api_bind_addr;
    axum::Server::bind(&addr).serve(router(config, records).into_make_service())
}
