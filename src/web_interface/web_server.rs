use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::Filter;

use super::routes::{api_routes, handle_rejection};
use crate::controller::Controller;
use crate::error_handling::types::WebError;

/// JSON HTTP API over the confession and habit stores
pub struct WebServer {
    controller: Arc<Controller>,
}

impl WebServer {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }

    /// Serve until the process is stopped.
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        if addr.port() == 0 {
            return Err(WebError::StartFailed(String::from("port 0 is not allowed")));
        }
        let routes = api_routes(self.controller.clone()).recover(handle_rejection);
        info!("Web API listening on http://{}", addr);
        warp::serve(routes).run(addr).await;
        Ok(())
    }
}
