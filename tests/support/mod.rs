use actix::Actor;
use actix_web::web;

use tienda_api::config::Config;
use tienda_api::ws::EventHub;
use tienda_api::AppState;

/// Application state pointed at a mocked backend (wiremock server URL).
pub fn build_state(backend_url: &str) -> web::Data<AppState> {
    let config = Config {
        backend_url: Some(backend_url.trim_end_matches('/').to_string()),
        anon_key: Some("test-anon-key".to_string()),
        service_key: Some("test-service-key".to_string()),
        bind_addr: "127.0.0.1:0".to_string(),
    };
    let hub = EventHub::new().start();
    web::Data::new(AppState::from_config(config, hub))
}
