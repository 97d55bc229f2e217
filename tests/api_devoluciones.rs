mod support;

use actix_web::{test, web, App, ResponseError};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tienda_api::api::admin::devoluciones::review_devolucion;
use tienda_api::api::auth::SessionMiddleware;
use tienda_api::api::devoluciones::create_devolucion;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state.clone()).service(
                web::scope("/api")
                    .wrap(SessionMiddleware)
                    .service(create_devolucion)
                    .service(web::scope("/admin").service(review_devolucion)),
            ),
        )
        .await
    };
}

async fn mock_session(server: &MockServer, token: &str, user_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", format!("Bearer {token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "email": "cliente@example.com",
        })))
        .mount(server)
        .await;
}

async fn mock_pedido(server: &MockServer, pedido_id: Uuid, cliente_id: Uuid, creado_at: DateTime<Utc>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/pedidos"))
        .and(query_param("id", format!("eq.{pedido_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": pedido_id,
            "cliente_id": cliente_id,
            "total": 30.0,
            "articulos": [
                {"producto_id": 1, "nombre": "Lampara", "precio": 10.0, "cantidad": 3}
            ],
            "direccion_entrega": "Calle Mayor 1",
            "estado": "Pendiente",
            "creado_at": creado_at.to_rfc3339(),
        }])))
        .mount(server)
        .await;
}

async fn mock_no_pending(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/devoluciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn devolucion_row(pedido_id: Uuid, creado_at: DateTime<Utc>) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "pedido_id": pedido_id,
        "producto_id": 1,
        "cantidad": 2,
        "motivo": "Llego danado",
        "estado": "Pendiente",
        "fecha_solicitud": Utc::now().to_rfc3339(),
        "fecha_limite": (creado_at + Duration::days(30)).to_rfc3339(),
    })
}

fn create_request(pedido_id: Uuid, cantidad: u32) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/devoluciones")
        .insert_header(("Authorization", "Bearer cliente-token"))
        .set_json(json!({
            "pedido_id": pedido_id,
            "producto_id": 1,
            "cantidad": cantidad,
            "motivo": "Llego danado",
        }))
}

#[actix_web::test]
async fn create_return_within_window_succeeds() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    let pedido = Uuid::new_v4();
    let creado_at = Utc::now() - Duration::days(29);

    mock_session(&server, "cliente-token", cliente).await;
    mock_pedido(&server, pedido, cliente, creado_at).await;
    mock_no_pending(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/devoluciones"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([devolucion_row(pedido, creado_at)])),
        )
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, create_request(pedido, 2).to_request()).await;
    assert_eq!(resp.status(), 201);
}

#[actix_web::test]
async fn create_return_past_window_fails() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    let pedido = Uuid::new_v4();

    mock_session(&server, "cliente-token", cliente).await;
    mock_pedido(&server, pedido, cliente, Utc::now() - Duration::days(31)).await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, create_request(pedido, 1).to_request()).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[actix_web::test]
async fn create_return_with_pending_duplicate_fails() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    let pedido = Uuid::new_v4();

    mock_session(&server, "cliente-token", cliente).await;
    mock_pedido(&server, pedido, cliente, Utc::now() - Duration::days(5)).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/devoluciones"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])),
        )
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, create_request(pedido, 1).to_request()).await;
    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn create_return_for_foreign_order_is_forbidden() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    let pedido = Uuid::new_v4();

    mock_session(&server, "cliente-token", cliente).await;
    // The order exists but belongs to someone else.
    mock_pedido(&server, pedido, Uuid::new_v4(), Utc::now() - Duration::days(1)).await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, create_request(pedido, 1).to_request()).await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn create_return_for_missing_order_is_forbidden() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();

    mock_session(&server, "cliente-token", cliente).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/pedidos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, create_request(Uuid::new_v4(), 1).to_request()).await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn create_return_quantity_over_purchase_fails() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    let pedido = Uuid::new_v4();

    mock_session(&server, "cliente-token", cliente).await;
    mock_pedido(&server, pedido, cliente, Utc::now() - Duration::days(1)).await;
    mock_no_pending(&server).await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    // The snapshot holds 3 units; asking for 5 must fail server-side.
    let resp = test::call_service(&app, create_request(pedido, 5).to_request()).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn create_return_without_session_is_unauthorized() {
    let server = MockServer::start().await;
    let state = support::build_state(&server.uri());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/devoluciones")
        .set_json(json!({
            "pedido_id": Uuid::new_v4(),
            "producto_id": 1,
            "cantidad": 1,
        }))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("request without a token must be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}

async fn mock_admin(server: &MockServer, token: &str) -> Uuid {
    let admin = Uuid::new_v4();
    mock_session(server, token, admin).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/perfiles"))
        .and(query_param("id", format!("eq.{admin}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "rol": "admin" }])))
        .mount(server)
        .await;
    admin
}

async fn mock_current_estado(server: &MockServer, devolucion_id: Uuid, estado: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/devoluciones"))
        .and(query_param("id", format!("eq.{devolucion_id}")))
        .and(query_param("select", "estado"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "estado": estado }])))
        .mount(server)
        .await;
}

fn review_request(devolucion_id: Uuid, estado: &str) -> test::TestRequest {
    test::TestRequest::patch()
        .uri("/api/admin/devoluciones")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(json!({
            "id": devolucion_id,
            "estado": estado,
            "observaciones_admin": "Revisado",
        }))
}

#[actix_web::test]
async fn review_approves_a_pending_return() {
    let server = MockServer::start().await;
    mock_admin(&server, "admin-token").await;

    let devolucion = Uuid::new_v4();
    let pedido = Uuid::new_v4();
    mock_current_estado(&server, devolucion, "Pendiente").await;

    let mut updated = devolucion_row(pedido, Utc::now());
    updated["id"] = json!(devolucion);
    updated["estado"] = json!("Aprobada");
    updated["observaciones_admin"] = json!("Revisado");
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/devoluciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, review_request(devolucion, "Aprobada").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["estado"], "Aprobada");
}

#[actix_web::test]
async fn review_rejects_the_pendiente_to_completada_shortcut() {
    let server = MockServer::start().await;
    mock_admin(&server, "admin-token").await;

    let devolucion = Uuid::new_v4();
    mock_current_estado(&server, devolucion, "Pendiente").await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp =
        test::call_service(&app, review_request(devolucion, "Completada").to_request()).await;
    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn review_rejects_transitions_out_of_terminal_states() {
    let server = MockServer::start().await;
    mock_admin(&server, "admin-token").await;

    let devolucion = Uuid::new_v4();
    mock_current_estado(&server, devolucion, "Completada").await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let resp = test::call_service(&app, review_request(devolucion, "Aprobada").to_request()).await;
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid status transition"));
}

#[actix_web::test]
async fn review_requires_the_admin_role() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();
    mock_session(&server, "cliente-token", cliente).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/perfiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "rol": "cliente" }])))
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = app!(state);

    let req = test::TestRequest::patch()
        .uri("/api/admin/devoluciones")
        .insert_header(("Authorization", "Bearer cliente-token"))
        .set_json(json!({
            "id": Uuid::new_v4(),
            "estado": "Aprobada",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}
