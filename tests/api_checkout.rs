mod support;

use actix_web::{test, web, App};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tienda_api::api::auth::SessionMiddleware;
use tienda_api::api::checkout::checkout;

#[actix_web::test]
async fn checkout_skips_the_email_column_for_tokens_without_one() {
    let server = MockServer::start().await;
    let cliente = Uuid::new_v4();

    // Session whose token carries no email claim.
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer cliente-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": cliente })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/perfiles"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    // The address already exists, so no direcciones insert happens.
    Mock::given(method("GET"))
        .and(path("/rest/v1/direcciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/pedidos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "cliente_id": cliente,
            "total": 10.0,
            "articulos": [
                {"producto_id": 1, "nombre": "Lampara", "precio": 10.0, "cantidad": 1}
            ],
            "direccion_entrega": "Calle Mayor 1",
            "estado": "Pendiente",
            "creado_at": Utc::now().to_rfc3339(),
        }])))
        .mount(&server)
        .await;

    let state = support::build_state(&server.uri());
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .service(web::scope("/api").wrap(SessionMiddleware).service(checkout)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/checkout")
        .insert_header(("Authorization", "Bearer cliente-token"))
        .set_json(json!({
            "articulos": [
                {"producto_id": 1, "nombre": "Lampara", "precio": 10.0, "cantidad": 1}
            ],
            "nombre": "Ana Garcia",
            "telefono": "600111222",
            "direccion": "Calle Mayor 1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let upsert = server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/rest/v1/perfiles")
        .expect("profile upsert was issued");
    let body: serde_json::Value = serde_json::from_slice(&upsert.body).unwrap();
    assert!(body.get("email").is_none());
    assert_eq!(body["nombre"], "Ana Garcia");
    assert_eq!(body["telefono"], "600111222");
}
