use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use tienda_api::models::{EstadoDevolucion, LineaPedido};
use tienda_api::returns::{
    fecha_limite, transition_allowed, validate_cantidad, within_return_window,
};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap()
}

#[test]
fn fecha_limite_is_creation_plus_thirty_days() {
    assert_eq!(fecha_limite(t0()), t0() + Duration::days(30));
}

#[test]
fn window_is_open_within_thirty_days() {
    assert!(within_return_window(t0(), t0()));
    assert!(within_return_window(t0(), t0() + Duration::days(29)));
}

#[test]
fn window_boundary_is_inclusive() {
    // Exactly 30 days, 0 seconds still succeeds.
    assert!(within_return_window(t0(), t0() + Duration::days(30)));
    // One second past the bound does not.
    assert!(!within_return_window(
        t0(),
        t0() + Duration::days(30) + Duration::seconds(1)
    ));
    assert!(!within_return_window(t0(), t0() + Duration::days(31)));
}

#[test]
fn legal_transitions() {
    use EstadoDevolucion::*;
    assert!(transition_allowed(Pendiente, Aprobada));
    assert!(transition_allowed(Pendiente, Rechazada));
    assert!(transition_allowed(Aprobada, Completada));
}

#[test]
fn no_shortcut_from_pendiente_to_completada() {
    use EstadoDevolucion::*;
    assert!(!transition_allowed(Pendiente, Completada));
}

#[test]
fn terminal_states_have_no_exits() {
    use EstadoDevolucion::*;
    for to in [Pendiente, Aprobada, Rechazada, Completada] {
        assert!(!transition_allowed(Rechazada, to), "Rechazada -> {to}");
        assert!(!transition_allowed(Completada, to), "Completada -> {to}");
    }
}

#[test]
fn self_transitions_are_rejected() {
    use EstadoDevolucion::*;
    for estado in [Pendiente, Aprobada, Rechazada, Completada] {
        assert!(!transition_allowed(estado, estado), "{estado} -> {estado}");
    }
}

fn articulos() -> Vec<LineaPedido> {
    vec![LineaPedido {
        producto_id: 1,
        nombre: "Lampara".to_string(),
        precio: Decimal::new(1000, 2),
        cantidad: 3,
    }]
}

#[test]
fn cantidad_within_purchase_is_accepted() {
    assert!(validate_cantidad(&articulos(), 1, 1).is_ok());
    assert!(validate_cantidad(&articulos(), 1, 3).is_ok());
}

#[test]
fn cantidad_above_purchase_is_rejected() {
    assert!(validate_cantidad(&articulos(), 1, 4).is_err());
}

#[test]
fn cantidad_zero_is_rejected() {
    assert!(validate_cantidad(&articulos(), 1, 0).is_err());
}

#[test]
fn product_outside_the_order_is_rejected() {
    assert!(validate_cantidad(&articulos(), 99, 1).is_err());
}
