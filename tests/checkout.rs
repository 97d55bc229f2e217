use rust_decimal::Decimal;
use uuid::Uuid;

use tienda_api::cart::{build_order, total, Cart, DatosEnvio};
use tienda_api::models::LineaPedido;

fn linea(producto_id: i64, precio: Decimal, cantidad: u32) -> LineaPedido {
    LineaPedido {
        producto_id,
        nombre: format!("producto-{producto_id}"),
        precio,
        cantidad,
    }
}

fn envio() -> DatosEnvio {
    DatosEnvio {
        nombre: "Ana Garcia".to_string(),
        telefono: "600111222".to_string(),
        direccion: "Calle Mayor 1".to_string(),
    }
}

#[test]
fn total_is_sum_of_price_times_quantity() {
    // 10.00 x 3 -> 30.00
    let items = vec![linea(1, Decimal::new(1000, 2), 3)];
    assert_eq!(total(&items), Decimal::new(3000, 2));
}

#[test]
fn total_over_multiple_lines() {
    let items = vec![
        linea(1, Decimal::new(1000, 2), 3),
        linea(2, Decimal::new(550, 2), 2),
    ];
    assert_eq!(total(&items), Decimal::new(4100, 2));
}

#[test]
fn cart_add_bumps_quantity_for_existing_product() {
    let mut cart = Cart::new();
    cart.add(1, "Lampara", Decimal::new(1000, 2));
    cart.add(1, "Lampara", Decimal::new(1000, 2));
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].cantidad, 2);
    assert_eq!(cart.total(), Decimal::new(2000, 2));
}

#[test]
fn cart_remove_decrements_then_drops_the_line() {
    let mut cart = Cart::new();
    cart.add(1, "Lampara", Decimal::new(1000, 2));
    cart.add(1, "Lampara", Decimal::new(1000, 2));
    cart.remove(1);
    assert_eq!(cart.items[0].cantidad, 1);
    cart.remove(1);
    assert!(cart.is_empty());
}

#[test]
fn build_order_snapshots_items_and_recomputes_total() {
    let cliente = Uuid::new_v4();
    let items = vec![linea(1, Decimal::new(1000, 2), 3)];
    let pedido = build_order(cliente, items, &envio()).unwrap();

    assert_eq!(pedido.cliente_id, cliente);
    assert_eq!(pedido.total, Decimal::new(3000, 2));
    assert_eq!(pedido.estado, "Pendiente");
    assert_eq!(pedido.direccion_entrega, "Calle Mayor 1");
    assert_eq!(pedido.articulos.len(), 1);
}

#[test]
fn build_order_rejects_an_empty_cart() {
    assert!(build_order(Uuid::new_v4(), vec![], &envio()).is_err());
}

#[test]
fn build_order_rejects_blank_shipping_fields() {
    let items = vec![linea(1, Decimal::new(1000, 2), 1)];
    let incomplete = DatosEnvio {
        nombre: "Ana".to_string(),
        telefono: "  ".to_string(),
        direccion: "Calle Mayor 1".to_string(),
    };
    assert!(build_order(Uuid::new_v4(), items, &incomplete).is_err());
}

#[test]
fn build_order_rejects_zero_quantity_lines() {
    let items = vec![linea(1, Decimal::new(1000, 2), 0)];
    assert!(build_order(Uuid::new_v4(), items, &envio()).is_err());
}
