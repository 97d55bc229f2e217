// src/cart.rs
//
// Session-scoped shopping cart and order construction. The cart is an
// explicit value owned by the presentation layer (no process-wide
// singleton); checkout turns it into an immutable order snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Error;
use crate::models::LineaPedido;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub items: Vec<LineaPedido>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit of a product, bumping the quantity when the product
    /// is already in the cart.
    pub fn add(&mut self, producto_id: i64, nombre: &str, precio: Decimal) {
        if let Some(item) = self.items.iter_mut().find(|i| i.producto_id == producto_id) {
            item.cantidad += 1;
            return;
        }
        self.items.push(LineaPedido {
            producto_id,
            nombre: nombre.to_string(),
            precio,
            cantidad: 1,
        });
    }

    /// Removes one unit; the line disappears when its quantity reaches zero.
    pub fn remove(&mut self, producto_id: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.producto_id == producto_id) {
            if item.cantidad > 1 {
                item.cantidad -= 1;
                return;
            }
        }
        self.items.retain(|i| i.producto_id != producto_id);
    }

    pub fn total(&self) -> Decimal {
        total(&self.items)
    }
}

/// Sum of unit price times quantity over the snapshot. Prices come from
/// the cart state, not re-priced against the current catalog.
pub fn total(items: &[LineaPedido]) -> Decimal {
    items
        .iter()
        .map(|l| l.precio * Decimal::from(l.cantidad))
        .sum()
}

/// Shipping fields supplied at checkout.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DatosEnvio {
    pub nombre: String,
    pub telefono: String,
    pub direccion: String,
}

/// Insert payload for a new order row.
#[derive(Debug, Clone, Serialize)]
pub struct NuevoPedido {
    pub cliente_id: Uuid,
    pub total: Decimal,
    pub articulos: Vec<LineaPedido>,
    pub direccion_entrega: String,
    pub estado: &'static str,
}

/// Validates the cart and shipping fields and produces the order insert
/// payload. The total is recomputed here rather than trusted from the
/// client.
pub fn build_order(
    cliente_id: Uuid,
    items: Vec<LineaPedido>,
    envio: &DatosEnvio,
) -> Result<NuevoPedido, Error> {
    if items.is_empty() {
        return Err(Error::validation("the cart is empty"));
    }
    if envio.nombre.trim().is_empty()
        || envio.telefono.trim().is_empty()
        || envio.direccion.trim().is_empty()
    {
        return Err(Error::validation(
            "nombre, telefono and direccion are required",
        ));
    }
    if items.iter().any(|l| l.cantidad == 0) {
        return Err(Error::validation("line quantities must be at least 1"));
    }

    Ok(NuevoPedido {
        cliente_id,
        total: total(&items),
        articulos: items,
        direccion_entrega: envio.direccion.trim().to_string(),
        estado: "Pendiente",
    })
}
