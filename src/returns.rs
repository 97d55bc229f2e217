// src/returns.rs
//
// Returns-eligibility rules: the 30-day admission window and the review
// state machine. Pure functions; the handlers in api/devoluciones.rs and
// api/admin/devoluciones.rs consult these before every write.

use chrono::{DateTime, Duration, Utc};

use crate::error::Error;
use crate::models::{EstadoDevolucion, LineaPedido};

pub const RETURN_WINDOW_DAYS: i64 = 30;

/// Display deadline stored on the return row at creation time.
pub fn fecha_limite(creado_at: DateTime<Utc>) -> DateTime<Utc> {
    creado_at + Duration::days(RETURN_WINDOW_DAYS)
}

/// Admission check, inclusive bound: a request at exactly creation + 30
/// days still succeeds, one second later it does not. Compared as an exact
/// duration rather than floored whole days so the boundary is precise.
pub fn within_return_window(creado_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - creado_at <= Duration::days(RETURN_WINDOW_DAYS)
}

/// Legal review transitions:
///
/// ```text
/// Pendiente --approve--> Aprobada --complete--> Completada
/// Pendiente --reject---> Rechazada
/// ```
///
/// `Rechazada` and `Completada` are terminal; `Pendiente -> Completada`
/// is not a shortcut.
pub fn transition_allowed(from: EstadoDevolucion, to: EstadoDevolucion) -> bool {
    use EstadoDevolucion::*;
    matches!(
        (from, to),
        (Pendiente, Aprobada) | (Pendiente, Rechazada) | (Aprobada, Completada)
    )
}

/// Server-side quantity check against the order's snapshotted line item.
/// The client form caps the input too, but that is not a trust boundary.
pub fn validate_cantidad(articulos: &[LineaPedido], producto_id: i64, cantidad: u32) -> Result<(), Error> {
    let Some(linea) = articulos.iter().find(|l| l.producto_id == producto_id) else {
        return Err(Error::validation(
            "the product is not part of this order",
        ));
    };
    if cantidad == 0 || cantidad > linea.cantidad {
        return Err(Error::validation(format!(
            "cantidad must be between 1 and {}",
            linea.cantidad
        )));
    }
    Ok(())
}
