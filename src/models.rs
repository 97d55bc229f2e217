// src/models.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog item. `categoria` is a legacy free-text label kept as a cache of
/// the family name; only the admin product write path updates it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Producto {
    pub id: i64,
    pub nombre: String,
    pub precio: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
    #[serde(default)]
    pub familia_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Embedded family row when the query selects `familias(nombre)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub familias: Option<FamiliaRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamiliaRef {
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Familia {
    pub id: i64,
    pub nombre: String,
}

/// Customer profile, keyed by the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Perfil {
    pub id: Uuid,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    /// Legacy single-address field, kept for backward compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default = "default_rol")]
    pub rol: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direcciones: Vec<Direccion>,
}

fn default_rol() -> String {
    "cliente".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Direccion {
    pub id: i64,
    pub cliente_id: Uuid,
    pub calle: String,
    #[serde(default)]
    pub es_principal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_postal: Option<String>,
}

/// One line of an order's `articulos` snapshot. Captured at checkout;
/// later catalog edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineaPedido {
    pub producto_id: i64,
    pub nombre: String,
    pub precio: Decimal,
    pub cantidad: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EstadoPedido {
    Pendiente,
    Enviado,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pedido {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub total: Decimal,
    pub articulos: Vec<LineaPedido>,
    pub direccion_entrega: String,
    pub estado: EstadoPedido,
    pub creado_at: DateTime<Utc>,
    /// Embedded profile row on admin listings (`perfiles(nombre, telefono)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfiles: Option<PerfilRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerfilRef {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EstadoDevolucion {
    Pendiente,
    Aprobada,
    Rechazada,
    Completada,
}

impl EstadoDevolucion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoDevolucion::Pendiente => "Pendiente",
            EstadoDevolucion::Aprobada => "Aprobada",
            EstadoDevolucion::Rechazada => "Rechazada",
            EstadoDevolucion::Completada => "Completada",
        }
    }
}

impl fmt::Display for EstadoDevolucion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Devolucion {
    pub id: Uuid,
    pub pedido_id: Uuid,
    pub producto_id: i64,
    pub cantidad: u32,
    pub motivo: String,
    pub estado: EstadoDevolucion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones_admin: Option<String>,
    pub fecha_solicitud: DateTime<Utc>,
    pub fecha_limite: DateTime<Utc>,
}
