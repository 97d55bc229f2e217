pub mod admin;
pub mod auth;
pub mod checkout;
pub mod devoluciones;
pub mod pedidos;
pub mod ping;
pub mod search;
