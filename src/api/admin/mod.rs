pub mod clientes;
pub mod devoluciones;
pub mod pedidos;
pub mod productos;
