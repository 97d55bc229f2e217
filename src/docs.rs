use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::search::search,
        crate::api::ping::ping,
        crate::api::checkout::checkout,
        crate::api::pedidos::list_pedidos,
        crate::api::devoluciones::list_devoluciones,
        crate::api::devoluciones::create_devolucion,
        crate::api::admin::pedidos::list_pedidos,
        crate::api::admin::devoluciones::list_devoluciones,
        crate::api::admin::devoluciones::review_devolucion,
        crate::api::admin::clientes::list_clientes,
        crate::api::admin::clientes::update_cliente,
        crate::api::admin::clientes::delete_cliente,
        crate::api::admin::clientes::create_user,
        crate::api::admin::productos::list_productos,
        crate::api::admin::productos::create_producto,
        crate::api::admin::productos::update_producto,
        crate::api::admin::productos::delete_producto,
        crate::api::admin::productos::list_familias,
        crate::api::admin::productos::create_familia,
        crate::api::admin::productos::delete_familia
    ),
    components(
        schemas(
            crate::models::Producto,
            crate::models::FamiliaRef,
            crate::models::Familia,
            crate::models::Perfil,
            crate::models::Direccion,
            crate::models::LineaPedido,
            crate::models::EstadoPedido,
            crate::models::Pedido,
            crate::models::PerfilRef,
            crate::models::EstadoDevolucion,
            crate::models::Devolucion,
            crate::search::SearchResponse,
            crate::cart::Cart,
            crate::api::checkout::CheckoutRequest,
            crate::api::devoluciones::CrearDevolucionRequest,
            crate::api::admin::devoluciones::RevisarDevolucionRequest,
            crate::api::admin::clientes::ActualizarClienteRequest,
            crate::api::admin::clientes::CrearClienteRequest,
            crate::api::admin::productos::NuevoProductoRequest,
            crate::api::admin::productos::ActualizarProductoRequest,
            crate::api::admin::productos::NuevaFamiliaRequest
        )
    ),
    tags(
        (name = "catalog", description = "Catalog search"),
        (name = "storefront", description = "Cart checkout and own orders"),
        (name = "returns", description = "Return requests and 30-day window"),
        (name = "admin", description = "Back-office inventory, customers, orders, returns"),
        (name = "ops", description = "Operational probes")
    )
)]
pub struct ApiDoc;
