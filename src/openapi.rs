use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relief Resource Fulfillment API",
        version = "0.1.0",
        description = r#"
Coordinates disaster-relief supply and demand: published resource requests,
claims against them, and warehouse stock movements (lend, return, donate).

All quantity-moving operations are atomic; bulk claim submission is the one
path with per-item failure isolation — always inspect the `errors` array of
its response, a 201 only means the batch was processed.
"#,
        contact(name = "Relief API Team")
    ),
    paths(
        crate::handlers::accepts::create_accept,
        crate::handlers::accepts::bulk_accept,
        crate::handlers::lends::create_lend,
        crate::handlers::lends::return_lend,
        crate::handlers::provides::create_provide,
        crate::handlers::requests::create_request,
        crate::handlers::inventory::list_warehouse_items,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::accepts::CreateAcceptInput,
        crate::services::accepts::BulkAcceptItem,
        crate::services::accepts::BulkAcceptError,
        crate::services::accepts::BulkAcceptOutcome,
        crate::services::lends::CreateLendInput,
        crate::services::provides::CreateProvideInput,
        crate::services::inventory::WarehouseStockRow,
        crate::handlers::accepts::BulkAcceptRequest,
        crate::handlers::inventory::RestockRequest,
    )),
    tags(
        (name = "accepts", description = "Claims against published requests"),
        (name = "lends", description = "Temporary stock transfers"),
        (name = "provides", description = "Donations into warehouses"),
        (name = "requests", description = "Published resource requests"),
        (name = "inventories", description = "Warehouse stock"),
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
