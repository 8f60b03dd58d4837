//! Restaurant, combo and restaurant-side order endpoints

use serde_json::json;

use super::{estado_filter, failure, parse_body, path_id, success, HandlerResult};
use crate::http::Response;
use crate::routing::PathParams;
use crate::service::models::{NewCombo, NewRestaurant};
use crate::service::FoodService;

const INVALID_RESTAURANT_ID: &str = "ID de restaurante inválido";
const INVALID_ORDER_ID: &str = "ID de pedido inválido";
const INVALID_PARAMS: &str = "Parámetros inválidos";

/// State a restaurant moves its order to once it leaves the kitchen
pub const DISPATCHED_STATE: &str = "en_camino";

/// GET /api/restaurantes
pub async fn list(service: &dyn FoodService) -> HandlerResult {
    let restaurantes = service
        .list_restaurants()
        .await
        .map_err(|e| failure("obtener restaurantes", &e))?;
    Ok(success(json!({ "restaurantes": restaurantes })))
}

/// POST /api/restaurantes
pub async fn register(service: &dyn FoodService, body: &str) -> HandlerResult {
    let restaurant: NewRestaurant = parse_body(body, "registrar restaurante")?;
    let id_restaurante = service
        .register_restaurant(&restaurant)
        .await
        .map_err(|e| failure("registrar restaurante", &e))?;
    Ok(success(json!({ "id_restaurante": id_restaurante })))
}

/// GET /api/restaurantes/{id}/combos
pub async fn list_combos(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    let id_restaurante = path_id(params, "id", INVALID_RESTAURANT_ID)?;
    let combos = service
        .list_combos(id_restaurante)
        .await
        .map_err(|e| failure("obtener combos", &e))?;
    Ok(success(json!({ "combos": combos })))
}

/// POST /api/restaurantes/{id}/combos
///
/// The restaurant in the path wins over any `id_restaurante` in the body.
pub async fn register_combo(
    service: &dyn FoodService,
    params: &PathParams,
    body: &str,
) -> HandlerResult {
    let id_restaurante = path_id(params, "id", INVALID_RESTAURANT_ID)?;
    let mut combo: NewCombo = parse_body(body, "registrar combo")?;
    combo.id_restaurante = id_restaurante;
    let id_combo = service
        .register_combo(&combo)
        .await
        .map_err(|e| failure("registrar combo", &e))?;
    Ok(success(json!({ "id_combo": id_combo })))
}

/// GET /api/restaurantes/{id}/pedidos?estado=
pub async fn list_orders(
    service: &dyn FoodService,
    params: &PathParams,
    target: &str,
) -> HandlerResult {
    let id_restaurante = path_id(params, "id", INVALID_RESTAURANT_ID)?;
    let pedidos = service
        .list_restaurant_orders(id_restaurante, estado_filter(target))
        .await
        .map_err(|e| failure("obtener pedidos del restaurante", &e))?;
    Ok(success(json!({ "pedidos": pedidos })))
}

/// GET /api/restaurantes/{id}/pedidos/{pid}
pub async fn order_detail(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    let id_restaurante = path_id(params, "id", INVALID_PARAMS)?;
    let id_pedido = path_id(params, "pid", INVALID_PARAMS)?;
    let pedido = service
        .restaurant_order_detail(id_pedido, id_restaurante)
        .await
        .map_err(|e| failure("obtener detalle del pedido", &e))?;
    Ok(success(json!({ "pedido": pedido })))
}

/// PUT /api/restaurantes/{id}/pedidos/{pid}/estado
///
/// Always moves the order to [`DISPATCHED_STATE`]; failures are reported as 500.
pub async fn dispatch_order(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    path_id(params, "id", INVALID_RESTAURANT_ID)?;
    let id_pedido = path_id(params, "pid", INVALID_ORDER_ID)?;
    match service.update_order_status(id_pedido, DISPATCHED_STATE).await {
        Ok(true) => Ok(success(json!({
            "message": format!("Estado actualizado a {DISPATCHED_STATE}"),
        }))),
        Ok(false) => Err(Response::internal_error(
            "Error al actualizar estado del pedido",
        )),
        Err(e) => Err(Response::internal_error(format!("Error: {e}"))),
    }
}
