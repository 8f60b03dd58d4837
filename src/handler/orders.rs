//! Order lifecycle endpoints, client side

use serde::Deserialize;
use serde_json::json;

use super::{estado_filter, failure, is_blank, parse_body, path_id, success, HandlerResult};
use crate::http::{query_param, Response};
use crate::routing::PathParams;
use crate::service::models::{NewOrder, OrderItem, Rating};
use crate::service::FoodService;

const INVALID_ORDER_ID: &str = "ID de pedido inválido";
const INVALID_CLIENT_ID: &str = "ID de cliente inválido";
const INVALID_PARAMS: &str = "Parámetros inválidos";
pub const SCORE_OUT_OF_RANGE: &str = "Los puntajes deben estar entre 1 y 5";

#[derive(Debug, Deserialize)]
struct StatusChange {
    estado: String,
}

/// POST /api/pedidos
///
/// A non-empty `combos` array creates the order and its lines in one call.
pub async fn create(service: &dyn FoodService, body: &str) -> HandlerResult {
    let order: NewOrder = parse_body(body, "crear pedido")?;
    let created = if order.combos.is_empty() {
        service
            .create_order(order.id_cliente, order.id_restaurante, &order.direccion_entrega)
            .await
    } else {
        service.create_order_with_combos(&order).await
    }
    .map_err(|e| failure("crear pedido", &e))?;

    Ok(success(json!({
        "id_pedido": created.id_pedido,
        "id_repartidor": created.id_repartidor,
    })))
}

/// POST /api/pedidos/completo
pub async fn create_with_combos(service: &dyn FoodService, body: &str) -> HandlerResult {
    let order: NewOrder = parse_body(body, "crear pedido completo")?;
    let created = service
        .create_order_with_combos(&order)
        .await
        .map_err(|e| failure("crear pedido completo", &e))?;
    Ok(success(json!({ "pedido": created })))
}

/// POST /api/pedidos/{id}/combos
pub async fn add_combo(service: &dyn FoodService, params: &PathParams, body: &str) -> HandlerResult {
    let id_pedido = path_id(params, "id", INVALID_ORDER_ID)?;
    let item: OrderItem = parse_body(body, "agregar combo al pedido")?;
    let id_detalle = service
        .add_combo_to_order(id_pedido, item.id_combo, item.cantidad)
        .await
        .map_err(|e| failure("agregar combo al pedido", &e))?;
    Ok(success(json!({ "id_detalle": id_detalle })))
}

/// POST /api/pedidos/{id}/finalizar
pub async fn finalize(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    let id_pedido = path_id(params, "id", INVALID_ORDER_ID)?;
    let totals = service
        .finalize_order(id_pedido)
        .await
        .map_err(|e| failure("finalizar pedido", &e))?;
    Ok(success(json!(totals)))
}

/// GET /api/pedidos/{id}/detalle?cliente=
pub async fn detail(service: &dyn FoodService, params: &PathParams, target: &str) -> HandlerResult {
    let id_pedido = path_id(params, "id", INVALID_PARAMS)?;
    let id_cliente = query_param(target, "cliente")
        .and_then(|v| v.parse::<i32>().ok())
        .ok_or_else(|| Response::bad_request(INVALID_PARAMS))?;
    let pedido = service
        .client_order_detail(id_pedido, id_cliente)
        .await
        .map_err(|e| failure("obtener detalle del pedido", &e))?;
    Ok(success(json!({ "pedido": pedido })))
}

/// PUT /api/pedidos/{id}/estado
pub async fn update_status(
    service: &dyn FoodService,
    params: &PathParams,
    body: &str,
) -> HandlerResult {
    let id_pedido = path_id(params, "id", INVALID_ORDER_ID)?;
    let change: StatusChange = parse_body(body, "actualizar estado")?;
    if is_blank(&change.estado) {
        return Err(Response::bad_request("El estado es obligatorio"));
    }

    let updated = service
        .update_order_status(id_pedido, &change.estado)
        .await
        .map_err(|e| failure("actualizar estado", &e))?;
    if !updated {
        return Err(Response::bad_request("Error al actualizar estado del pedido"));
    }
    Ok(success(json!({ "message": "Estado actualizado" })))
}

/// POST /api/pedidos/calificar
pub async fn rate(service: &dyn FoodService, body: &str) -> HandlerResult {
    let rating: Rating = parse_body(body, "calificar pedido")?;
    if !rating.scores_valid() {
        return Err(Response::bad_request(SCORE_OUT_OF_RANGE));
    }

    let rated = service
        .rate_order(&rating)
        .await
        .map_err(|e| failure("calificar pedido", &e))?;
    let message = if rated {
        "Pedido calificado exitosamente"
    } else {
        "Error al calificar pedido"
    };
    Ok(Response::ok(&json!({
        "success": rated,
        "message": message,
    })))
}

/// GET /api/clientes/{id}/pedidos
pub async fn list_for_client(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    let id_cliente = path_id(params, "id", INVALID_CLIENT_ID)?;
    let pedidos = service
        .list_client_orders(id_cliente)
        .await
        .map_err(|e| failure("obtener pedidos del cliente", &e))?;
    Ok(success(json!({ "pedidos": pedidos })))
}

/// GET /api/clientes/{id}/pedidos-completos?estado=
pub async fn list_full_for_client(
    service: &dyn FoodService,
    params: &PathParams,
    target: &str,
) -> HandlerResult {
    let id_cliente = path_id(params, "id", INVALID_CLIENT_ID)?;
    let pedidos = service
        .list_client_orders_full(id_cliente, estado_filter(target))
        .await
        .map_err(|e| failure("listar pedidos del cliente", &e))?;
    Ok(success(json!({ "pedidos": pedidos })))
}
