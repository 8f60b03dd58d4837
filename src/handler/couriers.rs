//! Courier endpoints

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::users::{CEDULA_REQUIRED, NOMBRE_REQUIRED};
use super::{estado_filter, failure, is_blank, parse_body, path_id, success, HandlerResult};
use crate::http::Response;
use crate::routing::PathParams;
use crate::service::models::NewCourier;
use crate::service::FoodService;

const INVALID_COURIER_ID: &str = "ID de repartidor inválido";

/// GET /api/repartidores
pub async fn list(service: &dyn FoodService) -> HandlerResult {
    let repartidores = service
        .list_couriers()
        .await
        .map_err(|e| failure("obtener repartidores", &e))?;
    Ok(success(json!({ "repartidores": repartidores })))
}

/// GET /api/repartidores/cero-amorestaciones
pub async fn list_without_warnings(service: &dyn FoodService) -> HandlerResult {
    let repartidores = service
        .list_couriers_without_warnings()
        .await
        .map_err(|e| failure("obtener repartidores", &e))?;
    Ok(success(json!({ "repartidores": repartidores })))
}

/// POST /api/repartidores
pub async fn register(service: &dyn FoodService, body: &str) -> HandlerResult {
    let courier: NewCourier = parse_body(body, "registrar repartidor")?;
    validate(&courier).map_err(Response::bad_request)?;

    let registered = service
        .register_courier(&courier)
        .await
        .map_err(|e| failure("registrar repartidor", &e))?;
    Ok(success(json!({
        "id_repartidor": registered.id_repartidor,
        "id_usuario": registered.id_usuario,
        "message": "Repartidor registrado exitosamente",
    })))
}

/// POST /api/repartidores/{id}/amonestacion
pub async fn add_warning(service: &dyn FoodService, params: &PathParams) -> HandlerResult {
    let id_repartidor = path_id(params, "id", INVALID_COURIER_ID)?;
    let amonestaciones = service
        .add_courier_warning(id_repartidor)
        .await
        .map_err(|e| failure("asignar amonestación", &e))?;
    Ok(success(json!({ "amonestaciones": amonestaciones })))
}

/// GET /api/repartidores/{id}/pedidos?estado=
pub async fn list_orders(
    service: &dyn FoodService,
    params: &PathParams,
    target: &str,
) -> HandlerResult {
    let id_repartidor = path_id(params, "id", INVALID_COURIER_ID)?;
    let pedidos = service
        .list_courier_orders(id_repartidor, estado_filter(target))
        .await
        .map_err(|e| failure("obtener pedidos del repartidor", &e))?;
    Ok(success(json!({ "pedidos": pedidos })))
}

/// First failed check, in the order clients expect them
fn validate(courier: &NewCourier) -> Result<(), &'static str> {
    if is_blank(&courier.cedula) {
        return Err(CEDULA_REQUIRED);
    }
    if is_blank(&courier.nombre) {
        return Err(NOMBRE_REQUIRED);
    }
    if courier.costo_por_km <= 0.0 {
        return Err("El costo por km debe ser mayor a 0");
    }
    if !is_valid_email(&courier.correo) {
        return Err("El correo electrónico no es válido");
    }
    if is_blank(&courier.telefono) {
        return Err("El teléfono es obligatorio");
    }
    Ok(())
}

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").ok());

fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}
