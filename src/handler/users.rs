//! User and client endpoints

use hyper::StatusCode;
use serde_json::json;

use super::{failure, is_blank, parse_body, success, HandlerResult};
use crate::http::Response;
use crate::logger;
use crate::service::models::NewUser;
use crate::service::FoodService;

pub const CEDULA_REQUIRED: &str = "La cédula es obligatoria";
pub const NOMBRE_REQUIRED: &str = "El nombre es obligatorio";

/// POST /api/usuarios
pub async fn register(service: &dyn FoodService, body: &str) -> HandlerResult {
    let user: NewUser = parse_body(body, "registrar usuario")?;
    if is_blank(&user.cedula) {
        return Err(Response::bad_request(CEDULA_REQUIRED));
    }
    if is_blank(&user.nombre) {
        return Err(Response::bad_request(NOMBRE_REQUIRED));
    }

    let id_usuario = service
        .register_user(&user)
        .await
        .map_err(|e| failure("registrar usuario", &e))?;
    Ok(success(json!({ "id_usuario": id_usuario })))
}

/// GET /api/usuarios/{cedula}
pub async fn verify(service: &dyn FoodService, cedula: &str) -> HandlerResult {
    match service.verify_user(cedula).await {
        // Flat body: the user's fields sit next to `success`
        Ok(Some(user)) => Ok(success(json!(user))),
        Ok(None) => Err(Response::error(StatusCode::NOT_FOUND, "Usuario no encontrado")),
        Err(e) => {
            logger::log_error(&format!("verify user {cedula}: {e}"));
            Err(Response::internal_error("Error al verificar usuario"))
        }
    }
}

/// GET /api/clientes
pub async fn list_clients(service: &dyn FoodService) -> HandlerResult {
    let clientes = service
        .list_active_clients()
        .await
        .map_err(|e| failure("obtener clientes", &e))?;
    Ok(success(json!({ "clientes": clientes })))
}
