//! Reporting endpoints

use serde_json::json;

use super::{failure, report_timestamp, success, HandlerResult};
use crate::service::FoodService;

/// GET /api/reportes/clientes-pedidos
pub async fn clients_orders(service: &dyn FoodService) -> HandlerResult {
    let report = service
        .clients_orders_report()
        .await
        .map_err(|e| failure("obtener reporte", &e))?;
    let cliente_top = report
        .cliente_top
        .map_or_else(|| json!({}), |client| json!(client));
    Ok(success(json!({
        "pedidos_por_cliente": report.pedidos_por_cliente,
        "cliente_top": cliente_top,
        "fecha_reporte": report_timestamp(),
    })))
}

/// GET /api/reportes/restaurantes-populares
pub async fn popular_restaurants(service: &dyn FoodService) -> HandlerResult {
    let mut restaurantes = service
        .popular_restaurants_report()
        .await
        .map_err(|e| failure("generar reporte", &e))?;
    for (position, restaurant) in restaurantes.iter_mut().enumerate() {
        restaurant.ranking = position + 1;
    }
    let total = restaurantes.len();
    Ok(success(json!({
        "restaurantes": restaurantes,
        "total_restaurantes": total,
        "fecha_reporte": report_timestamp(),
    })))
}

/// GET /api/reportes/calificaciones-repartidores
pub async fn courier_ratings(service: &dyn FoodService) -> HandlerResult {
    let calificaciones = service
        .courier_ratings_report()
        .await
        .map_err(|e| failure("obtener calificaciones", &e))?;
    let total = calificaciones.len();
    Ok(success(json!({
        "calificaciones": calificaciones,
        "total_calificaciones": total,
        "fecha_reporte": report_timestamp(),
    })))
}

/// GET /api/reportes/ventas-restaurantes
pub async fn sales(service: &dyn FoodService) -> HandlerResult {
    let reporte = service
        .sales_report()
        .await
        .map_err(|e| failure("generar reporte de ventas", &e))?;
    Ok(success(json!({ "reporte": reporte })))
}

/// GET /api/reportes/quejas-repartidores
pub async fn complaints(service: &dyn FoodService) -> HandlerResult {
    let quejas = service
        .complaints_report()
        .await
        .map_err(|e| failure("generar reporte de quejas", &e))?;
    Ok(success(json!({ "quejas": quejas })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use crate::service::mock::MockFoodService;
    use crate::service::models::ClientsOrdersReport;
    use serde_json::Value;

    fn body(response: &Response) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_popular_ranking_is_one_based() {
        let mock = MockFoodService::default();
        let value = body(&popular_restaurants(&mock).await.unwrap());
        assert_eq!(value["total_restaurantes"], 2);
        assert_eq!(value["restaurantes"][0]["nombre"], "Verde");
        assert_eq!(value["restaurantes"][0]["ranking"], 1);
        assert_eq!(value["restaurantes"][1]["ranking"], 2);
        assert!(value["fecha_reporte"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_clients_report_has_top_client() {
        let mock = MockFoodService::default();
        let value = body(&clients_orders(&mock).await.unwrap());
        assert_eq!(value["cliente_top"]["id_usuario"], 11);
        assert_eq!(value["pedidos_por_cliente"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_report_top_is_empty_object() {
        let report = ClientsOrdersReport::from_rows(Vec::new());
        let top = report
            .cliente_top
            .map_or_else(|| json!({}), |client| json!(client));
        assert_eq!(top, json!({}));
    }

    #[tokio::test]
    async fn test_sales_fields_are_camel_case() {
        let mock = MockFoodService::default();
        let value = body(&sales(&mock).await.unwrap());
        assert_eq!(value["reporte"][0]["nombreRestaurante"], "Wok Express");
    }

    #[tokio::test]
    async fn test_complaints_failure_envelope() {
        let mock = MockFoodService::failing("timeout");
        let err = complaints(&mock).await.unwrap_err();
        assert_eq!(
            body(&err)["error"],
            "Error al generar reporte de quejas: timeout"
        );
    }
}
