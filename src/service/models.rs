//! Records exchanged with the downstream executor
//!
//! Row types deserialize from a result row rendered as a JSON object (column
//! name to value, NULL columns omitted) and serialize straight into response
//! bodies. Request types deserialize from client JSON bodies.

use serde::{Deserialize, Deserializer, Serialize};

/// Status row returned by procedures that report success as a flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcedureOutcome {
    #[serde(deserialize_with = "flag")]
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Users and clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub cedula: String,
    pub nombre: String,
    pub correo: String,
    pub direccion: String,
    pub telefono: String,
    pub numero_tarjeta: String,
    pub tipo: String,
}

/// Result of looking a user up by national ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSummary {
    pub id_usuario: i32,
    pub nombre: String,
    pub tipo: String,
    pub estado: String,
    pub origen: String,
    pub cedula: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id_usuario: i32,
    pub cedula: String,
    pub nombre: String,
    pub correo: String,
    pub direccion: String,
    pub tipo: String,
    pub telefono: String,
    pub estado: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOrderCount {
    pub id_usuario: i32,
    pub nombre: String,
    pub cedula: String,
    pub total_pedidos: i64,
    pub total_gastado: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientsOrdersReport {
    pub pedidos_por_cliente: Vec<ClientOrderCount>,
    /// Client with the most orders; first one wins on ties
    pub cliente_top: Option<ClientOrderCount>,
}

impl ClientsOrdersReport {
    pub fn from_rows(rows: Vec<ClientOrderCount>) -> Self {
        let cliente_top = rows
            .iter()
            .fold(None::<&ClientOrderCount>, |top, row| match top {
                Some(t) if t.total_pedidos >= row.total_pedidos => Some(t),
                _ => Some(row),
            })
            .cloned();
        Self {
            pedidos_por_cliente: rows,
            cliente_top,
        }
    }
}

// ---------------------------------------------------------------------------
// Restaurants and combos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restaurant {
    pub id_restaurante: i32,
    pub nombre: String,
    pub cedula_juridica: String,
    pub direccion: String,
    pub tipo_comida: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewRestaurant {
    pub nombre: String,
    pub cedula_juridica: String,
    pub direccion: String,
    pub tipo_comida: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combo {
    pub id_combo: i32,
    pub id_restaurante: i32,
    pub numero_combo: i32,
    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCombo {
    pub id_restaurante: i32,
    pub numero_combo: i32,
    pub nombre: String,
    pub descripcion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantOrder {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub total: f64,
    pub nombre_cliente: String,
    pub direccion_cliente: String,
    pub nombre_repartidor: Option<String>,
    pub cantidad_items: i64,
}

/// One order as seen by the restaurant preparing it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantOrderDetail {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub total: f64,
    pub nombre_cliente: String,
    pub direccion_cliente: String,
    #[serde(alias = "telefono")]
    pub telefono_cliente: Option<String>,
    pub nombre_repartidor: Option<String>,
    pub telefono_repartidor: Option<String>,
    pub detalles: Vec<RestaurantOrderLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantOrderLine {
    pub combo: String,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub subtotal: f64,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedOrder {
    pub id_pedido: i32,
    pub id_repartidor: Option<i32>,
}

/// A combo line requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id_combo: i32,
    pub cantidad: i32,
}

/// Body of `POST /api/pedidos` and `POST /api/pedidos/completo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub id_cliente: i32,
    pub id_restaurante: i32,
    pub direccion_entrega: String,
    #[serde(default)]
    pub combos: Vec<OrderItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub transporte: f64,
    pub iva: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id_pedido: i32,
    pub id_cliente: i32,
    pub id_restaurante: i32,
    pub id_repartidor: Option<i32>,
    pub fecha_pedido: String,
    pub estado: String,
    pub subtotal: f64,
    pub costo_transporte: f64,
    pub iva: f64,
    pub total: f64,
    pub direccion_entrega: String,
}

/// Courier as embedded in a client's view of an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignedCourier {
    pub id: Option<i32>,
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

/// Header row of `sp_obtener_detalle_pedido_completo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientOrderHeaderRow {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub subtotal: f64,
    pub costo_transporte: f64,
    pub iva: f64,
    pub total: f64,
    pub direccion_entrega: String,
    pub restaurante: String,
    pub direccion_restaurante: String,
    pub id_repartidor: Option<i32>,
    pub nombre_repartidor: Option<String>,
    pub telefono_repartidor: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub calificado: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientOrderDetail {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub subtotal: f64,
    pub costo_transporte: f64,
    pub iva: f64,
    pub total: f64,
    pub direccion_entrega: String,
    pub restaurante: String,
    pub direccion_restaurante: String,
    pub repartidor: AssignedCourier,
    pub calificado: bool,
    pub detalles: Vec<ClientOrderLine>,
}

impl ClientOrderDetail {
    pub fn from_row(row: ClientOrderHeaderRow, detalles: Vec<ClientOrderLine>) -> Self {
        Self {
            id_pedido: row.id_pedido,
            fecha_pedido: row.fecha_pedido,
            estado: row.estado,
            subtotal: row.subtotal,
            costo_transporte: row.costo_transporte,
            iva: row.iva,
            total: row.total,
            direccion_entrega: row.direccion_entrega,
            restaurante: row.restaurante,
            direccion_restaurante: row.direccion_restaurante,
            repartidor: AssignedCourier {
                id: row.id_repartidor,
                nombre: row.nombre_repartidor,
                telefono: row.telefono_repartidor,
            },
            calificado: row.calificado,
            detalles,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOrderLine {
    pub id_detalle: i32,
    pub id_combo: i32,
    pub nombre_combo: String,
    pub descripcion: String,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub subtotal: f64,
}

/// Row of `sp_listar_pedidos_cliente`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientOrderSummaryRow {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub total: f64,
    pub restaurante: String,
    pub tipo_comida: String,
    pub id_repartidor: Option<i32>,
    pub nombre_repartidor: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub calificado: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientOrderSummary {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub total: f64,
    pub restaurante: String,
    pub tipo_comida: String,
    pub repartidor: AssignedCourier,
    pub calificado: bool,
}

impl From<ClientOrderSummaryRow> for ClientOrderSummary {
    fn from(row: ClientOrderSummaryRow) -> Self {
        Self {
            id_pedido: row.id_pedido,
            fecha_pedido: row.fecha_pedido,
            estado: row.estado,
            total: row.total,
            restaurante: row.restaurante,
            tipo_comida: row.tipo_comida,
            repartidor: AssignedCourier {
                id: row.id_repartidor,
                nombre: row.nombre_repartidor,
                telefono: None,
            },
            calificado: row.calificado,
        }
    }
}

/// Body of `POST /api/pedidos/calificar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id_pedido: i32,
    pub id_cliente: i32,
    pub puntaje_repartidor: i32,
    pub puntaje_restaurante: i32,
    #[serde(default)]
    pub comentario: Option<String>,
    #[serde(default)]
    pub queja: bool,
}

impl Rating {
    pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

    pub fn scores_valid(&self) -> bool {
        Self::SCORE_RANGE.contains(&self.puntaje_repartidor)
            && Self::SCORE_RANGE.contains(&self.puntaje_restaurante)
    }
}

// ---------------------------------------------------------------------------
// Couriers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Courier {
    pub id_repartidor: i32,
    pub id_usuario: i32,
    pub nombre: String,
    pub cedula: String,
    pub estado_usuario: String,
    pub estado_disponibilidad: String,
    pub distancia_pedido: f64,
    pub km_recorridos_diarios: f64,
    pub costo_por_km: f64,
    pub amonestaciones: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCourier {
    pub cedula: String,
    pub nombre: String,
    pub correo: String,
    pub direccion: String,
    pub telefono: String,
    pub costo_por_km: f64,
}

impl NewCourier {
    /// Card number recorded for courier accounts, which never pay
    pub const PLACEHOLDER_CARD: &'static str = "129927771";

    /// The user account created alongside the courier
    pub fn as_user(&self) -> NewUser {
        NewUser {
            cedula: self.cedula.clone(),
            nombre: self.nombre.clone(),
            correo: self.correo.clone(),
            direccion: self.direccion.clone(),
            telefono: self.telefono.clone(),
            numero_tarjeta: Self::PLACEHOLDER_CARD.to_string(),
            tipo: "repartidor".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCourier {
    pub id_usuario: i32,
    pub id_repartidor: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierOrder {
    pub id_pedido: i32,
    pub fecha_pedido: String,
    pub estado: String,
    pub total: f64,
    pub restaurante: String,
    pub direccion_restaurante: String,
    pub direccion_entrega: String,
    pub nombre_cliente: String,
    pub telefono_cliente: Option<String>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularRestaurant {
    pub id_restaurante: i32,
    pub nombre: String,
    pub tipo_comida: String,
    pub total_pedidos: i64,
    /// 1-based position, assigned when the report is rendered
    pub ranking: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierRating {
    pub id_repartidor: i32,
    pub nombre_repartidor: String,
    pub promedio_calificacion: f64,
    pub total_calificaciones: i64,
    pub total_quejas: i64,
}

/// Serialized in camelCase, the shape existing clients read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct RestaurantSales {
    pub id_restaurante: i32,
    pub nombre_restaurante: String,
    pub tipo_comida: String,
    pub total_vendido: f64,
    pub porcentaje_total: f64,
    pub ventas_totales_generales: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierComplaints {
    pub id_repartidor: i32,
    #[serde(alias = "nombre_repartidor")]
    pub nombre: String,
    pub total_quejas: i64,
}

/// Accept a boolean column or a 0/1 integer column
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_with_missing_nullable_columns() {
        let order: Order = serde_json::from_value(json!({
            "id_pedido": 3,
            "id_restaurante": 2,
            "fecha_pedido": "2025-05-01 12:30:00",
            "estado": "pendiente",
            "total": 14,
        }))
        .unwrap();
        assert_eq!(order.id_repartidor, None);
        assert!((order.total - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_calificado_accepts_int_or_bool() {
        let row: ClientOrderSummaryRow =
            serde_json::from_value(json!({"id_pedido": 1, "calificado": 1})).unwrap();
        assert!(row.calificado);
        let row: ClientOrderSummaryRow =
            serde_json::from_value(json!({"id_pedido": 1, "calificado": false})).unwrap();
        assert!(!row.calificado);
    }

    #[test]
    fn test_summary_nests_courier() {
        let row: ClientOrderSummaryRow = serde_json::from_value(json!({
            "id_pedido": 8,
            "id_repartidor": 4,
            "nombre_repartidor": "Ana",
            "calificado": 0,
        }))
        .unwrap();
        let value = serde_json::to_value(ClientOrderSummary::from(row)).unwrap();
        assert_eq!(value["repartidor"], json!({"id": 4, "nombre": "Ana"}));
        assert_eq!(value["calificado"], false);
    }

    #[test]
    fn test_sales_serialize_camel_case() {
        let row: RestaurantSales = serde_json::from_value(json!({
            "id_restaurante": 1,
            "nombre_restaurante": "Wok",
            "total_vendido": 10.5,
        }))
        .unwrap();
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["idRestaurante"], 1);
        assert_eq!(value["nombreRestaurante"], "Wok");
        assert_eq!(value["totalVendido"], 10.5);
    }

    #[test]
    fn test_complaints_read_nombre_repartidor() {
        let row: CourierComplaints = serde_json::from_value(json!({
            "id_repartidor": 2,
            "nombre_repartidor": "Luis",
            "total_quejas": 3,
        }))
        .unwrap();
        assert_eq!(row.nombre, "Luis");
        assert_eq!(serde_json::to_value(&row).unwrap()["nombre"], "Luis");
    }

    #[test]
    fn test_new_order_requires_core_fields() {
        let order: NewOrder = serde_json::from_value(json!({
            "id_cliente": 1,
            "id_restaurante": 2,
            "direccion_entrega": "X",
        }))
        .unwrap();
        assert!(order.combos.is_empty());

        let missing = serde_json::from_value::<NewOrder>(json!({"id_cliente": 1}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_rating_score_range() {
        let mut rating = Rating {
            id_pedido: 1,
            id_cliente: 2,
            puntaje_repartidor: 5,
            puntaje_restaurante: 1,
            comentario: None,
            queja: false,
        };
        assert!(rating.scores_valid());
        rating.puntaje_repartidor = 6;
        assert!(!rating.scores_valid());
        rating.puntaje_repartidor = 0;
        assert!(!rating.scores_valid());
    }

    #[test]
    fn test_top_client() {
        let row = |id, total| ClientOrderCount {
            id_usuario: id,
            total_pedidos: total,
            ..ClientOrderCount::default()
        };
        let report = ClientsOrdersReport::from_rows(vec![row(1, 2), row(2, 5), row(3, 5)]);
        assert_eq!(report.cliente_top.map(|c| c.id_usuario), Some(2));
        assert_eq!(ClientsOrdersReport::from_rows(Vec::new()).cliente_top, None);
    }

    #[test]
    fn test_courier_user_account() {
        let courier = NewCourier {
            cedula: "1".to_string(),
            nombre: "Ana".to_string(),
            ..NewCourier::default()
        };
        let user = courier.as_user();
        assert_eq!(user.tipo, "repartidor");
        assert_eq!(user.numero_tarjeta, NewCourier::PLACEHOLDER_CARD);
    }
}
