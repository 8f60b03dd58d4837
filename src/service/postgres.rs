//! PostgreSQL executor
//!
//! Every business operation is a server-side function called as
//! `SELECT * FROM <function>($1, ...)`. Each operation opens its own
//! connection and drops it on return; nothing is pooled.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client as PgClient, NoTls, Row};

use super::models::{
    Client, ClientOrderCount, ClientOrderDetail, ClientOrderHeaderRow, ClientOrderLine,
    ClientOrderSummary, ClientOrderSummaryRow, ClientsOrdersReport, Combo, Courier,
    CourierComplaints, CourierOrder, CourierRating, CreatedOrder, NewCombo, NewCourier, NewOrder,
    NewRestaurant, NewUser, Order, OrderTotals, PopularRestaurant, ProcedureOutcome, Rating,
    RegisteredCourier, Restaurant, RestaurantOrder, RestaurantOrderDetail, RestaurantOrderLine,
    RestaurantSales, UserSummary,
};
use super::{FoodService, ServiceError, ServiceResult};
use crate::config::DatabaseConfig;
use crate::logger;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// A result row rendered as column name to JSON value, NULL columns omitted
type RowObject = Map<String, Value>;

pub struct PgFoodService {
    config: tokio_postgres::Config,
}

impl PgFoodService {
    pub fn new(db: &DatabaseConfig) -> Self {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&db.host)
            .port(db.port)
            .user(&db.user)
            .password(&db.password)
            .dbname(&db.dbname)
            .application_name(env!("CARGO_PKG_NAME"))
            .connect_timeout(Duration::from_secs(db.connect_timeout));
        Self { config }
    }

    async fn connect(&self) -> ServiceResult<PgClient> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| ServiceError::connection(&e))?;

        // The connection future performs the socket I/O; it ends when the client drops
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                logger::log_error(&format!("Database connection error: {e}"));
            }
        });

        Ok(client)
    }

    /// Run one function on a fresh connection and decode every row
    async fn query<T: DeserializeOwned>(
        &self,
        procedure: &'static str,
        params: Params<'_>,
    ) -> ServiceResult<Vec<T>> {
        let client = self.connect().await?;
        let rows = call(&client, procedure, params).await?;
        decode_rows(procedure, rows)
    }

    /// Like `query`, but exactly one row is expected; none yields `missing`
    async fn query_one<T: DeserializeOwned>(
        &self,
        procedure: &'static str,
        params: Params<'_>,
        missing: &str,
    ) -> ServiceResult<T> {
        let client = self.connect().await?;
        let rows = call(&client, procedure, params).await?;
        first_row(procedure, rows, missing)
    }

    /// Read a single column of the first row
    async fn query_scalar<T: DeserializeOwned>(
        &self,
        procedure: &'static str,
        params: Params<'_>,
        column: &str,
    ) -> ServiceResult<T> {
        let client = self.connect().await?;
        let rows = call(&client, procedure, params).await?;
        scalar(procedure, rows, column)
    }
}

#[async_trait]
impl FoodService for PgFoodService {
    async fn register_user(&self, user: &NewUser) -> ServiceResult<i32> {
        self.query_scalar(
            "sp_registrar_usuario",
            &[
                &user.cedula,
                &user.nombre,
                &user.correo,
                &user.direccion,
                &user.telefono,
                &user.numero_tarjeta,
                &user.tipo,
            ],
            "id_usuario",
        )
        .await
    }

    async fn verify_user(&self, cedula: &str) -> ServiceResult<Option<UserSummary>> {
        let mut users: Vec<UserSummary> = self.query("sp_verificar_usuario", &[&cedula]).await?;
        if users.is_empty() {
            return Ok(None);
        }
        let mut user = users.swap_remove(0);
        if user.cedula.is_empty() {
            cedula.clone_into(&mut user.cedula);
        }
        Ok(Some(user))
    }

    async fn list_active_clients(&self) -> ServiceResult<Vec<Client>> {
        self.query("sp_GetAllclientes", &[]).await
    }

    async fn clients_orders_report(&self) -> ServiceResult<ClientsOrdersReport> {
        let rows: Vec<ClientOrderCount> = self.query("sp_reporte_clientes_pedidos", &[]).await?;
        Ok(ClientsOrdersReport::from_rows(rows))
    }

    async fn list_restaurants(&self) -> ServiceResult<Vec<Restaurant>> {
        self.query("sp_obtener_restaurantes", &[]).await
    }

    async fn register_restaurant(&self, restaurant: &NewRestaurant) -> ServiceResult<i32> {
        self.query_scalar(
            "sp_registrar_restaurante",
            &[
                &restaurant.nombre,
                &restaurant.cedula_juridica,
                &restaurant.direccion,
                &restaurant.tipo_comida,
            ],
            "id_restaurante",
        )
        .await
    }

    async fn list_combos(&self, id_restaurante: i32) -> ServiceResult<Vec<Combo>> {
        let mut combos: Vec<Combo> = self.query("sp_obtener_combos", &[&id_restaurante]).await?;
        for combo in &mut combos {
            combo.id_restaurante = id_restaurante;
        }
        Ok(combos)
    }

    async fn register_combo(&self, combo: &NewCombo) -> ServiceResult<i32> {
        self.query_scalar(
            "sp_registrar_combo",
            &[
                &combo.id_restaurante,
                &combo.numero_combo,
                &combo.nombre,
                &combo.descripcion,
            ],
            "id_combo",
        )
        .await
    }

    async fn list_restaurant_orders(
        &self,
        id_restaurante: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<RestaurantOrder>> {
        self.query("sp_listar_pedidos_restaurante", &[&id_restaurante, &estado])
            .await
    }

    async fn restaurant_order_detail(
        &self,
        id_pedido: i32,
        id_restaurante: i32,
    ) -> ServiceResult<RestaurantOrderDetail> {
        let client = self.connect().await?;
        let header_rows = call(
            &client,
            "sp_ver_detalle_pedido_restaurante",
            &[&id_pedido, &id_restaurante],
        )
        .await?;
        let mut detail: RestaurantOrderDetail = first_row(
            "sp_ver_detalle_pedido_restaurante",
            header_rows,
            "Pedido no encontrado",
        )?;

        let line_rows = call(
            &client,
            "sp_ver_lineas_pedido_restaurante",
            &[&id_pedido, &id_restaurante],
        )
        .await?;
        detail.detalles =
            decode_rows::<RestaurantOrderLine>("sp_ver_lineas_pedido_restaurante", line_rows)?;
        Ok(detail)
    }

    async fn update_order_status(&self, id_pedido: i32, estado: &str) -> ServiceResult<bool> {
        let outcome: Vec<ProcedureOutcome> = self
            .query("sp_actualizar_estado_pedido", &[&id_pedido, &estado])
            .await?;
        Ok(outcome.first().is_some_and(|o| o.success))
    }

    async fn create_order(
        &self,
        id_cliente: i32,
        id_restaurante: i32,
        direccion_entrega: &str,
    ) -> ServiceResult<CreatedOrder> {
        self.query_one(
            "sp_crear_pedido",
            &[&id_cliente, &id_restaurante, &direccion_entrega],
            "No se pudo crear el pedido",
        )
        .await
    }

    async fn create_order_with_combos(&self, order: &NewOrder) -> ServiceResult<CreatedOrder> {
        let combos = serde_json::to_string(&order.combos)
            .map_err(|e| ServiceError::decode("sp_crear_pedido_completo", e.to_string()))?;
        logger::log_debug(&format!(
            "[DB] Creating order for client {} with combos {combos}",
            order.id_cliente
        ));
        self.query_one(
            "sp_crear_pedido_completo",
            &[
                &order.id_cliente,
                &order.id_restaurante,
                &order.direccion_entrega,
                &combos,
            ],
            "No se pudo crear el pedido",
        )
        .await
    }

    async fn add_combo_to_order(
        &self,
        id_pedido: i32,
        id_combo: i32,
        cantidad: i32,
    ) -> ServiceResult<i32> {
        self.query_scalar(
            "sp_agregar_combo_pedido",
            &[&id_pedido, &id_combo, &cantidad],
            "id_detalle",
        )
        .await
    }

    async fn finalize_order(&self, id_pedido: i32) -> ServiceResult<OrderTotals> {
        self.query_one("sp_finalizar_pedido", &[&id_pedido], "Pedido no encontrado")
            .await
    }

    async fn client_order_detail(
        &self,
        id_pedido: i32,
        id_cliente: i32,
    ) -> ServiceResult<ClientOrderDetail> {
        let client = self.connect().await?;
        let header_rows = call(
            &client,
            "sp_obtener_detalle_pedido_completo",
            &[&id_pedido, &id_cliente],
        )
        .await?;
        let header: ClientOrderHeaderRow = first_row(
            "sp_obtener_detalle_pedido_completo",
            header_rows,
            "Pedido no encontrado o no pertenece al cliente",
        )?;

        let line_rows = call(&client, "sp_obtener_detalles_pedido", &[&id_pedido]).await?;
        let lines = decode_rows::<ClientOrderLine>("sp_obtener_detalles_pedido", line_rows)?;
        Ok(ClientOrderDetail::from_row(header, lines))
    }

    async fn list_client_orders(&self, id_cliente: i32) -> ServiceResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .query("sp_obtener_pedidos_cliente", &[&id_cliente])
            .await?;
        for order in &mut orders {
            order.id_cliente = id_cliente;
        }
        Ok(orders)
    }

    async fn list_client_orders_full(
        &self,
        id_cliente: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<ClientOrderSummary>> {
        let rows: Vec<ClientOrderSummaryRow> = self
            .query("sp_listar_pedidos_cliente", &[&id_cliente, &estado])
            .await?;
        Ok(rows.into_iter().map(ClientOrderSummary::from).collect())
    }

    async fn rate_order(&self, rating: &Rating) -> ServiceResult<bool> {
        let outcome: Vec<ProcedureOutcome> = self
            .query(
                "sp_calificar_pedido",
                &[
                    &rating.id_pedido,
                    &rating.id_cliente,
                    &rating.puntaje_repartidor,
                    &rating.puntaje_restaurante,
                    &rating.comentario,
                    &rating.queja,
                ],
            )
            .await?;
        Ok(outcome.first().is_some_and(|o| o.success))
    }

    async fn list_couriers(&self) -> ServiceResult<Vec<Courier>> {
        self.query("getAllRepartidores", &[]).await
    }

    async fn list_couriers_without_warnings(&self) -> ServiceResult<Vec<Courier>> {
        self.query("sp_repartidores_cero_amonestaciones", &[]).await
    }

    async fn register_courier(&self, courier: &NewCourier) -> ServiceResult<RegisteredCourier> {
        let user = courier.as_user();
        let client = self.connect().await?;

        let rows = call(
            &client,
            "sp_registrar_usuario",
            &[
                &user.cedula,
                &user.nombre,
                &user.correo,
                &user.direccion,
                &user.telefono,
                &user.numero_tarjeta,
                &user.tipo,
            ],
        )
        .await?;
        let id_usuario: i32 = scalar("sp_registrar_usuario", rows, "id_usuario")?;
        logger::log_debug(&format!("[DB] Courier user registered with id {id_usuario}"));

        let rows = call(
            &client,
            "sp_registrar_repartidor",
            &[&id_usuario, &courier.costo_por_km],
        )
        .await?;
        let id_repartidor: i32 = scalar("sp_registrar_repartidor", rows, "id_repartidor")?;

        Ok(RegisteredCourier {
            id_usuario,
            id_repartidor,
        })
    }

    async fn add_courier_warning(&self, id_repartidor: i32) -> ServiceResult<i32> {
        self.query_scalar(
            "sp_asignar_amonestacion",
            &[&id_repartidor],
            "amonestaciones_actuales",
        )
        .await
    }

    async fn list_courier_orders(
        &self,
        id_repartidor: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<CourierOrder>> {
        self.query("sp_listar_pedidos_repartidor", &[&id_repartidor, &estado])
            .await
    }

    async fn popular_restaurants_report(&self) -> ServiceResult<Vec<PopularRestaurant>> {
        self.query("sp_restaurantes_populares", &[]).await
    }

    async fn courier_ratings_report(&self) -> ServiceResult<Vec<CourierRating>> {
        self.query("sp_reporte_calificaciones_repartidores", &[]).await
    }

    async fn sales_report(&self) -> ServiceResult<Vec<RestaurantSales>> {
        self.query("sp_ventas_por_restaurante_simple", &[]).await
    }

    async fn complaints_report(&self) -> ServiceResult<Vec<CourierComplaints>> {
        self.query("sp_reporte_quejas_repartidores", &[]).await
    }
}

/// Execute `procedure` with positional parameters on an open connection
async fn call(
    client: &PgClient,
    procedure: &'static str,
    params: Params<'_>,
) -> ServiceResult<Vec<RowObject>> {
    let sql = call_statement(procedure, params.len());
    logger::log_debug(&format!("[DB] {sql}"));

    let rows = client
        .query(sql.as_str(), params)
        .await
        .map_err(|e| ServiceError::procedure(procedure, &e))?;
    rows.iter().map(|row| row_object(procedure, row)).collect()
}

fn call_statement(procedure: &str, arity: usize) -> String {
    let placeholders = (1..=arity)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT * FROM {procedure}({placeholders})")
}

fn decode_rows<T: DeserializeOwned>(
    procedure: &'static str,
    rows: Vec<RowObject>,
) -> ServiceResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row))
                .map_err(|e| ServiceError::decode(procedure, e.to_string()))
        })
        .collect()
}

fn first_row<T: DeserializeOwned>(
    procedure: &'static str,
    rows: Vec<RowObject>,
    missing: &str,
) -> ServiceResult<T> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(missing.to_string()))?;
    serde_json::from_value(Value::Object(row))
        .map_err(|e| ServiceError::decode(procedure, e.to_string()))
}

fn scalar<T: DeserializeOwned>(
    procedure: &'static str,
    rows: Vec<RowObject>,
    column: &str,
) -> ServiceResult<T> {
    let mut row = rows.into_iter().next().ok_or_else(|| {
        ServiceError::Rejected(format!("{procedure} no devolvió ningún resultado"))
    })?;
    let value = row
        .remove(column)
        .ok_or_else(|| ServiceError::decode(procedure, format!("falta la columna {column}")))?;
    serde_json::from_value(value).map_err(|e| ServiceError::decode(procedure, e.to_string()))
}

/// Decode every column by its declared type
fn row_object(procedure: &'static str, row: &Row) -> ServiceResult<RowObject> {
    let mut object = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.type_()).map_err(|e| {
            ServiceError::decode(
                procedure,
                format!("columna {} ({}): {e}", column.name(), column.type_()),
            )
        })?;
        if let Some(value) = value {
            object.insert(column.name().to_string(), value);
        }
    }
    Ok(object)
}

/// `Ok(None)` for SQL NULL. Types without a mapping are read as text, which
/// fails for non-text columns; NUMERIC results must be cast to float8.
fn column_value(row: &Row, idx: usize, ty: &Type) -> Result<Option<Value>, tokio_postgres::Error> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::from),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::from(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::from),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| Value::String(v.format(TIMESTAMP_FORMAT).to_string())),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| Value::String(v.format(TIMESTAMP_FORMAT).to_string())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| Value::String(v.format("%Y-%m-%d").to_string())),
        _ => row.try_get::<_, Option<String>>(idx)?.map(Value::String),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<RowObject> {
        values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_call_statement() {
        assert_eq!(
            call_statement("sp_GetAllclientes", 0),
            "SELECT * FROM sp_GetAllclientes()"
        );
        assert_eq!(
            call_statement("sp_calificar_pedido", 3),
            "SELECT * FROM sp_calificar_pedido($1, $2, $3)"
        );
    }

    #[test]
    fn test_scalar_reads_named_column() {
        let id: i32 = scalar(
            "sp_registrar_usuario",
            rows(vec![json!({"id_usuario": 42})]),
            "id_usuario",
        )
        .unwrap();
        assert_eq!(id, 42);
    }

    #[test]
    fn test_scalar_without_rows_is_rejected() {
        let err = scalar::<i32>("sp_registrar_combo", Vec::new(), "id_combo").unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));
    }

    #[test]
    fn test_scalar_missing_column_is_decode_error() {
        let err = scalar::<i32>(
            "sp_registrar_combo",
            rows(vec![json!({"otro": 1})]),
            "id_combo",
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Decode { .. }));
    }

    #[test]
    fn test_first_row_not_found() {
        let err =
            first_row::<OrderTotals>("sp_finalizar_pedido", Vec::new(), "Pedido no encontrado")
                .unwrap_err();
        assert_eq!(err.to_string(), "Pedido no encontrado");
    }

    #[test]
    fn test_decode_rows_keeps_order() {
        let restaurants: Vec<Restaurant> = decode_rows(
            "sp_obtener_restaurantes",
            rows(vec![
                json!({"id_restaurante": 2, "nombre": "B"}),
                json!({"id_restaurante": 1, "nombre": "A"}),
            ]),
        )
        .unwrap();
        let ids: Vec<i32> = restaurants.iter().map(|r| r.id_restaurante).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_service_builds_without_connecting() {
        let cfg = crate::config::Config::load_from("does-not-exist/foodorders").unwrap();
        let service = PgFoodService::new(&cfg.database);
        assert_eq!(service.config.get_dbname(), Some("foodorders"));
        assert_eq!(service.config.get_ports(), &[5432]);
    }
}
