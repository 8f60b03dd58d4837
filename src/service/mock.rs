//! Recording in-memory executor for tests
//!
//! Every call is recorded with its arguments so tests can assert whether the
//! executor was reached and with what.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::models::{
    AssignedCourier, Client, ClientOrderCount, ClientOrderDetail, ClientOrderSummary,
    ClientsOrdersReport, Combo, Courier, CourierComplaints, CourierOrder, CourierRating,
    CreatedOrder, NewCombo, NewCourier, NewOrder, NewRestaurant, NewUser, Order, OrderTotals,
    PopularRestaurant, Rating, RegisteredCourier, Restaurant, RestaurantOrder,
    RestaurantOrderDetail, RestaurantSales, UserSummary,
};
use super::{FoodService, ServiceError, ServiceResult};

pub struct MockFoodService {
    calls: Mutex<Vec<(&'static str, Value)>>,
    /// When set, every operation fails with `ServiceError::Rejected`
    pub failure: Option<String>,
    /// Outcome reported by status updates and ratings
    pub outcome: bool,
    pub known_user: Option<UserSummary>,
    pub restaurants: Vec<Restaurant>,
    pub popular: Vec<PopularRestaurant>,
}

impl Default for MockFoodService {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
            outcome: true,
            known_user: Some(UserSummary {
                id_usuario: 11,
                nombre: "Ana Mora".to_string(),
                tipo: "cliente".to_string(),
                estado: "activo".to_string(),
                origen: "usuarios".to_string(),
                cedula: "1-1111-1111".to_string(),
            }),
            restaurants: vec![
                Restaurant {
                    id_restaurante: 1,
                    nombre: "Wok Express".to_string(),
                    cedula_juridica: "3-101-000001".to_string(),
                    direccion: "San José".to_string(),
                    tipo_comida: "china".to_string(),
                },
                Restaurant {
                    id_restaurante: 2,
                    nombre: "Verde".to_string(),
                    cedula_juridica: "3-101-000002".to_string(),
                    direccion: "Heredia".to_string(),
                    tipo_comida: "saludable".to_string(),
                },
            ],
            popular: vec![
                PopularRestaurant {
                    id_restaurante: 2,
                    nombre: "Verde".to_string(),
                    tipo_comida: "saludable".to_string(),
                    total_pedidos: 9,
                    ranking: 0,
                },
                PopularRestaurant {
                    id_restaurante: 1,
                    nombre: "Wok Express".to_string(),
                    tipo_comida: "china".to_string(),
                    total_pedidos: 4,
                    ranking: 0,
                },
            ],
        }
    }
}

impl MockFoodService {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Status updates and ratings report `false`
    pub fn refusing() -> Self {
        Self {
            outcome: false,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Arguments of the only recorded call to `op`
    pub fn single_call(&self, op: &str) -> Value {
        let calls = self.calls();
        let matching: Vec<_> = calls.iter().filter(|(name, _)| *name == op).collect();
        assert_eq!(matching.len(), 1, "expected one call to {op}, got {calls:?}");
        matching[0].1.clone()
    }

    fn record(&self, op: &'static str, args: Value) -> ServiceResult<()> {
        self.calls.lock().unwrap().push((op, args));
        match &self.failure {
            Some(message) => Err(ServiceError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FoodService for MockFoodService {
    async fn register_user(&self, user: &NewUser) -> ServiceResult<i32> {
        self.record("register_user", json!(user))?;
        Ok(11)
    }

    async fn verify_user(&self, cedula: &str) -> ServiceResult<Option<UserSummary>> {
        self.record("verify_user", json!({ "cedula": cedula }))?;
        Ok(self.known_user.clone().filter(|u| u.cedula == cedula))
    }

    async fn list_active_clients(&self) -> ServiceResult<Vec<Client>> {
        self.record("list_active_clients", Value::Null)?;
        Ok(vec![Client {
            id_usuario: 11,
            nombre: "Ana Mora".to_string(),
            estado: "activo".to_string(),
            ..Client::default()
        }])
    }

    async fn clients_orders_report(&self) -> ServiceResult<ClientsOrdersReport> {
        self.record("clients_orders_report", Value::Null)?;
        Ok(ClientsOrdersReport::from_rows(vec![ClientOrderCount {
            id_usuario: 11,
            nombre: "Ana Mora".to_string(),
            cedula: "1-1111-1111".to_string(),
            total_pedidos: 3,
            total_gastado: 25.5,
        }]))
    }

    async fn list_restaurants(&self) -> ServiceResult<Vec<Restaurant>> {
        self.record("list_restaurants", Value::Null)?;
        Ok(self.restaurants.clone())
    }

    async fn register_restaurant(&self, restaurant: &NewRestaurant) -> ServiceResult<i32> {
        self.record("register_restaurant", json!(restaurant))?;
        Ok(3)
    }

    async fn list_combos(&self, id_restaurante: i32) -> ServiceResult<Vec<Combo>> {
        self.record("list_combos", json!({ "id_restaurante": id_restaurante }))?;
        Ok(vec![Combo {
            id_combo: 5,
            id_restaurante,
            numero_combo: 1,
            nombre: "Combo 1".to_string(),
            descripcion: "Arroz cantonés".to_string(),
            precio: 4500.0,
        }])
    }

    async fn register_combo(&self, combo: &NewCombo) -> ServiceResult<i32> {
        self.record("register_combo", json!(combo))?;
        Ok(6)
    }

    async fn list_restaurant_orders(
        &self,
        id_restaurante: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<RestaurantOrder>> {
        self.record(
            "list_restaurant_orders",
            json!({ "id_restaurante": id_restaurante, "estado": estado }),
        )?;
        Ok(vec![RestaurantOrder {
            id_pedido: 31,
            estado: estado.unwrap_or("pendiente").to_string(),
            ..RestaurantOrder::default()
        }])
    }

    async fn restaurant_order_detail(
        &self,
        id_pedido: i32,
        id_restaurante: i32,
    ) -> ServiceResult<RestaurantOrderDetail> {
        self.record(
            "restaurant_order_detail",
            json!({ "id_pedido": id_pedido, "id_restaurante": id_restaurante }),
        )?;
        Ok(RestaurantOrderDetail {
            id_pedido,
            ..RestaurantOrderDetail::default()
        })
    }

    async fn update_order_status(&self, id_pedido: i32, estado: &str) -> ServiceResult<bool> {
        self.record(
            "update_order_status",
            json!({ "id_pedido": id_pedido, "estado": estado }),
        )?;
        Ok(self.outcome)
    }

    async fn create_order(
        &self,
        id_cliente: i32,
        id_restaurante: i32,
        direccion_entrega: &str,
    ) -> ServiceResult<CreatedOrder> {
        self.record(
            "create_order",
            json!({
                "id_cliente": id_cliente,
                "id_restaurante": id_restaurante,
                "direccion_entrega": direccion_entrega,
            }),
        )?;
        Ok(CreatedOrder {
            id_pedido: 40,
            id_repartidor: Some(7),
        })
    }

    async fn create_order_with_combos(&self, order: &NewOrder) -> ServiceResult<CreatedOrder> {
        self.record("create_order_with_combos", json!(order))?;
        Ok(CreatedOrder {
            id_pedido: 41,
            id_repartidor: Some(7),
        })
    }

    async fn add_combo_to_order(
        &self,
        id_pedido: i32,
        id_combo: i32,
        cantidad: i32,
    ) -> ServiceResult<i32> {
        self.record(
            "add_combo_to_order",
            json!({ "id_pedido": id_pedido, "id_combo": id_combo, "cantidad": cantidad }),
        )?;
        Ok(90)
    }

    async fn finalize_order(&self, id_pedido: i32) -> ServiceResult<OrderTotals> {
        self.record("finalize_order", json!({ "id_pedido": id_pedido }))?;
        Ok(OrderTotals {
            subtotal: 9000.0,
            transporte: 1000.0,
            iva: 1300.0,
            total: 11300.0,
        })
    }

    async fn client_order_detail(
        &self,
        id_pedido: i32,
        id_cliente: i32,
    ) -> ServiceResult<ClientOrderDetail> {
        self.record(
            "client_order_detail",
            json!({ "id_pedido": id_pedido, "id_cliente": id_cliente }),
        )?;
        Ok(ClientOrderDetail {
            id_pedido,
            repartidor: AssignedCourier {
                id: Some(7),
                nombre: Some("Luis".to_string()),
                telefono: Some("8888-0000".to_string()),
            },
            ..ClientOrderDetail::default()
        })
    }

    async fn list_client_orders(&self, id_cliente: i32) -> ServiceResult<Vec<Order>> {
        self.record("list_client_orders", json!({ "id_cliente": id_cliente }))?;
        Ok(vec![Order {
            id_pedido: 40,
            id_cliente,
            ..Order::default()
        }])
    }

    async fn list_client_orders_full(
        &self,
        id_cliente: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<ClientOrderSummary>> {
        self.record(
            "list_client_orders_full",
            json!({ "id_cliente": id_cliente, "estado": estado }),
        )?;
        Ok(vec![ClientOrderSummary {
            id_pedido: 40,
            ..ClientOrderSummary::default()
        }])
    }

    async fn rate_order(&self, rating: &Rating) -> ServiceResult<bool> {
        self.record("rate_order", json!(rating))?;
        Ok(self.outcome)
    }

    async fn list_couriers(&self) -> ServiceResult<Vec<Courier>> {
        self.record("list_couriers", Value::Null)?;
        Ok(vec![Courier {
            id_repartidor: 7,
            nombre: "Luis".to_string(),
            amonestaciones: 1,
            ..Courier::default()
        }])
    }

    async fn list_couriers_without_warnings(&self) -> ServiceResult<Vec<Courier>> {
        self.record("list_couriers_without_warnings", Value::Null)?;
        Ok(Vec::new())
    }

    async fn register_courier(&self, courier: &NewCourier) -> ServiceResult<RegisteredCourier> {
        self.record("register_courier", json!(courier))?;
        Ok(RegisteredCourier {
            id_usuario: 12,
            id_repartidor: 8,
        })
    }

    async fn add_courier_warning(&self, id_repartidor: i32) -> ServiceResult<i32> {
        self.record("add_courier_warning", json!({ "id_repartidor": id_repartidor }))?;
        Ok(2)
    }

    async fn list_courier_orders(
        &self,
        id_repartidor: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<CourierOrder>> {
        self.record(
            "list_courier_orders",
            json!({ "id_repartidor": id_repartidor, "estado": estado }),
        )?;
        Ok(Vec::new())
    }

    async fn popular_restaurants_report(&self) -> ServiceResult<Vec<PopularRestaurant>> {
        self.record("popular_restaurants_report", Value::Null)?;
        Ok(self.popular.clone())
    }

    async fn courier_ratings_report(&self) -> ServiceResult<Vec<CourierRating>> {
        self.record("courier_ratings_report", Value::Null)?;
        Ok(vec![CourierRating {
            id_repartidor: 7,
            nombre_repartidor: "Luis".to_string(),
            promedio_calificacion: 4.5,
            total_calificaciones: 2,
            total_quejas: 0,
        }])
    }

    async fn sales_report(&self) -> ServiceResult<Vec<RestaurantSales>> {
        self.record("sales_report", Value::Null)?;
        Ok(vec![RestaurantSales {
            id_restaurante: 1,
            nombre_restaurante: "Wok Express".to_string(),
            tipo_comida: "china".to_string(),
            total_vendido: 100.0,
            porcentaje_total: 100.0,
            ventas_totales_generales: 100.0,
        }])
    }

    async fn complaints_report(&self) -> ServiceResult<Vec<CourierComplaints>> {
        self.record("complaints_report", Value::Null)?;
        Ok(vec![CourierComplaints {
            id_repartidor: 7,
            nombre: "Luis".to_string(),
            total_quejas: 1,
        }])
    }
}
