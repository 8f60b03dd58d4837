//! Downstream executor module
//!
//! `FoodService` is the seam between HTTP handling and the business logic
//! stored in the database: one async method per operation, typed inputs and
//! outputs. The process holds one instance for its whole lifetime.

mod error;
pub mod models;
mod postgres;

#[cfg(test)]
pub mod mock;

pub use error::ServiceError;
pub use postgres::PgFoodService;

use async_trait::async_trait;

use models::{
    ClientOrderDetail, ClientOrderSummary, Client, ClientsOrdersReport, Combo, Courier,
    CourierComplaints, CourierOrder, CourierRating, CreatedOrder, NewCombo, NewCourier, NewOrder,
    NewRestaurant, NewUser, Order, OrderTotals, PopularRestaurant, Rating, RegisteredCourier,
    Restaurant, RestaurantOrder, RestaurantOrderDetail, RestaurantSales, UserSummary,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait FoodService: Send + Sync {
    // Users and clients
    async fn register_user(&self, user: &NewUser) -> ServiceResult<i32>;
    /// `Ok(None)` when no user has that national ID
    async fn verify_user(&self, cedula: &str) -> ServiceResult<Option<UserSummary>>;
    async fn list_active_clients(&self) -> ServiceResult<Vec<Client>>;
    async fn clients_orders_report(&self) -> ServiceResult<ClientsOrdersReport>;

    // Restaurants and combos
    async fn list_restaurants(&self) -> ServiceResult<Vec<Restaurant>>;
    async fn register_restaurant(&self, restaurant: &NewRestaurant) -> ServiceResult<i32>;
    async fn list_combos(&self, id_restaurante: i32) -> ServiceResult<Vec<Combo>>;
    async fn register_combo(&self, combo: &NewCombo) -> ServiceResult<i32>;
    async fn list_restaurant_orders(
        &self,
        id_restaurante: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<RestaurantOrder>>;
    async fn restaurant_order_detail(
        &self,
        id_pedido: i32,
        id_restaurante: i32,
    ) -> ServiceResult<RestaurantOrderDetail>;

    // Orders
    async fn update_order_status(&self, id_pedido: i32, estado: &str) -> ServiceResult<bool>;
    async fn create_order(
        &self,
        id_cliente: i32,
        id_restaurante: i32,
        direccion_entrega: &str,
    ) -> ServiceResult<CreatedOrder>;
    /// Creates the order and all its combo lines in one procedure call
    async fn create_order_with_combos(&self, order: &NewOrder) -> ServiceResult<CreatedOrder>;
    async fn add_combo_to_order(
        &self,
        id_pedido: i32,
        id_combo: i32,
        cantidad: i32,
    ) -> ServiceResult<i32>;
    async fn finalize_order(&self, id_pedido: i32) -> ServiceResult<OrderTotals>;
    async fn client_order_detail(
        &self,
        id_pedido: i32,
        id_cliente: i32,
    ) -> ServiceResult<ClientOrderDetail>;
    async fn list_client_orders(&self, id_cliente: i32) -> ServiceResult<Vec<Order>>;
    async fn list_client_orders_full(
        &self,
        id_cliente: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<ClientOrderSummary>>;
    async fn rate_order(&self, rating: &Rating) -> ServiceResult<bool>;

    // Couriers
    async fn list_couriers(&self) -> ServiceResult<Vec<Courier>>;
    async fn list_couriers_without_warnings(&self) -> ServiceResult<Vec<Courier>>;
    async fn register_courier(&self, courier: &NewCourier) -> ServiceResult<RegisteredCourier>;
    /// Returns the courier's warning count after the increment
    async fn add_courier_warning(&self, id_repartidor: i32) -> ServiceResult<i32>;
    async fn list_courier_orders(
        &self,
        id_repartidor: i32,
        estado: Option<&str>,
    ) -> ServiceResult<Vec<CourierOrder>>;

    // Reports
    async fn popular_restaurants_report(&self) -> ServiceResult<Vec<PopularRestaurant>>;
    async fn courier_ratings_report(&self) -> ServiceResult<Vec<CourierRating>>;
    async fn sales_report(&self) -> ServiceResult<Vec<RestaurantSales>>;
    async fn complaints_report(&self) -> ServiceResult<Vec<CourierComplaints>>;
}
