//! Route table module
//!
//! Ordered list of `(method, pattern, endpoint)`; the first entry whose method
//! and pattern both match wins.

use hyper::Method;

use super::{PathParams, PathPattern};

/// Business operation selected by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    RegisterUser,
    VerifyUser,
    ListClients,
    ClientsOrdersReport,
    ListRestaurants,
    RegisterRestaurant,
    ListCombos,
    RegisterCombo,
    ListRestaurantOrders,
    RestaurantOrderDetail,
    UpdateRestaurantOrderStatus,
    CreateOrder,
    CreateOrderWithCombos,
    AddComboToOrder,
    FinalizeOrder,
    ClientOrderDetail,
    UpdateOrderStatus,
    RateOrder,
    ListClientOrders,
    ListClientOrdersFull,
    ListCouriers,
    ListCouriersWithoutWarnings,
    RegisterCourier,
    AddCourierWarning,
    ListCourierOrders,
    PopularRestaurantsReport,
    CourierRatingsReport,
    SalesReport,
    ComplaintsReport,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(entries: &[(Method, &'static str, Endpoint)]) -> Self {
        let routes = entries
            .iter()
            .map(|(method, pattern, endpoint)| Route {
                method: method.clone(),
                pattern: PathPattern::new(pattern),
                endpoint: *endpoint,
            })
            .collect();
        Self { routes }
    }

    /// The food-ordering API
    pub fn food_api() -> Self {
        use Endpoint as E;
        Self::new(&[
            (Method::POST, "/api/usuarios", E::RegisterUser),
            (Method::GET, "/api/usuarios/{cedula}", E::VerifyUser),
            (Method::GET, "/api/clientes", E::ListClients),
            (Method::GET, "/api/clientes/{id}/pedidos", E::ListClientOrders),
            (Method::GET, "/api/clientes/{id}/pedidos-completos", E::ListClientOrdersFull),
            (Method::GET, "/api/restaurantes", E::ListRestaurants),
            (Method::POST, "/api/restaurantes", E::RegisterRestaurant),
            (Method::GET, "/api/restaurantes/{id}/combos", E::ListCombos),
            (Method::POST, "/api/restaurantes/{id}/combos", E::RegisterCombo),
            (Method::GET, "/api/restaurantes/{id}/pedidos", E::ListRestaurantOrders),
            (Method::GET, "/api/restaurantes/{id}/pedidos/{pid}", E::RestaurantOrderDetail),
            (Method::PUT, "/api/restaurantes/{id}/pedidos/{pid}/estado", E::UpdateRestaurantOrderStatus),
            (Method::POST, "/api/pedidos", E::CreateOrder),
            (Method::POST, "/api/pedidos/completo", E::CreateOrderWithCombos),
            (Method::POST, "/api/pedidos/calificar", E::RateOrder),
            (Method::POST, "/api/pedidos/{id}/combos", E::AddComboToOrder),
            (Method::POST, "/api/pedidos/{id}/finalizar", E::FinalizeOrder),
            (Method::GET, "/api/pedidos/{id}/detalle", E::ClientOrderDetail),
            (Method::PUT, "/api/pedidos/{id}/estado", E::UpdateOrderStatus),
            (Method::GET, "/api/repartidores", E::ListCouriers),
            (Method::POST, "/api/repartidores", E::RegisterCourier),
            (Method::GET, "/api/repartidores/cero-amorestaciones", E::ListCouriersWithoutWarnings),
            (Method::POST, "/api/repartidores/{id}/amonestacion", E::AddCourierWarning),
            (Method::GET, "/api/repartidores/{id}/pedidos", E::ListCourierOrders),
            (Method::GET, "/api/reportes/clientes-pedidos", E::ClientsOrdersReport),
            (Method::GET, "/api/reportes/restaurantes-populares", E::PopularRestaurantsReport),
            (Method::GET, "/api/reportes/calificaciones-repartidores", E::CourierRatingsReport),
            (Method::GET, "/api/reportes/ventas-restaurantes", E::SalesReport),
            (Method::GET, "/api/reportes/quejas-repartidores", E::ComplaintsReport),
        ])
    }

    /// Find the first route for `method` and `target`; the query string is ignored
    pub fn resolve(&self, method: &Method, target: &str) -> Option<(Endpoint, PathParams)> {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.matches(path).map(|p| (route.endpoint, p)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(method: Method, target: &str) -> Option<Endpoint> {
        RouteTable::food_api().resolve(&method, target).map(|(e, _)| e)
    }

    #[test]
    fn test_every_endpoint_is_routed_once() {
        let table = RouteTable::food_api();
        assert_eq!(table.routes().len(), 29);
        for (i, a) in table.routes().iter().enumerate() {
            for b in &table.routes()[i + 1..] {
                assert_ne!(a.endpoint, b.endpoint, "{}", a.pattern.as_str());
            }
        }
    }

    #[test]
    fn test_method_must_match() {
        assert_eq!(resolve(Method::GET, "/api/usuarios"), None);
        assert_eq!(resolve(Method::POST, "/api/usuarios"), Some(Endpoint::RegisterUser));
        assert_eq!(resolve(Method::DELETE, "/api/restaurantes"), None);
        assert_eq!(resolve(Method::PUT, "/api/pedidos/5/finalizar"), None);
    }

    #[test]
    fn test_literal_routes_beat_captures() {
        assert_eq!(
            resolve(Method::POST, "/api/pedidos/completo"),
            Some(Endpoint::CreateOrderWithCombos)
        );
        assert_eq!(
            resolve(Method::POST, "/api/pedidos/calificar"),
            Some(Endpoint::RateOrder)
        );
        assert_eq!(
            resolve(Method::GET, "/api/repartidores/cero-amorestaciones"),
            Some(Endpoint::ListCouriersWithoutWarnings)
        );
    }

    #[test]
    fn test_query_string_is_ignored() {
        let (endpoint, params) = RouteTable::food_api()
            .resolve(&Method::GET, "/api/restaurantes/7/pedidos?estado=pendiente")
            .unwrap();
        assert_eq!(endpoint, Endpoint::ListRestaurantOrders);
        assert_eq!(params.int("id"), Some(7));

        assert_eq!(
            resolve(Method::GET, "/api/pedidos/3/detalle?cliente=9"),
            Some(Endpoint::ClientOrderDetail)
        );
        assert_eq!(
            resolve(Method::GET, "/api/clientes/4/pedidos-completos?estado="),
            Some(Endpoint::ListClientOrdersFull)
        );
    }

    #[test]
    fn test_nested_restaurant_routes() {
        assert_eq!(
            resolve(Method::GET, "/api/restaurantes/7/pedidos/31"),
            Some(Endpoint::RestaurantOrderDetail)
        );
        assert_eq!(
            resolve(Method::PUT, "/api/restaurantes/7/pedidos/31/estado"),
            Some(Endpoint::UpdateRestaurantOrderStatus)
        );
        assert_eq!(resolve(Method::GET, "/api/restaurantes/7/pedidos/31/extra"), None);
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(resolve(Method::GET, "/"), None);
        assert_eq!(resolve(Method::GET, "/api/desconocido"), None);
        assert_eq!(resolve(Method::GET, "/api/clientes/"), None);
    }
}
