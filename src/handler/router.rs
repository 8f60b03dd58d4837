//! Request routing dispatch module
//!
//! Entry point for request processing: resolves the route table entry for the
//! request and hands it to the matching endpoint handler.

use crate::config::AppState;
use crate::http::{Request, Response};
use crate::logger;
use crate::routing::Endpoint;

use super::{couriers, orders, reports, restaurants, users};

/// Main entry point for request handling; always produces a response
pub async fn handle_request(req: &Request, state: &AppState) -> Response {
    logger::log_headers_count(req.headers.len(), state.config.logging.show_headers);

    let Some((endpoint, params)) = state.routes.resolve(&req.method, &req.target) else {
        logger::log_debug(&format!("No route for {} {}", req.method, req.path()));
        return Response::not_found();
    };

    let service = state.service.as_ref();
    let body = req.body.as_str();
    let target = req.target.as_str();

    let result = match endpoint {
        Endpoint::RegisterUser => users::register(service, body).await,
        Endpoint::VerifyUser => {
            let cedula = params.get("cedula").unwrap_or_default();
            users::verify(service, cedula).await
        }
        Endpoint::ListClients => users::list_clients(service).await,
        Endpoint::ClientsOrdersReport => reports::clients_orders(service).await,

        Endpoint::ListRestaurants => restaurants::list(service).await,
        Endpoint::RegisterRestaurant => restaurants::register(service, body).await,
        Endpoint::ListCombos => restaurants::list_combos(service, &params).await,
        Endpoint::RegisterCombo => restaurants::register_combo(service, &params, body).await,
        Endpoint::ListRestaurantOrders => {
            restaurants::list_orders(service, &params, target).await
        }
        Endpoint::RestaurantOrderDetail => restaurants::order_detail(service, &params).await,
        Endpoint::UpdateRestaurantOrderStatus => {
            restaurants::dispatch_order(service, &params).await
        }

        Endpoint::CreateOrder => orders::create(service, body).await,
        Endpoint::CreateOrderWithCombos => orders::create_with_combos(service, body).await,
        Endpoint::AddComboToOrder => orders::add_combo(service, &params, body).await,
        Endpoint::FinalizeOrder => orders::finalize(service, &params).await,
        Endpoint::ClientOrderDetail => orders::detail(service, &params, target).await,
        Endpoint::UpdateOrderStatus => orders::update_status(service, &params, body).await,
        Endpoint::RateOrder => orders::rate(service, body).await,
        Endpoint::ListClientOrders => orders::list_for_client(service, &params).await,
        Endpoint::ListClientOrdersFull => {
            orders::list_full_for_client(service, &params, target).await
        }

        Endpoint::ListCouriers => couriers::list(service).await,
        Endpoint::ListCouriersWithoutWarnings => couriers::list_without_warnings(service).await,
        Endpoint::RegisterCourier => couriers::register(service, body).await,
        Endpoint::AddCourierWarning => couriers::add_warning(service, &params).await,
        Endpoint::ListCourierOrders => couriers::list_orders(service, &params, target).await,

        Endpoint::PopularRestaurantsReport => reports::popular_restaurants(service).await,
        Endpoint::CourierRatingsReport => reports::courier_ratings(service).await,
        Endpoint::SalesReport => reports::sales(service).await,
        Endpoint::ComplaintsReport => reports::complaints(service).await,
    };

    result.unwrap_or_else(|error_response| error_response)
}
