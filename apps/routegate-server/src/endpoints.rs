//! Sample order-service endpoints served by the binary.
//!
//! Each type is submitted to the link-time catalog with `register_endpoint!`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use routegate::{Endpoint, EndpointHandler, register_endpoint};
use routegate_auth::{ClaimPolicy, PolicyError, PolicyRegistryBuilder, axum_ext::Authn};
use serde::{Deserialize, Serialize};

pub const SALES_DEPARTMENT_POLICY: &str = "sales-department";

/// Named policies the endpoints below may reference
///
/// # Errors
/// Returns [`PolicyError`] on a duplicate name.
pub fn host_policies() -> Result<PolicyRegistryBuilder, PolicyError> {
    let mut policies = PolicyRegistryBuilder::new();
    policies.add_policy(
        SALES_DEPARTMENT_POLICY,
        ClaimPolicy::one_of("department", ["sales"]),
    )?;
    Ok(policies)
}

#[derive(Debug, Clone, Serialize)]
struct Order {
    id: u64,
    item: String,
    quantity: u32,
}

fn demo_orders() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            item: "keyboard".to_owned(),
            quantity: 2,
        },
        Order {
            id: 2,
            item: "monitor".to_owned(),
            quantity: 1,
        },
    ]
}

// ---------- Health ----------

#[derive(Default)]
pub struct Health;

impl Endpoint for Health {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/health".to_owned()]
    }

    fn allow_anonymous(&self) -> bool {
        true
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::new(|_req: Request| async {
            Json(serde_json::json!({ "status": "ok" }))
        }))
    }
}

register_endpoint!(Health);

// ---------- WhoAmI ----------

#[derive(Default)]
pub struct WhoAmI;

impl WhoAmI {
    async fn handle(self: Arc<Self>, request: Request) -> Response {
        let (mut parts, _) = request.into_parts();
        let Ok(Authn(principal)) = Authn::from_request_parts(&mut parts, &()).await;
        Json(serde_json::json!({
            "subject": principal.subject(),
            "roles": principal.roles().collect::<Vec<_>>(),
            "permissions": principal.permissions().iter().collect::<Vec<_>>(),
        }))
        .into_response()
    }
}

impl Endpoint for WhoAmI {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/me".to_owned()]
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::with_state(self, Self::handle))
    }
}

register_endpoint!(WhoAmI);

// ---------- Orders ----------

#[derive(Default)]
pub struct ListOrders;

impl Endpoint for ListOrders {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/orders".to_owned()]
    }

    fn permissions(&self) -> Vec<String> {
        vec!["orders.read".to_owned()]
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::new(|_req: Request| async {
            Json(demo_orders())
        }))
    }
}

register_endpoint!(ListOrders);

#[derive(Default)]
pub struct GetOrder;

impl GetOrder {
    async fn handle(self: Arc<Self>, request: Request) -> Response {
        let (mut parts, _) = request.into_parts();
        let id = match Path::<u64>::from_request_parts(&mut parts, &()).await {
            Ok(Path(id)) => id,
            Err(rejection) => return rejection.into_response(),
        };
        match demo_orders().into_iter().find(|o| o.id == id) {
            Some(order) => Json(order).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

impl Endpoint for GetOrder {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/orders/{id}".to_owned()]
    }

    fn permissions(&self) -> Vec<String> {
        vec!["orders.read".to_owned()]
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::with_state(self, Self::handle))
    }
}

register_endpoint!(GetOrder);

#[derive(Debug, Deserialize)]
struct NewOrder {
    item: String,
    quantity: u32,
}

/// Either `orders.write` or `orders.admin` is enough to place an order
pub struct CreateOrder {
    next_id: AtomicU64,
}

impl CreateOrder {
    fn starting_after_demo_data() -> anyhow::Result<Self> {
        let last = demo_orders()
            .iter()
            .map(|o| o.id)
            .max()
            .ok_or_else(|| anyhow::anyhow!("demo order set is empty"))?;
        Ok(Self {
            next_id: AtomicU64::new(last + 1),
        })
    }

    async fn handle(self: Arc<Self>, request: Request) -> Response {
        let Json(new_order) = match Json::<NewOrder>::from_request(request, &()).await {
            Ok(body) => body,
            Err(rejection) => return rejection.into_response(),
        };
        let order = Order {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            item: new_order.item,
            quantity: new_order.quantity,
        };
        tracing::info!(order_id = order.id, "Order created");
        (StatusCode::CREATED, Json(order)).into_response()
    }
}

impl Endpoint for CreateOrder {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::POST]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/orders".to_owned()]
    }

    fn permissions(&self) -> Vec<String> {
        vec!["orders.write".to_owned(), "orders.admin".to_owned()]
    }

    fn allow_any_permission(&self) -> bool {
        true
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::with_state(self, Self::handle))
    }
}

register_endpoint!(CreateOrder, ctor = CreateOrder::starting_after_demo_data);

/// Needs both permissions plus a support or admin role
#[derive(Default)]
pub struct CancelOrder;

impl Endpoint for CancelOrder {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::DELETE]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/orders/{id}".to_owned()]
    }

    fn roles(&self) -> Vec<String> {
        vec!["support".to_owned(), "admin".to_owned()]
    }

    fn permissions(&self) -> Vec<String> {
        vec!["orders.write".to_owned(), "orders.cancel".to_owned()]
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::new(|_req: Request| async {
            StatusCode::NO_CONTENT
        }))
    }
}

register_endpoint!(CancelOrder);

// ---------- Reports ----------

#[derive(Default)]
pub struct SalesReport;

impl Endpoint for SalesReport {
    fn verbs(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn routes(&self) -> Vec<String> {
        vec!["/reports/sales".to_owned()]
    }

    fn policies(&self) -> Vec<String> {
        vec![SALES_DEPARTMENT_POLICY.to_owned()]
    }

    fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
        Some(EndpointHandler::new(|_req: Request| async {
            let total: u32 = demo_orders().iter().map(|o| o.quantity).sum();
            Json(serde_json::json!({ "orders": demo_orders().len(), "units": total }))
        }))
    }
}

register_endpoint!(SalesReport);
