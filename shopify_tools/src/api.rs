use std::sync::Arc;

use graphql_parser::parse_query;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ShopifyConfig,
    data_objects::{FulfillmentHold, FulfillmentOrder, OrderSearchResult},
    helpers::parse_gid,
    Customer,
    ShopifyApiError,
    ShopifyOrder,
    ShopifyProduct,
};

#[derive(Clone)]
pub struct ShopifyApi {
    config: ShopifyConfig,
    client: Arc<Client>,
}

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const ORDER_SEARCH_QUERY: &str = r#"
query searchOrders($query: String!, $first: Int!) {
  orders(first: $first, query: $query, sortKey: CREATED_AT, reverse: true) { nodes { id name } }
}"#;

impl ShopifyApi {
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyApiError> {
        let token = HeaderValue::from_str(config.admin_access_token.reveal())
            .map_err(|e| ShopifyApiError::Initialization(format!("The admin access token is not a valid header. {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn shop(&self) -> &str {
        self.config.shop.as_str()
    }

    /// The Admin API endpoint for `path`, e.g. `/orders.json`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("https://{}/admin/api/{}{path}", self.config.shop, self.config.api_version)
    }

    /// Sends a REST request to the Admin API and deserializes the JSON reply. Non-2xx replies become
    /// [`ShopifyApiError::QueryError`], carrying the status and the response text.
    pub async fn send_rest<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ShopifyApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let endpoint = self.endpoint(path);
        trace!("{method} {endpoint}");
        let mut request = self.client.request(method, endpoint.as_str()).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| ShopifyApiError::RestRequestError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.map_err(|e| ShopifyApiError::RestResponseError(e.to_string()))?;
            debug!("{endpoint} answered {status}. {message}");
            return Err(ShopifyApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("{endpoint} answered {status}");
        response.json::<T>().await.map_err(|e| ShopifyApiError::JsonError(e.to_string()))
    }

    /// Runs a GraphQL query against the Admin API and deserializes its `data` field. The query is syntax-checked
    /// locally before it is sent.
    pub async fn send_graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ShopifyApiError> {
        let document = parse_query::<String>(query).map_err(|e| ShopifyApiError::InvalidGraphQL(e.to_string()))?;
        let request = serde_json::json!({ "query": document.to_string(), "variables": variables });
        let mut reply = self.send_rest::<Value, Value>(Method::POST, "/graphql.json", &[], Some(&request)).await?;
        if let Some(errors) = reply.get("errors").and_then(Value::as_array) {
            let messages = errors.iter().map(Value::to_string).collect::<Vec<_>>();
            return Err(ShopifyApiError::GraphQLError(messages.join(", ")));
        }
        trace!("GraphQL query cost: {}", reply["extensions"]["cost"]);
        match reply.get_mut("data").map(Value::take) {
            None | Some(Value::Null) => Err(ShopifyApiError::EmptyResponse),
            Some(data) => serde_json::from_value(data).map_err(|e| ShopifyApiError::JsonError(e.to_string())),
        }
    }

    pub async fn get_order(&self, order_id: i64) -> Result<ShopifyOrder, ShopifyApiError> {
        #[derive(Deserialize)]
        struct OrderResponse {
            order: ShopifyOrder,
        }
        let path = format!("/orders/{order_id}.json");
        debug!("Fetching order #{order_id}");
        let result = self.send_rest::<OrderResponse, ()>(Method::GET, &path, &[], None).await?;
        info!("Fetched order #{order_id}");
        Ok(result.order)
    }

    /// Fetches up to `limit` orders, newest first, regardless of status.
    pub async fn fetch_recent_orders(&self, limit: u64) -> Result<Vec<ShopifyOrder>, ShopifyApiError> {
        #[derive(Deserialize)]
        struct OrdersResponse {
            orders: Vec<ShopifyOrder>,
        }
        let limit = limit.to_string();
        let params = [("status", "any"), ("order", "created_at desc"), ("limit", limit.as_str())];
        debug!("Fetching the {limit} most recent orders");
        let result = self.send_rest::<OrdersResponse, ()>(Method::GET, "/orders.json", &params, None).await?;
        debug!("Fetched {} recent orders", result.orders.len());
        Ok(result.orders)
    }

    /// Runs a storefront order search (Shopify search syntax, e.g. `name:#1001`) and returns the matching order ids,
    /// newest first.
    pub async fn search_order_ids(&self, query: &str, first: u64) -> Result<Vec<i64>, ShopifyApiError> {
        let variables = serde_json::json!({ "query": query, "first": first });
        debug!("Searching orders for '{query}'");
        let result = self.send_graphql::<OrderSearchResult>(ORDER_SEARCH_QUERY, variables).await?;
        let ids = result.orders.nodes.iter().map(|n| parse_gid(&n.id)).collect::<Result<Vec<i64>, _>>()?;
        debug!("Order search for '{query}' returned {} results", ids.len());
        Ok(ids)
    }

    /// Overwrites the note and tags of an order. Both values must already contain anything that should be kept.
    pub async fn update_order_annotations(
        &self,
        order_id: i64,
        note: &str,
        tags: &str,
    ) -> Result<ShopifyOrder, ShopifyApiError> {
        #[derive(Deserialize)]
        struct OrderResponse {
            order: ShopifyOrder,
        }
        let path = format!("/orders/{order_id}.json");
        let body = serde_json::json!({ "order": { "id": order_id, "note": note, "tags": tags } });
        debug!("Updating note and tags on order #{order_id}");
        let result = self.send_rest::<OrderResponse, Value>(Method::PUT, &path, &[], Some(&body)).await?;
        info!("Updated order #{order_id}. Tags are now: {}", result.order.tags);
        Ok(result.order)
    }

    pub async fn get_customer(&self, customer_id: i64) -> Result<Customer, ShopifyApiError> {
        #[derive(Deserialize)]
        struct CustomerResponse {
            customer: Customer,
        }
        let path = format!("/customers/{customer_id}.json");
        debug!("Fetching customer {customer_id}");
        let result = self.send_rest::<CustomerResponse, ()>(Method::GET, &path, &[], None).await?;
        Ok(result.customer)
    }

    pub async fn update_customer_tags(&self, customer_id: i64, tags: &str) -> Result<Customer, ShopifyApiError> {
        #[derive(Deserialize)]
        struct CustomerResponse {
            customer: Customer,
        }
        let path = format!("/customers/{customer_id}.json");
        let body = serde_json::json!({ "customer": { "id": customer_id, "tags": tags } });
        debug!("Updating tags on customer {customer_id}");
        let result = self.send_rest::<CustomerResponse, Value>(Method::PUT, &path, &[], Some(&body)).await?;
        info!("Updated customer {customer_id}. Tags are now: {}", result.customer.tags);
        Ok(result.customer)
    }

    pub async fn get_product(&self, product_id: i64) -> Result<ShopifyProduct, ShopifyApiError> {
        #[derive(Deserialize)]
        struct ProductResponse {
            product: ShopifyProduct,
        }
        let path = format!("/products/{product_id}.json");
        debug!("Fetching product {product_id}");
        let result = self.send_rest::<ProductResponse, ()>(Method::GET, &path, &[], None).await?;
        Ok(result.product)
    }

    pub async fn fetch_fulfillment_orders(&self, order_id: i64) -> Result<Vec<FulfillmentOrder>, ShopifyApiError> {
        #[derive(Deserialize)]
        struct FulfillmentOrdersResponse {
            fulfillment_orders: Vec<FulfillmentOrder>,
        }
        let path = format!("/orders/{order_id}/fulfillment_orders.json");
        debug!("Fetching fulfillment orders for order #{order_id}");
        let result = self.send_rest::<FulfillmentOrdersResponse, ()>(Method::GET, &path, &[], None).await?;
        debug!("Order #{order_id} has {} fulfillment orders", result.fulfillment_orders.len());
        Ok(result.fulfillment_orders)
    }

    pub async fn hold_fulfillment_order(
        &self,
        fulfillment_order_id: i64,
        hold: FulfillmentHold,
    ) -> Result<FulfillmentOrder, ShopifyApiError> {
        #[derive(Serialize)]
        struct HoldInput {
            fulfillment_hold: FulfillmentHold,
        }
        #[derive(Deserialize)]
        struct FulfillmentOrderResponse {
            fulfillment_order: FulfillmentOrder,
        }
        let path = format!("/fulfillment_orders/{fulfillment_order_id}/hold.json");
        debug!("Placing hold ({}) on fulfillment order {fulfillment_order_id}", hold.reason);
        let input = HoldInput { fulfillment_hold: hold };
        let result =
            self.send_rest::<FulfillmentOrderResponse, HoldInput>(Method::POST, &path, &[], Some(&input)).await?;
        info!("Fulfillment order {fulfillment_order_id} is now {}", result.fulfillment_order.status);
        Ok(result.fulfillment_order)
    }
}
