use axum::{
    extract::{Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::ListQuery;
use crate::record::{Filter, StockFields};
use crate::server::AppState;
use crate::Error;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    /// Comma-separated filter arguments; `\,` is a literal comma
    pub args: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    fn to_filter(&self) -> Option<Filter> {
        let clause = self.filter.as_deref()?.trim();
        if clause.is_empty() {
            return None;
        }
        let args = self.args.as_deref().map(split_args).unwrap_or_default();
        Some(Filter::with_text_args(clause, &args))
    }
}

/// Split on unescaped commas. An empty string carries no arguments.
fn split_args(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(',') => current.push(','),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            ',' => args.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    args.push(current.trim().to_string());
    args
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn api_error(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        Error::Validation(_)
        | Error::MalformedId(_)
        | Error::UnknownColumn(_)
        | Error::ReadOnlyColumn(_)
        | Error::InvalidValue(_)
        | Error::Storage(_) => StatusCode::BAD_REQUEST,
        Error::UnrecognizedResource(_) => StatusCode::NOT_FOUND,
        Error::UnsupportedOperation { .. } => StatusCode::METHOD_NOT_ALLOWED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn not_found(resource: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: format!("No stock at {}", resource) }),
    )
}

pub async fn list_collection(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let resource = state.collection();
    let mut query = ListQuery::all();
    query.filter = params.to_filter();
    query.order = params.order.clone();

    let content_type = state.service.content_type(resource.clone()).await.map_err(api_error)?;
    let rows = state.service.list(resource, query).await.map_err(api_error)?;

    Ok(Json(serde_json::json!({
        "type": content_type,
        "rows": rows.to_json(),
    })))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let resource = state.item(&id);
    let rows = state.service.list(resource.clone(), ListQuery::all()).await.map_err(api_error)?;
    let row = rows.first().ok_or_else(|| not_found(&resource))?;

    Ok(Json(row.to_json()))
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Map<String, serde_json::Value>>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let fields = StockFields::from_json(&body).map_err(api_error)?;
    let uri = state.service.create(state.collection(), fields).await.map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "uri": uri }))))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Map<String, serde_json::Value>>,
) -> ApiResult<Json<serde_json::Value>> {
    let fields = StockFields::from_json(&body).map_err(api_error)?;
    let rows = state.service.update(state.item(&id), fields, None).await.map_err(api_error)?;

    Ok(Json(serde_json::json!({ "updated": rows })))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let rows = state.service.delete(state.item(&id), None).await.map_err(api_error)?;
    Ok(Json(serde_json::json!({ "deleted": rows })))
}

pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let rows = state
        .service
        .delete(state.collection(), params.to_filter())
        .await
        .map_err(api_error)?;
    Ok(Json(serde_json::json!({ "deleted": rows })))
}

pub async fn sell_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let resource = state.item(&id);
    let outcome = state
        .service
        .record_sale(resource.clone())
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found(&resource))?;

    Ok(Json(serde_json::to_value(outcome).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
    })?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::StockGateway;
    use crate::service::StockService;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        let service = StockService::start(StockGateway::open_in_memory().unwrap()).unwrap();
        Arc::new(AppState { service })
    }

    fn body(value: serde_json::Value) -> Json<serde_json::Map<String, serde_json::Value>> {
        Json(value.as_object().unwrap().clone())
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let state = state();
        let (status, Json(created)) = create_item(
            State(Arc::clone(&state)),
            body(json!({"name": "Eyeliner", "supplier": "Loreal", "type": 2, "price": 5, "quantity": 10})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["uri"], "stockapp/stock/1");

        let Json(row) = get_item(State(Arc::clone(&state)), Path("1".to_string())).await.unwrap();
        assert_eq!(row["name"], "Eyeliner");
        assert_eq!(row["quantity"], 10);
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let state = state();
        let err = create_item(State(state), body(json!({"type": 1}))).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1.error, "Stock requires a name");
    }

    #[tokio::test]
    async fn test_item_errors() {
        let state = state();
        let missing = get_item(State(Arc::clone(&state)), Path("9".to_string())).await.unwrap_err();
        assert_eq!(missing.0, StatusCode::NOT_FOUND);

        let malformed = delete_item(State(Arc::clone(&state)), Path("abc".to_string())).await.unwrap_err();
        assert_eq!(malformed.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filtered_list_and_bulk_delete() {
        let state = state();
        for name in ["Blush", "Mascara", "Blush"] {
            create_item(State(Arc::clone(&state)), body(json!({"name": name, "type": 1})))
                .await
                .unwrap();
        }

        let params = ListParams {
            filter: Some("name = ?".into()),
            args: Some("Blush".into()),
            order: Some("_id DESC".into()),
        };
        let Json(listed) = list_collection(State(Arc::clone(&state)), Query(params)).await.unwrap();
        assert_eq!(listed["type"], "vnd.shopit.dir/stockapp/stock");
        assert_eq!(listed["rows"].as_array().unwrap().len(), 2);
        assert_eq!(listed["rows"][0]["_id"], 3);

        let Json(deleted) = delete_collection(State(Arc::clone(&state)), Query(ListParams::default()))
            .await
            .unwrap();
        assert_eq!(deleted["deleted"], 3);
    }

    #[test]
    fn test_split_args() {
        assert!(split_args("").is_empty());
        assert_eq!(split_args("Blush"), vec!["Blush"]);
        assert_eq!(split_args("a, b"), vec!["a", "b"]);
        assert_eq!(split_args("Smith\\, Jones,x"), vec!["Smith, Jones", "x"]);
        assert_eq!(split_args("a,"), vec!["a", ""]);
    }

    #[tokio::test]
    async fn test_empty_args_bind_nothing() {
        let state = state();
        create_item(State(Arc::clone(&state)), body(json!({"name": "Blush", "type": 1})))
            .await
            .unwrap();

        let params = ListParams {
            filter: Some("quantity = 0".into()),
            args: Some(String::new()),
            order: None,
        };
        let Json(listed) = list_collection(State(Arc::clone(&state)), Query(params)).await.unwrap();
        assert_eq!(listed["rows"].as_array().unwrap().len(), 1);

        let comma = ListParams {
            filter: Some("supplier = ?".into()),
            args: Some("Smith\\, Jones".into()),
            order: None,
        };
        create_item(
            State(Arc::clone(&state)),
            body(json!({"name": "Kohl", "type": 2, "supplier": "Smith, Jones"})),
        )
        .await
        .unwrap();
        let Json(listed) = list_collection(State(state), Query(comma)).await.unwrap();
        assert_eq!(listed["rows"][0]["name"], "Kohl");
    }

    #[tokio::test]
    async fn test_update_and_sell() {
        let state = state();
        create_item(State(Arc::clone(&state)), body(json!({"name": "Blush", "type": 1, "quantity": 2})))
            .await
            .unwrap();

        let Json(updated) = update_item(State(Arc::clone(&state)), Path("1".to_string()), body(json!({"supplier": "Nyx"})))
            .await
            .unwrap();
        assert_eq!(updated["updated"], 1);

        let Json(sold) = sell_item(State(Arc::clone(&state)), Path("1".to_string())).await.unwrap();
        assert_eq!(sold["quantity"], 1);
        assert_eq!(sold["sold"], true);

        let readonly = update_item(State(state), Path("1".to_string()), body(json!({"_id": 5})))
            .await
            .unwrap_err();
        assert_eq!(readonly.0, StatusCode::BAD_REQUEST);
    }
}
