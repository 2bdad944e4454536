//! Background requests. Every task reports back over the app channel; the
//! UI loop decides whether the result is still wanted.

use api_types::{
    catalog::Category,
    summary::{CategorySummary, DashboardData, DateSummary},
    transaction::TransactionView,
};
use engine::{
    Consumer, NewTransaction, QueryParams, RequestToken, TransactionEdit, stored_item_ids,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::client::{Client, ClientError, ClientResult};

#[derive(Debug)]
pub enum Payload {
    Dashboard(DashboardData),
    CategorySummary(Vec<CategorySummary>),
    DateSummary(Vec<DateSummary>),
    Transactions(Vec<TransactionView>),
    Categories(Vec<Category>),
    Platforms(Vec<String>),
}

#[derive(Debug)]
pub enum AppEvent {
    Fetched(RequestToken, ClientResult<Payload>),
    /// A write finished; carries the toast text on success.
    Saved(ClientResult<String>),
    Health(ClientResult<String>),
}

/// Fetches the data behind `token`'s consumer with `params`.
pub fn spawn_fetch(
    client: &Client,
    tx: &UnboundedSender<AppEvent>,
    token: RequestToken,
    params: QueryParams,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match token.consumer() {
            Consumer::SummaryCards => client.dashboard(&params).await.map(Payload::Dashboard),
            Consumer::CategoryBreakdown => client
                .category_summary(&params)
                .await
                .map(Payload::CategorySummary),
            Consumer::SpendingTrend => client.date_summary(&params).await.map(Payload::DateSummary),
            Consumer::TransactionsTable => {
                client.transactions(&params).await.map(Payload::Transactions)
            }
            Consumer::CategoryCatalog => client.categories().await.map(Payload::Categories),
            Consumer::PlatformCatalog => client.platforms().await.map(Payload::Platforms),
        };
        if tx.send(AppEvent::Fetched(token, result)).is_err() {
            tracing::debug!(consumer = token.consumer().label(), "app closed before fetch finished");
        }
    });
}

pub fn spawn_health(client: &Client, tx: &UnboundedSender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.health().await.map(|health| health.status);
        if tx.send(AppEvent::Health(result)).is_err() {
            tracing::debug!("app closed before health check finished");
        }
    });
}

async fn create(client: &Client, new: NewTransaction) -> ClientResult<String> {
    let id = client.create_transaction(&new.transaction).await?;
    for item in &new.items {
        client.add_item(id, item).await?;
    }
    tracing::info!(id, items = new.items.len(), "transaction created");
    Ok(format!("Added \"{}\"", new.transaction.description))
}

/// Item changes replace the stored set: every stored item is deleted and
/// the drafts added back. Nothing is written when a stored item cannot be
/// deleted.
async fn update(client: &Client, edit: TransactionEdit) -> ClientResult<String> {
    let stale = match &edit.items {
        Some(_) => {
            let current = client.transaction(edit.id).await?;
            stored_item_ids(&current).map_err(|err| ClientError::Validation(err.to_string()))?
        }
        None => Vec::new(),
    };
    client.update_transaction(edit.id, &edit.update).await?;
    for item_id in &stale {
        client.delete_item(edit.id, *item_id).await?;
    }
    let items = edit.items.as_deref().unwrap_or_default();
    for item in items {
        client.add_item(edit.id, item).await?;
    }
    tracing::info!(
        id = edit.id,
        removed = stale.len(),
        added = items.len(),
        "transaction updated"
    );
    Ok(format!("Saved \"{}\"", edit.update.description))
}

async fn remove(client: &Client, id: i64) -> ClientResult<String> {
    client.delete_transaction(id).await?;
    tracing::info!(id, "transaction deleted");
    Ok(format!("Deleted transaction #{id}"))
}

pub enum Write {
    Create(NewTransaction),
    Update(TransactionEdit),
    Delete(i64),
}

pub fn spawn_write(client: &Client, tx: &UnboundedSender<AppEvent>, write: Write) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match write {
            Write::Create(new) => create(&client, new).await,
            Write::Update(edit) => update(&client, edit).await,
            Write::Delete(id) => remove(&client, id).await,
        };
        if let Err(err) = &result {
            tracing::warn!("write failed: {err}");
        }
        if tx.send(AppEvent::Saved(result)).is_err() {
            tracing::debug!("app closed before write finished");
        }
    });
}

/// Short text for a view that could not load.
pub fn load_error(consumer: Consumer, err: &ClientError) -> String {
    format!("Couldn't load {}: {err}", consumer.label())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use api_types::transaction::{ItemNew, TransactionUpdate};
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{Method, StatusCode, Uri},
        routing::{delete, get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    type Calls = Arc<Mutex<Vec<String>>>;

    struct Server {
        calls: Calls,
        client: Client,
    }

    /// Serves transaction 9 with `items` and records every write.
    async fn serve(items: Value) -> Server {
        async fn record(
            State((calls, _)): State<(Calls, Value)>,
            method: Method,
            uri: Uri,
        ) -> StatusCode {
            calls.lock().unwrap().push(format!("{method} {}", uri.path()));
            StatusCode::OK
        }

        async fn current(
            Path(id): Path<i64>,
            State((_, items)): State<(Calls, Value)>,
        ) -> Json<Value> {
            Json(json!({
                "success": true,
                "data": {
                    "id": id,
                    "date": "2024-03-10 18:45:00",
                    "amount": 80.0,
                    "description": "Dinner",
                    "items": items
                }
            }))
        }

        let calls = Calls::default();
        let router = Router::new()
            .route("/api/transactions/{id}", get(current).put(record))
            .route("/api/transactions/{id}/items", post(record))
            .route("/api/transactions/{id}/items/{item_id}", delete(record))
            .with_state((calls.clone(), items));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = Client::new(&format!("http://{addr}")).unwrap();
        Server { calls, client }
    }

    fn edit(items: Option<Vec<ItemNew>>) -> TransactionEdit {
        TransactionEdit {
            id: 9,
            update: TransactionUpdate {
                description: "Dinner".to_string(),
                amount: 80.0,
                category: "Food".to_string(),
                date: "2024-03-10 18:45".to_string(),
                platform: "Manual".to_string(),
            },
            items,
        }
    }

    fn rice() -> Vec<ItemNew> {
        vec![ItemNew {
            name: "Rice".to_string(),
            quantity: 3,
            unit_price: 40.0,
        }]
    }

    #[tokio::test]
    async fn unchanged_items_only_update_the_transaction() {
        let server = serve(json!([{"name": "Rice", "quantity": 2, "unit_price": 40.0}])).await;
        let message = update(&server.client, edit(None)).await.unwrap();
        assert_eq!(message, "Saved \"Dinner\"");
        assert_eq!(*server.calls.lock().unwrap(), vec!["PUT /api/transactions/9"]);
    }

    #[tokio::test]
    async fn changed_items_replace_the_stored_ones() {
        let server = serve(json!([{"id": 31, "name": "Rice", "quantity": 2, "unit_price": 40.0}])).await;
        update(&server.client, edit(Some(rice()))).await.unwrap();
        assert_eq!(
            *server.calls.lock().unwrap(),
            vec![
                "PUT /api/transactions/9",
                "DELETE /api/transactions/9/items/31",
                "POST /api/transactions/9/items",
            ]
        );
    }

    #[tokio::test]
    async fn items_without_ids_block_the_rewrite() {
        let server = serve(json!([{"name": "Rice", "quantity": 2, "unit_price": 40.0}])).await;
        let result = update(&server.client, edit(Some(rice()))).await;
        assert!(matches!(result, Err(ClientError::Validation(message)) if message.contains("Rice")));
        assert!(server.calls.lock().unwrap().is_empty());
    }
}
