use std::sync::Arc;

use chrono::{Duration, Utc};
use medpos_core::idempotency::InMemoryIdempotencyStore;
use medpos_core::{
    Actor, CoreError, CreateSaleRequest, CreditStatus, InventoryItem, MovementType, PaymentMethod,
    SaleLineRequest, ValidationError,
};
use medpos_db::repository::inventory;
use medpos_db::{Database, DbConfig, DbError};
use uuid::Uuid;

use super::void::VOID_REASON;
use super::SaleEngine;
use crate::error::EngineError;

// =============================================================================
// Fixtures
// =============================================================================

async fn setup() -> (SaleEngine, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let engine = SaleEngine::new(db.clone(), Arc::new(InMemoryIdempotencyStore::default()));
    (engine, db)
}

fn cashier() -> Actor {
    Actor {
        id: "user-1".to_string(),
        name: "Akosua".to_string(),
        role: "cashier".to_string(),
    }
}

async fn add_item(db: &Database, id: &str, price: i64, cost: i64, stock: i64, units: Option<&str>) {
    let mut conn = db.connection().await.unwrap();
    inventory::insert(
        &mut conn,
        &InventoryItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            unit_price_cents: price,
            cost_price_cents: cost,
            stock_quantity: stock,
            unit_conversions: units.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
    )
    .await
    .unwrap();
}

fn line(item_id: &str, quantity: i64) -> SaleLineRequest {
    SaleLineRequest {
        item_id: item_id.to_string(),
        quantity,
        unit_type: None,
        unit_label: None,
        unit_price_cents: None,
    }
}

/// Cash sale with a fresh idempotency key so repeated calls never collide.
fn request(items: Vec<SaleLineRequest>) -> CreateSaleRequest {
    CreateSaleRequest {
        items,
        idempotency_key: Some(Uuid::new_v4().to_string()),
        ..Default::default()
    }
}

fn credit_request(items: Vec<SaleLineRequest>) -> CreateSaleRequest {
    CreateSaleRequest {
        payment_method: Some("credit".to_string()),
        customer_name: Some("Kwame Asante".to_string()),
        customer_phone: Some("0244123456".to_string()),
        ..request(items)
    }
}

async fn stock_of(db: &Database, id: &str) -> i64 {
    let mut conn = db.connection().await.unwrap();
    inventory::current_stock(&mut conn, id).await.unwrap().unwrap()
}

async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    stock: Vec<(String, i64)>,
    sales: i64,
    sale_items: i64,
    movements: i64,
    receivables: i64,
}

async fn snapshot(db: &Database) -> Snapshot {
    let stock = sqlx::query_as::<_, (String, i64)>(
        "SELECT id, stock_quantity FROM inventory_items ORDER BY id",
    )
    .fetch_all(db.pool())
    .await
    .unwrap();

    Snapshot {
        stock,
        sales: count(db, "sales").await,
        sale_items: count(db, "sale_items").await,
        movements: count(db, "stock_movements").await,
        receivables: count(db, "credit_receivables").await,
    }
}

async fn inject_failure(db: &Database, event: &str, table: &str) {
    let sql = format!(
        "CREATE TRIGGER inject_{table} BEFORE {event} ON {table} \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
    );
    sqlx::query(&sql).execute(db.pool()).await.unwrap();
}

// =============================================================================
// create_sale
// =============================================================================

#[tokio::test]
async fn test_end_to_end_cash_sale() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let receipt = engine.create_sale(&cashier(), &request(vec![line("A", 5)])).await.unwrap();

    assert_eq!(receipt.final_amount_cents, 100);
    assert_eq!(receipt.final_profit_cents, 40);
    assert_eq!(receipt.payment_method, PaymentMethod::Cash);
    assert_eq!(receipt.cashier.id, "user-1");
    assert!(receipt.receivable_id.is_none());
    assert_eq!(stock_of(&db, "A").await, 45);

    let movements = engine.movements_for_reference(&receipt.sale_id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Sale);
    assert_eq!(movements[0].quantity, 5);
    assert_eq!((movements[0].previous_stock, movements[0].new_stock), (50, 45));
    assert_eq!(movements[0].actor_role, "cashier");
}

#[tokio::test]
async fn test_profit_arithmetic_with_discount() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 100, 60, 10, None).await;

    let mut req = request(vec![line("A", 2)]);
    req.discount_cents = Some(20);
    let receipt = engine.create_sale(&cashier(), &req).await.unwrap();

    assert_eq!(receipt.subtotal_cents, 200);
    assert_eq!(receipt.total_profit_cents, 80);
    assert_eq!(receipt.discount_cents, 20);
    assert_eq!(receipt.final_amount_cents, 180);
    assert_eq!(receipt.final_profit_cents, 60);
}

#[tokio::test]
async fn test_transaction_code_format() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let receipt = engine.create_sale(&cashier(), &request(vec![line("A", 1)])).await.unwrap();
    let parts: Vec<&str> = receipt.transaction_code.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "TRX");
    assert_eq!(parts[1], Utc::now().format("%Y%m%d").to_string());
    assert_eq!(parts[2].len(), 6);
}

#[tokio::test]
async fn test_box_unit_deducts_base_units() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 50, 30, 100, Some(r#"[{"type":"box","quantity":10}]"#)).await;

    let mut l = line("A", 3);
    l.unit_type = Some("box".to_string());
    let receipt = engine.create_sale(&cashier(), &request(vec![l])).await.unwrap();

    assert_eq!(stock_of(&db, "A").await, 70);
    assert_eq!(receipt.items[0].quantity, 3);
    assert_eq!(receipt.items[0].base_quantity, 30);
    assert_eq!(receipt.items[0].unit_price_cents, 500);
    assert_eq!(receipt.subtotal_cents, 1500);
    assert_eq!(receipt.total_profit_cents, 1500 - 30 * 30);
}

#[tokio::test]
async fn test_malformed_unit_table_falls_back_to_requested_quantity() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 50, 30, 100, Some("{not json")).await;

    let mut l = line("A", 3);
    l.unit_type = Some("box".to_string());
    engine.create_sale(&cashier(), &request(vec![l])).await.unwrap();

    assert_eq!(stock_of(&db, "A").await, 97);
}

#[tokio::test]
async fn test_credit_without_phone_rejected_before_mutation() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;
    let before = snapshot(&db).await;

    let mut req = credit_request(vec![line("A", 5)]);
    req.customer_phone = None;
    let err = engine.create_sale(&cashier(), &req).await.unwrap_err();

    assert!(matches!(err, EngineError::Core(CoreError::MissingCreditCustomer)));
    assert_eq!(snapshot(&db).await, before);
}

#[tokio::test]
async fn test_credit_sale_issues_receivable() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let mut req = credit_request(vec![line("A", 5)]);
    req.discount_cents = Some(10);
    let receipt = engine.create_sale(&cashier(), &req).await.unwrap();

    let receivable = engine.receivable_for_sale(&receipt.sale_id).await.unwrap().unwrap();
    assert_eq!(Some(receivable.id.clone()), receipt.receivable_id);
    assert_eq!(receivable.total_cents, 90);
    assert_eq!(receivable.paid_cents, 0);
    assert_eq!(receivable.balance_cents, 90);
    assert_eq!(receivable.status, CreditStatus::Pending);
    assert_eq!(receivable.customer_phone, "0244123456");
    assert_eq!(
        receivable.due_date,
        (receipt.created_at + Duration::days(30)).date_naive()
    );
}

#[tokio::test]
async fn test_credit_sale_honours_due_date() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let due = (Utc::now() + Duration::days(7)).date_naive();
    let mut req = credit_request(vec![line("A", 1)]);
    req.due_date = Some(due);
    let receipt = engine.create_sale(&cashier(), &req).await.unwrap();

    let receivable = engine.receivable_for_sale(&receipt.sale_id).await.unwrap().unwrap();
    assert_eq!(receivable.due_date, due);
}

#[tokio::test]
async fn test_fully_discounted_credit_sale_is_settled() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let mut req = credit_request(vec![line("A", 5)]);
    req.discount_cents = Some(100);
    let receipt = engine.create_sale(&cashier(), &req).await.unwrap();
    assert_eq!(receipt.final_amount_cents, 0);

    let receivable = engine.receivable_for_sale(&receipt.sale_id).await.unwrap().unwrap();
    assert_eq!(receivable.total_cents, 0);
    assert_eq!(receivable.balance_cents, 0);
    assert_eq!(receivable.status, CreditStatus::Paid);
}

#[tokio::test]
async fn test_price_overflow_is_rejected_before_mutation() {
    let (engine, db) = setup().await;
    add_item(&db, "A", i64::MAX / 4, 1, 50, Some(r#"[{"type":"box","quantity":10}]"#)).await;
    let before = snapshot(&db).await;

    let mut boxed = line("A", 1);
    boxed.unit_type = Some("box".to_string());
    let err = engine.create_sale(&cashier(), &request(vec![boxed])).await.unwrap_err();

    assert!(
        matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::AmountOverflow { ref field }))
                if field == "unit_price"
        ),
        "{err:?}"
    );
    assert_eq!(snapshot(&db).await, before);

    let mut priced = line("A", 1);
    priced.unit_price_cents = Some(i64::MAX);
    let err = engine.create_sale(&cashier(), &request(vec![priced])).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
    ));
    assert_eq!(snapshot(&db).await, before);
}

#[tokio::test]
async fn test_duplicate_key_yields_one_sale() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let mut req = request(vec![line("A", 1)]);
    req.idempotency_key = Some("till-3-0001".to_string());

    engine.create_sale(&cashier(), &req).await.unwrap();
    let err = engine.create_sale(&cashier(), &req).await.unwrap_err();

    assert!(matches!(err, EngineError::Core(CoreError::DuplicateRequest { .. })));
    assert_eq!(count(&db, "sales").await, 1);
    assert_eq!(stock_of(&db, "A").await, 49);
}

#[tokio::test]
async fn test_fallback_key_rejects_identical_resubmission() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let req = CreateSaleRequest {
        items: vec![line("A", 1)],
        ..Default::default()
    };

    // Both calls land in the same second unless the clock ticks between them
    let first = engine.create_sale(&cashier(), &req).await;
    let second = engine.create_sale(&cashier(), &req).await;

    assert!(first.is_ok());
    if let Err(err) = second {
        assert!(matches!(err, EngineError::Core(CoreError::DuplicateRequest { .. })));
        assert_eq!(count(&db, "sales").await, 1);
    }
}

#[tokio::test]
async fn test_key_stays_registered_after_failure() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 3, None).await;

    let mut req = request(vec![line("A", 5)]);
    req.idempotency_key = Some("retry-me".to_string());

    let first = engine.create_sale(&cashier(), &req).await.unwrap_err();
    assert!(matches!(first, EngineError::Core(CoreError::InsufficientStock { .. })));

    let retry = engine.create_sale(&cashier(), &req).await.unwrap_err();
    assert!(matches!(retry, EngineError::Core(CoreError::DuplicateRequest { .. })));
}

#[tokio::test]
async fn test_insufficient_stock_does_not_mutate() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 3, None).await;
    add_item(&db, "B", 20, 12, 100, None).await;
    let before = snapshot(&db).await;

    let err = engine
        .create_sale(&cashier(), &request(vec![line("B", 1), line("A", 5)]))
        .await
        .unwrap_err();

    match err {
        EngineError::Core(CoreError::InsufficientStock {
            item_name,
            available,
            needed,
        }) => {
            assert_eq!(item_name, "Item A");
            assert_eq!(available, 3);
            assert_eq!(needed, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(snapshot(&db).await, before);
}

#[tokio::test]
async fn test_repeated_item_lines_share_stock() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 5, None).await;

    let err = engine
        .create_sale(&cashier(), &request(vec![line("A", 3), line("A", 3)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { needed: 6, .. })
    ));
    assert_eq!(stock_of(&db, "A").await, 5);
}

#[tokio::test]
async fn test_unknown_item_rolls_back() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;
    let before = snapshot(&db).await;

    let err = engine
        .create_sale(&cashier(), &request(vec![line("A", 1), line("ghost", 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Core(CoreError::ItemNotFound(ref id)) if id == "ghost"));
    assert_eq!(snapshot(&db).await, before);
}

#[tokio::test]
async fn test_empty_sale_rejected() {
    let (engine, _db) = setup().await;
    let err = engine.create_sale(&cashier(), &request(vec![])).await.unwrap_err();
    assert_eq!(err.to_string(), "Sale must contain at least one item");
}

#[tokio::test]
async fn test_failure_at_each_write_step_leaves_no_trace() {
    let steps = [
        ("INSERT", "sales"),
        ("INSERT", "sale_items"),
        ("UPDATE", "inventory_items"),
        ("INSERT", "stock_movements"),
        ("INSERT", "credit_receivables"),
    ];

    for (event, table) in steps {
        let (engine, db) = setup().await;
        add_item(&db, "A", 20, 12, 50, None).await;
        add_item(&db, "B", 35, 20, 40, None).await;
        inject_failure(&db, event, table).await;
        let before = snapshot(&db).await;

        let err = engine
            .create_sale(&cashier(), &credit_request(vec![line("A", 2), line("B", 4)]))
            .await
            .unwrap_err();

        assert!(
            matches!(err, EngineError::Db(DbError::TriggerAbort(ref msg)) if msg == "injected failure"),
            "step {event} {table}: {err:?}"
        );
        assert_eq!(snapshot(&db).await, before, "step {event} {table}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_never_oversell() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 10, None).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.create_sale(&cashier(), &request(vec![line("A", 3)])).await })
        })
        .collect();

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 3,
            Err(EngineError::Core(CoreError::InsufficientStock { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let remaining = stock_of(&db, "A").await;
    assert!(remaining >= 0);
    assert_eq!(sold, 9);
    assert_eq!(remaining, 10 - sold);
    assert_eq!(count(&db, "stock_movements").await, 3);
}

/// File-backed database with a real connection pool, removed on drop.
struct FileDb {
    path: std::path::PathBuf,
}

impl FileDb {
    async fn open() -> (Self, SaleEngine, Database) {
        let path = std::env::temp_dir().join(format!("medpos-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8)).await.unwrap();
        let engine = SaleEngine::new(db.clone(), Arc::new(InMemoryIdempotencyStore::default()));
        (FileDb { path }, engine, db)
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_sales_on_file_database_all_commit() {
    let (_file, engine, db) = FileDb::open().await;
    add_item(&db, "A", 20, 12, 1000, None).await;
    add_item(&db, "B", 35, 20, 1000, None).await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = engine.clone();
            let item = if i % 2 == 0 { "A" } else { "B" };
            tokio::spawn(async move { engine.create_sale(&cashier(), &request(vec![line(item, 1)])).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(stock_of(&db, "A").await, 992);
    assert_eq!(stock_of(&db, "B").await, 992);
    assert_eq!(count(&db, "sales").await, 16);
    assert_eq!(count(&db, "stock_movements").await, 16);
    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_database_never_oversells() {
    let (_file, engine, db) = FileDb::open().await;
    add_item(&db, "A", 20, 12, 10, None).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.create_sale(&cashier(), &request(vec![line("A", 3)])).await })
        })
        .collect();

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 3,
            Err(EngineError::Core(CoreError::InsufficientStock { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(sold, 9);
    assert_eq!(stock_of(&db, "A").await, 1);
    assert_eq!(count(&db, "stock_movements").await, 3);
    db.close().await;
}

// =============================================================================
// void_sale
// =============================================================================

#[tokio::test]
async fn test_void_restores_stock_and_rewrites_ledger() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;
    add_item(&db, "B", 50, 30, 100, Some(r#"[{"type":"box","quantity":10}]"#)).await;

    let mut boxed = line("B", 2);
    boxed.unit_type = Some("BOX".to_string());
    let receipt = engine
        .create_sale(&cashier(), &request(vec![line("A", 5), boxed]))
        .await
        .unwrap();
    assert_eq!(stock_of(&db, "B").await, 80);

    let voided = engine.void_sale(&cashier(), &receipt.sale_id).await.unwrap();
    assert_eq!(voided.adjustments.len(), 2);
    assert_eq!(voided.removed_sale_movements, 2);
    assert!(!voided.receivable_removed);

    assert_eq!(stock_of(&db, "A").await, 50);
    assert_eq!(stock_of(&db, "B").await, 100);

    let movements = engine.movements_for_reference(&receipt.sale_id).await.unwrap();
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.movement_type == MovementType::Adjustment));
    assert!(movements.iter().all(|m| m.reason.as_deref() == Some(VOID_REASON)));

    assert!(matches!(
        engine.get_sale(&receipt.sale_id).await.unwrap_err(),
        EngineError::Core(CoreError::SaleNotFound(_))
    ));
    assert_eq!(count(&db, "sale_items").await, 0);
}

#[tokio::test]
async fn test_void_reads_fresh_stock() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let first = engine.create_sale(&cashier(), &request(vec![line("A", 5)])).await.unwrap();
    engine.create_sale(&cashier(), &request(vec![line("A", 10)])).await.unwrap();

    let voided = engine.void_sale(&cashier(), &first.sale_id).await.unwrap();
    let adj = &voided.adjustments[0];
    assert_eq!((adj.previous_stock, adj.new_stock), (35, 40));
    assert_eq!(adj.quantity, 5);
    assert_eq!(stock_of(&db, "A").await, 40);
}

#[tokio::test]
async fn test_void_credit_sale_removes_receivable_and_payments() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let receipt = engine.create_sale(&cashier(), &credit_request(vec![line("A", 5)])).await.unwrap();
    let receivable_id = receipt.receivable_id.clone().unwrap();
    engine
        .record_receivable_payment(&cashier(), &receivable_id, 40)
        .await
        .unwrap();

    let voided = engine.void_sale(&cashier(), &receipt.sale_id).await.unwrap();
    assert!(voided.receivable_removed);
    assert_eq!(count(&db, "credit_receivables").await, 0);
    assert_eq!(count(&db, "receivable_payments").await, 0);
}

#[tokio::test]
async fn test_void_unknown_sale() {
    let (engine, _db) = setup().await;
    let err = engine.void_sale(&cashier(), "nope").await.unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::SaleNotFound(_))));
}

#[tokio::test]
async fn test_void_is_atomic() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;
    let receipt = engine.create_sale(&cashier(), &request(vec![line("A", 5)])).await.unwrap();

    inject_failure(&db, "INSERT", "stock_movements").await;
    let before = snapshot(&db).await;

    assert!(engine.void_sale(&cashier(), &receipt.sale_id).await.is_err());
    assert_eq!(snapshot(&db).await, before);
    assert!(engine.get_sale(&receipt.sale_id).await.is_ok());
}

// =============================================================================
// Receivables and reads
// =============================================================================

#[tokio::test]
async fn test_receivable_payment_lifecycle() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;
    let receipt = engine.create_sale(&cashier(), &credit_request(vec![line("A", 5)])).await.unwrap();
    let id = receipt.receivable_id.unwrap();

    let partial = engine.record_receivable_payment(&cashier(), &id, 30).await.unwrap();
    assert_eq!((partial.paid_cents, partial.balance_cents), (30, 70));
    assert_eq!(partial.status, CreditStatus::Partial);

    let err = engine.record_receivable_payment(&cashier(), &id, 71).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::Overpayment { amount: 71, balance: 70 })
    ));

    let paid = engine.record_receivable_payment(&cashier(), &id, 70).await.unwrap();
    assert_eq!(paid.balance_cents, 0);
    assert_eq!(paid.status, CreditStatus::Paid);

    let err = engine.record_receivable_payment(&cashier(), &id, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::ReceivableSettled(_))));

    assert_eq!(engine.receivable_payments(&id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_receivable_payment_validation() {
    let (engine, _db) = setup().await;
    assert!(matches!(
        engine.record_receivable_payment(&cashier(), "r", 0).await.unwrap_err(),
        EngineError::Core(CoreError::Validation(_))
    ));
    assert!(matches!(
        engine.record_receivable_payment(&cashier(), "missing", 10).await.unwrap_err(),
        EngineError::Core(CoreError::ReceivableNotFound(_))
    ));
}

#[tokio::test]
async fn test_get_sale_and_recent_list() {
    let (engine, db) = setup().await;
    add_item(&db, "A", 20, 12, 50, None).await;

    let receipt = engine.create_sale(&cashier(), &request(vec![line("A", 2)])).await.unwrap();
    let loaded = engine.get_sale(&receipt.sale_id).await.unwrap();
    assert_eq!(loaded.transaction_code, receipt.transaction_code);
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.total_profit_cents, receipt.total_profit_cents);

    engine.create_sale(&cashier(), &request(vec![line("A", 1)])).await.unwrap();
    assert_eq!(engine.list_recent_sales(None).await.unwrap().len(), 2);
    assert_eq!(engine.list_recent_sales(Some(1)).await.unwrap().len(), 1);

    let movements = engine.movements_for_item("A").await.unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[1].new_stock, 47);
}
