//! Query builder terminal operations against an in-memory SQLite database.

use quarry_core::{row, Connection, ConnectionConfig, Operator, OrderDirection, SqlValue};

async fn products() -> Connection {
    let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
    conn.unprepared(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            category TEXT NULL
        )",
    )
    .await
    .unwrap();
    conn.table("products")
        .insert_many(&[
            row! { "name" => "hammer", "price" => 12, "category" => "tools" },
            row! { "name" => "saw", "price" => 20, "category" => "tools" },
            row! { "name" => "glue", "price" => 4, "category" => None::<&str> },
        ])
        .await
        .unwrap();
    conn
}

#[tokio::test]
async fn insert_get_id_then_find_round_trips() {
    let conn = products().await;
    let id = conn
        .table("products")
        .insert_get_id(&row! { "name" => "drill", "price" => 80, "category" => "power" })
        .await
        .unwrap();
    assert_eq!(id, 4);

    let found = conn.table("products").find(id).await.unwrap().unwrap();
    assert_eq!(found["id"], SqlValue::Int(4));
    assert_eq!(found["name"], SqlValue::Text("drill".into()));
    assert_eq!(found["price"], SqlValue::Int(80));
    assert_eq!(found["category"], SqlValue::Text("power".into()));
}

#[tokio::test]
async fn get_first_and_pluck() {
    let conn = products().await;
    let tools = conn
        .table("products")
        .where_eq("category", "tools")
        .order_by("price", OrderDirection::Asc)
        .get()
        .await
        .unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], SqlValue::Text("hammer".into()));

    let cheapest = conn
        .table("products")
        .order_by("price", OrderDirection::Asc)
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cheapest["name"], SqlValue::Text("glue".into()));

    let names = conn
        .table("products")
        .where_op("price", Operator::Gte, 12)
        .order_by_desc("price")
        .pluck("name")
        .await
        .unwrap();
    assert_eq!(
        names,
        vec![SqlValue::Text("saw".into()), SqlValue::Text("hammer".into())]
    );
}

#[tokio::test]
async fn first_returns_none_without_match() {
    let conn = products().await;
    let missing = conn.table("products").find(99).await.unwrap();
    assert!(missing.is_none());
    assert!(!conn
        .table("products")
        .where_eq("name", "anvil")
        .exists()
        .await
        .unwrap());
}

#[tokio::test]
async fn aggregates() {
    let conn = products().await;
    let query = conn.table("products");
    assert_eq!(query.count().await.unwrap(), 3);
    assert_eq!(query.sum("price").await.unwrap(), Some(36.0));
    assert_eq!(query.avg("price").await.unwrap(), Some(12.0));
    assert_eq!(query.min("price").await.unwrap(), SqlValue::Int(4));
    assert_eq!(query.max("price").await.unwrap(), SqlValue::Int(20));
    assert_eq!(query.count_distinct("category").await.unwrap(), 1);

    let none = conn.table("products").where_eq("category", "food");
    assert_eq!(none.count().await.unwrap(), 0);
    assert_eq!(none.sum("price").await.unwrap(), None);
}

#[tokio::test]
async fn null_and_in_filters() {
    let conn = products().await;
    assert_eq!(
        conn.table("products")
            .where_null("category")
            .count()
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        conn.table("products")
            .where_in("name", ["saw", "glue"])
            .count()
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        conn.table("products")
            .where_in("name", Vec::<String>::new())
            .count()
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        conn.table("products")
            .where_between("price", 5, 15)
            .or_where_null("category")
            .count()
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn group_by_having() {
    let conn = products().await;
    let rows = conn
        .table("products")
        .select(&["category", "COUNT(*) AS total"])
        .where_not_null("category")
        .group_by(&["category"])
        .having("COUNT(*)", Operator::Gt, 1)
        .get()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["category"], SqlValue::Text("tools".into()));
    assert_eq!(rows[0]["total"], SqlValue::Int(2));
}

#[tokio::test]
async fn update_delete_truncate() {
    let conn = products().await;
    let updated = conn
        .table("products")
        .where_eq("category", "tools")
        .update(&row! { "price" => 1 })
        .await
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(conn.table("products").sum("price").await.unwrap(), Some(6.0));

    let deleted = conn
        .table("products")
        .where_eq("name", "glue")
        .delete()
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(conn.table("products").count().await.unwrap(), 2);

    conn.table("products").truncate().await.unwrap();
    assert_eq!(conn.table("products").count().await.unwrap(), 0);
}

#[tokio::test]
async fn empty_insert_is_a_no_op() {
    let conn = products().await;
    conn.enable_query_log().await;
    assert_eq!(conn.table("products").insert(&row! {}).await.unwrap(), 0);
    assert!(conn.query_log().await.is_empty());
}

#[tokio::test]
async fn insert_many_keeps_columns_missing_from_the_first_row() {
    let conn = products().await;
    let inserted = conn
        .table("products")
        .insert_many(&[
            row! { "name" => "tape", "price" => 3 },
            row! { "name" => "clamp", "price" => 9, "category" => "tools" },
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let tape = conn.table("products").where_eq("name", "tape").first().await.unwrap().unwrap();
    assert_eq!(tape["category"], SqlValue::Null);
    let clamp = conn.table("products").where_eq("name", "clamp").first().await.unwrap().unwrap();
    assert_eq!(clamp["category"], SqlValue::Text("tools".into()));
}
