//! Schema builder operations against an in-memory SQLite database.

use quarry_core::{row, Connection, ConnectionConfig, SqlValue};
use quarry_schema::{Schema, SchemaPlan};

fn memory() -> Connection {
    Connection::new(ConnectionConfig::sqlite(":memory:"))
}

#[tokio::test]
async fn widgets_lifecycle() {
    let conn = memory();
    let schema = Schema::new(&conn);
    schema
        .create("widgets", |t| {
            t.increments("id");
            t.string("name", 255).nullable();
            t.string("label", 100).nullable();
        })
        .await
        .unwrap();

    conn.table("widgets")
        .insert(&row! { "name" => "a", "label" => "first" })
        .await
        .unwrap();
    assert_eq!(conn.table("widgets").count().await.unwrap(), 1);

    let updated = conn
        .table("widgets")
        .where_eq("id", 1)
        .update(&row! { "name" => "b" })
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let widget = conn.table("widgets").find(1).await.unwrap().unwrap();
    assert_eq!(widget["name"], SqlValue::Text("b".into()));

    conn.table("widgets")
        .where_eq("id", 1)
        .delete()
        .await
        .unwrap();
    assert_eq!(conn.table("widgets").count().await.unwrap(), 0);
}

#[tokio::test]
async fn introspection() {
    let conn = memory();
    let schema = Schema::new(&conn);
    assert!(!schema.has_table("users").await.unwrap());

    schema
        .create("users", |t| {
            t.id();
            t.string("email", 255).unique();
            t.timestamps();
        })
        .await
        .unwrap();

    assert!(schema.has_table("users").await.unwrap());
    assert_eq!(
        schema.column_listing("users").await.unwrap(),
        vec!["id", "email", "created_at", "updated_at"]
    );
    assert!(schema.has_column("users", "EMAIL").await.unwrap());
    assert!(schema
        .has_columns("users", &["id", "created_at"])
        .await
        .unwrap());
    assert!(!schema
        .has_columns("users", &["id", "deleted_at"])
        .await
        .unwrap());
}

#[tokio::test]
async fn alter_rename_and_drop() {
    let conn = memory();
    let schema = Schema::new(&conn);
    schema
        .create("posts", |t| {
            t.id();
            t.string("title", 200);
        })
        .await
        .unwrap();

    schema
        .table("posts", |t| {
            t.text("body").nullable();
            t.integer("votes").default(0);
        })
        .await
        .unwrap();
    assert!(schema.has_columns("posts", &["body", "votes"]).await.unwrap());

    schema
        .table("posts", |t| {
            t.rename_column("title", "headline");
        })
        .await
        .unwrap();
    assert!(schema.has_column("posts", "headline").await.unwrap());
    assert!(!schema.has_column("posts", "title").await.unwrap());

    schema.rename("posts", "articles").await.unwrap();
    assert!(!schema.has_table("posts").await.unwrap());
    assert!(schema.has_table("articles").await.unwrap());

    schema.drop("articles").await.unwrap();
    assert!(!schema.has_table("articles").await.unwrap());
    schema.drop_if_exists("articles").await.unwrap();
}

#[tokio::test]
async fn create_if_not_exists_keeps_existing_table() {
    let conn = memory();
    let schema = Schema::new(&conn);
    schema
        .create("tags", |t| {
            t.id();
            t.string("name", 50);
        })
        .await
        .unwrap();
    schema
        .create_if_not_exists("tags", |t| {
            t.id();
            t.string("slug", 50);
        })
        .await
        .unwrap();
    assert!(schema.has_column("tags", "name").await.unwrap());
    assert!(!schema.has_column("tags", "slug").await.unwrap());
}

#[tokio::test]
async fn run_plan_in_order() {
    let conn = memory();
    let schema = Schema::new(&conn);
    let mut plan = SchemaPlan::new();
    plan.create("teams", |t| {
        t.id();
        t.string("name", 100);
    })
    .create("players", |t| {
        t.id();
        t.foreign_id("team_id");
        t.foreign(&["team_id"]).on("teams").cascade_on_delete();
    })
    .raw("INSERT INTO teams (name) VALUES ('reds')");

    assert_eq!(schema.to_sql(&plan).len(), 3);
    schema.run(&plan).await.unwrap();

    assert!(schema.has_table("players").await.unwrap());
    assert_eq!(conn.table("teams").count().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_statement_stops_the_plan() {
    let conn = memory();
    let schema = Schema::new(&conn);
    let mut plan = SchemaPlan::new();
    plan.raw("CREATE TABLE a (id INTEGER)")
        .raw("CREATE TABLE a (id INTEGER)")
        .raw("CREATE TABLE b (id INTEGER)");

    let err = schema.run(&plan).await.unwrap_err();
    assert!(err.to_string().contains("CREATE TABLE a"));
    assert!(schema.has_table("a").await.unwrap());
    assert!(!schema.has_table("b").await.unwrap());
}

#[tokio::test]
async fn foreign_key_toggles_run() {
    let conn = memory();
    let schema = Schema::new(&conn);
    schema.disable_foreign_key_constraints().await.unwrap();
    schema.enable_foreign_key_constraints().await.unwrap();
}
