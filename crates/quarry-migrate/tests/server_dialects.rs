//! End-to-end runs against live PostgreSQL and MySQL servers.
//!
//! Each test reads a JSON connection configuration from its environment
//! variable and returns early when the variable is unset, e.g.
//!
//! ```text
//! QUARRY_TEST_PGSQL='{"driver":"pgsql","database":"quarry","username":"postgres","password":"secret"}'
//! QUARRY_TEST_MYSQL='{"driver":"mysql","database":"quarry","username":"root","password":"secret"}'
//! ```

use quarry_core::{row, Connection, ConnectionConfig, Error, SqlValue};
use quarry_migrate::prelude::*;
use quarry_orm::{Cast, Model};
use quarry_schema::Schema;
use serde_json::json;

const LEDGER: &str = "dialect_migrations";
const TABLES: &[&str] = &[
    "dialect_widgets",
    "dialect_flags",
    "dialect_articles",
    "dialect_posts",
    "dialect_users",
    LEDGER,
];

struct CreateUsers;

impl Migration for CreateUsers {
    fn name(&self) -> &str {
        "20240101000000_create_dialect_users"
    }

    fn up(&self, schema: &mut SchemaPlan) {
        schema.create("dialect_users", |t| {
            t.id();
            t.string("email", 255).unique();
            t.timestamps();
        });
    }

    fn down(&self, schema: &mut SchemaPlan) {
        schema.drop_if_exists("dialect_users");
    }
}

struct CreatePosts;

impl Migration for CreatePosts {
    fn name(&self) -> &str {
        "20240102000000_create_dialect_posts"
    }

    fn up(&self, schema: &mut SchemaPlan) {
        schema.create("dialect_posts", |t| {
            t.id();
            t.string("title", 200);
            t.boolean("published").default(false);
        });
    }

    fn down(&self, schema: &mut SchemaPlan) {
        schema.drop_if_exists("dialect_posts");
    }
}

struct Article;

impl Model for Article {
    const TABLE: &'static str = "dialect_articles";
    const FILLABLE: &'static [&'static str] = &["title", "meta"];
    const CASTS: &'static [(&'static str, Cast)] = &[
        ("meta", Cast::Json),
        ("created_at", Cast::DateTime),
        ("updated_at", Cast::DateTime),
    ];
}

fn server(var: &str) -> Option<Connection> {
    let json = std::env::var(var).ok().filter(|value| !value.is_empty())?;
    let config = ConnectionConfig::from_json(&json).unwrap();
    Some(Connection::new(config))
}

async fn reset(conn: &Connection) {
    let schema = Schema::new(conn);
    for table in TABLES {
        schema.drop_if_exists(table).await.unwrap();
    }
}

async fn widgets_lifecycle(conn: &Connection) {
    Schema::new(conn)
        .create("dialect_widgets", |t| {
            t.increments("id");
            t.string("name", 255);
        })
        .await
        .unwrap();

    conn.table("dialect_widgets")
        .insert(&row! { "name" => "a" })
        .await
        .unwrap();
    assert_eq!(conn.table("dialect_widgets").count().await.unwrap(), 1);

    let updated = conn
        .table("dialect_widgets")
        .where_eq("id", 1)
        .update(&row! { "name" => "b" })
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let widget = conn.table("dialect_widgets").find(1).await.unwrap().unwrap();
    assert_eq!(widget["id"], SqlValue::Int(1));
    assert_eq!(widget["name"], SqlValue::Text("b".into()));

    conn.table("dialect_widgets")
        .where_eq("id", 1)
        .delete()
        .await
        .unwrap();
    assert_eq!(conn.table("dialect_widgets").count().await.unwrap(), 0);

    let failed = conn
        .transaction(|conn| {
            Box::pin(async move {
                conn.table("dialect_widgets")
                    .insert(&row! { "name" => "c" })
                    .await?;
                conn.execute("INSERT INTO dialect_missing VALUES (1)", &[])
                    .await?;
                Ok::<_, Error>(())
            })
        })
        .await;
    assert!(failed.is_err());
    assert_eq!(conn.table("dialect_widgets").count().await.unwrap(), 0);
}

async fn migrate_and_roll_back(conn: &Connection) {
    let mut migrator = Migrator::new(conn).with_ledger_table(LEDGER);
    migrator
        .register(CreateUsers)
        .unwrap()
        .register(CreatePosts)
        .unwrap();

    assert_eq!(migrator.migrate().await.unwrap().len(), 2);
    assert!(migrator.migrate().await.unwrap().is_empty());
    assert_eq!(migrator.ledger().count().await.unwrap(), 2);

    let status = migrator.status().await.unwrap();
    assert!(status.iter().all(|entry| entry.applied));
    assert!(status.iter().all(|entry| entry.executed_at.is_some()));

    let schema = Schema::new(conn);
    assert_eq!(
        schema.column_listing("dialect_users").await.unwrap(),
        vec!["id", "email", "created_at", "updated_at"]
    );

    assert_eq!(
        migrator.rollback(1).await.unwrap(),
        vec![MigrationOutcome::RolledBack(
            "20240102000000_create_dialect_posts".into()
        )]
    );
    assert_eq!(
        migrator.ledger().applied().await.unwrap(),
        vec!["20240101000000_create_dialect_users"]
    );
    assert!(schema.has_table("dialect_users").await.unwrap());
    assert!(!schema.has_table("dialect_posts").await.unwrap());
}

async fn boolean_filters(conn: &Connection) {
    Schema::new(conn)
        .create("dialect_flags", |t| {
            t.increments("id");
            t.string("name", 50);
            t.boolean("active");
        })
        .await
        .unwrap();
    conn.table("dialect_flags")
        .insert_many(&[
            row! { "name" => "on", "active" => true },
            row! { "name" => "off", "active" => false },
        ])
        .await
        .unwrap();

    let active = conn
        .table("dialect_flags")
        .where_eq("active", true)
        .pluck("name")
        .await
        .unwrap();
    assert_eq!(active, vec![SqlValue::Text("on".into())]);
    assert_eq!(
        conn.table("dialect_flags")
            .where_eq("active", false)
            .count()
            .await
            .unwrap(),
        1
    );
}

async fn typed_model_values(conn: &Connection) {
    Schema::new(conn)
        .create("dialect_articles", |t| {
            t.increments("id");
            t.string("title", 255);
            t.json("meta").nullable();
            t.timestamps();
        })
        .await
        .unwrap();

    let created = Article::create(
        conn,
        row! { "title" => "Hello", "meta" => json!({"tags": ["rust"]}) },
    )
    .await
    .unwrap();
    assert_eq!(created.key(), Some(&SqlValue::Int(1)));

    let mut article = Article::find_or_fail(conn, 1).await.unwrap();
    assert!(matches!(
        article.get("created_at").unwrap(),
        SqlValue::DateTime(_)
    ));
    assert_eq!(
        article.get("meta").unwrap(),
        SqlValue::Json(json!({"tags": ["rust"]}))
    );

    article.set("title", "Renamed").unwrap();
    assert!(article.save(conn).await.unwrap());
    let reloaded = Article::find_or_fail(conn, 1).await.unwrap();
    assert_eq!(reloaded.get("title").unwrap(), SqlValue::Text("Renamed".into()));
}

async fn run_all(conn: &Connection) {
    reset(conn).await;
    widgets_lifecycle(conn).await;
    migrate_and_roll_back(conn).await;
    boolean_filters(conn).await;
    typed_model_values(conn).await;
    reset(conn).await;
}

#[tokio::test]
async fn postgres_end_to_end() {
    let Some(conn) = server("QUARRY_TEST_PGSQL") else {
        return;
    };
    run_all(&conn).await;
}

#[tokio::test]
async fn mysql_end_to_end() {
    let Some(conn) = server("QUARRY_TEST_MYSQL") else {
        return;
    };
    run_all(&conn).await;
}
