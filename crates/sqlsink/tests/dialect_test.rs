//! Tests for sqlsink dialect module

use sqlsink::dialect::STRING_COLUMN_LENGTH;
use sqlsink::prelude::*;
use sqlsink::testing::MockDataSource;

// ==================== Product Name Resolution ====================

#[test]
fn test_product_name_prefixes() {
    let cases = [
        ("PostgreSQL", Dialect::Postgres),
        ("POSTGRESQL", Dialect::Postgres),
        ("DB2", Dialect::Db2),
        ("DB2/LINUXX8664", Dialect::Db2),
        ("db2/nt64", Dialect::Db2),
        ("MySQL", Dialect::MySql),
        ("MariaDB", Dialect::MySql),
        ("Microsoft SQL Server", Dialect::SqlServer),
    ];

    for (product, expected) in cases {
        assert_eq!(
            Dialect::from_product_name(product).unwrap(),
            expected,
            "product name {product}"
        );
    }
}

#[test]
fn test_unknown_product_is_unsupported() {
    for product in ["Oracle", "SQLite", "Informix Dynamic Server", ""] {
        let err = Dialect::from_product_name(product).unwrap_err();
        match err {
            Error::UnsupportedDialect {
                product_name,
                table,
            } => {
                assert_eq!(product_name, product);
                assert_eq!(table, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_resolve_from_connection() {
    let ds = MockDataSource::new("DB2/LINUXX8664");
    let conn = ds.get_connection().await.unwrap();

    assert_eq!(Dialect::resolve(&*conn).await.unwrap(), Dialect::Db2);

    ds.set_product_name("Sybase");
    assert!(Dialect::resolve(&*conn).await.is_err());
}

// ==================== Column Types ====================

#[test]
fn test_core_types_shared_by_all_dialects() {
    for dialect in Dialect::ALL {
        assert_eq!(dialect.column_type(FieldType::Int32), "INTEGER");
        assert_eq!(dialect.column_type(FieldType::Int64), "BIGINT");
        assert_eq!(
            dialect.column_type(FieldType::String),
            format!("VARCHAR({})", STRING_COLUMN_LENGTH)
        );
    }
}

#[test]
fn test_boolean_column_type() {
    assert_eq!(Dialect::Postgres.column_type(FieldType::Boolean), "BOOLEAN");
    assert_eq!(Dialect::Db2.column_type(FieldType::Boolean), "BOOLEAN");
    assert_eq!(Dialect::MySql.column_type(FieldType::Boolean), "BOOLEAN");
    assert_eq!(Dialect::SqlServer.column_type(FieldType::Boolean), "BIT");
}

#[test]
fn test_extended_column_types() {
    let decimal = FieldType::Decimal {
        precision: 10,
        scale: 2,
    };
    assert_eq!(Dialect::Postgres.column_type(decimal), "NUMERIC(10,2)");
    assert_eq!(Dialect::Db2.column_type(decimal), "DECIMAL(10,2)");

    assert_eq!(Dialect::Postgres.column_type(FieldType::Bytes), "BYTEA");
    assert_eq!(
        Dialect::SqlServer.column_type(FieldType::Bytes),
        "VARBINARY(MAX)"
    );
    assert_eq!(
        Dialect::Postgres.column_type(FieldType::Float64),
        "DOUBLE PRECISION"
    );
    assert_eq!(
        Dialect::SqlServer.column_type(FieldType::Timestamp),
        "DATETIME2"
    );
    assert_eq!(Dialect::Db2.column_type(FieldType::Date), "DATE");
}

// ==================== Surrogate Key ====================

#[test]
fn test_id_column_definitions() {
    assert_eq!(
        Dialect::Postgres.id_column_definition(),
        "id SERIAL PRIMARY KEY"
    );
    assert_eq!(
        Dialect::Db2.id_column_definition(),
        "id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"
    );
    for dialect in Dialect::ALL {
        assert!(dialect.id_column_definition().starts_with("id "));
        assert!(dialect.id_column_definition().ends_with("PRIMARY KEY"));
    }
}

#[test]
fn test_display() {
    assert_eq!(Dialect::Postgres.to_string(), "PostgreSQL");
    assert_eq!(Dialect::SqlServer.to_string(), "SQL Server");
}
