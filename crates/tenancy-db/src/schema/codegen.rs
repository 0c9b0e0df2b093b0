//! PostgreSQL DDL generation.
//!
//! Every statement is idempotent (`IF NOT EXISTS`, or a `DO` block that
//! swallows `duplicate_object`) so a script can be replayed against a
//! database that already has part of the schema.

use super::{Column, ForeignKey, Index, Schema, Table};

/// Separator between statements in generated migration files.
pub const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// All statements needed to create `schema`: tables first, then foreign
/// keys, then indexes.
pub fn schema_statements(schema: &Schema) -> Vec<String> {
    let mut statements: Vec<String> = schema.tables.iter().map(create_table_sql).collect();

    for table in &schema.tables {
        for fk in &table.foreign_keys {
            statements.push(foreign_key_sql(table, fk));
        }
    }

    for table in &schema.tables {
        for index in &table.indexes {
            statements.push(create_index_sql(table, index));
        }
    }

    statements
}

/// Generate a complete migration script for `schema`.
pub fn schema_to_sql(schema: &Schema) -> String {
    let separator = format!("\n{STATEMENT_BREAKPOINT}\n");
    let mut sql = schema_statements(schema).join(separator.as_str());
    sql.push('\n');
    sql
}

/// `CREATE TABLE` without foreign keys; those are added afterwards so
/// creation order never matters.
pub fn create_table_sql(table: &Table) -> String {
    let columns: Vec<String> = table.columns.iter().map(column_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n\t{}\n);",
        quote_ident(&table.name),
        columns.join(",\n\t")
    )
}

fn column_sql(column: &Column) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.column_type);
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if let Some(default) = &column.default {
        def.push_str(&format!(" DEFAULT {default}"));
    }
    if !column.is_nullable() {
        def.push_str(" NOT NULL");
    }
    def
}

pub fn foreign_key_sql(table: &Table, fk: &ForeignKey) -> String {
    format!(
        "DO $$ BEGIN\n ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES \"public\".{}({}) ON DELETE {} ON UPDATE {};\nEXCEPTION\n WHEN duplicate_object THEN null;\nEND $$;",
        quote_ident(&table.name),
        quote_ident(&fk.constraint_name(&table.name)),
        quote_ident(&fk.column),
        quote_ident(&fk.references_table),
        quote_ident(&fk.references_column),
        fk.on_delete.to_sql(),
        fk.on_update.to_sql(),
    )
}

pub fn create_index_sql(table: &Table, index: &Index) -> String {
    let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} USING btree ({});",
        if index.unique { "UNIQUE " } else { "" },
        quote_ident(&index.name),
        quote_ident(&table.name),
        columns.join(",")
    )
}
