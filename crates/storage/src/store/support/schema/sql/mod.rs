#![forbid(unsafe_code)]

mod core;
mod indexes;
mod records;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(records::SQL);
    sql.push_str(indexes::SQL);
    sql
}
