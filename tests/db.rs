use diesel::prelude::*;

use stockroom::schema::products;

mod common;

#[test]
fn migrations_produce_an_empty_products_table() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.conn();

    let count: i64 = products::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 0);
}
