use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::{ProductId, SizeLabel};
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductColor, ProductSize,
};
use crate::repository::{
    DieselRepository, ProductFilter, ProductListQuery, ProductReader, ProductWriter,
    RepositoryError, RepositoryResult, Visibility,
};

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::{product_colors, product_sizes, products};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

            items = match query.visibility {
                Visibility::Active => items.filter(products::is_deleted.eq(false)),
                Visibility::Trashed => items.filter(products::is_deleted.eq(true)),
            };

            for clause in query.clauses() {
                items = match clause {
                    // SQLite LIKE is case-insensitive for ASCII.
                    ProductFilter::NameContains(needle) => {
                        items.filter(products::name.like(format!("%{needle}%")))
                    }
                    ProductFilter::SizeAny(sizes) => items.filter(
                        products::id.eq_any(
                            product_sizes::table
                                .filter(product_sizes::size.eq_any(
                                    sizes.into_iter().map(SizeLabel::into_inner).collect::<Vec<_>>(),
                                ))
                                .select(product_sizes::product_id),
                        ),
                    ),
                    ProductFilter::ColorAny(colors) => items.filter(
                        products::id.eq_any(
                            product_colors::table
                                .filter(product_colors::color.eq_any(
                                    colors
                                        .into_iter()
                                        .map(|color| color.into_inner())
                                        .collect::<Vec<_>>(),
                                ))
                                .select(product_colors::product_id),
                        ),
                    ),
                    ProductFilter::CategoryAny(categories) => items.filter(
                        products::category.eq_any(
                            categories
                                .into_iter()
                                .map(|category| category.into_inner())
                                .collect::<Vec<_>>(),
                        ),
                    ),
                    ProductFilter::PriceAtLeast(min_price) => {
                        items.filter(products::price.ge(min_price))
                    }
                    ProductFilter::PriceAtMost(max_price) => {
                        items.filter(products::price.le(max_price))
                    }
                };
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        // The trash view sorts by trashing time, the active view by creation time.
        let rows = match query.visibility {
            Visibility::Active => query_builder()
                .order(products::created_at.desc())
                .load::<DbProduct>(&mut conn)?,
            Visibility::Trashed => query_builder()
                .order(products::deleted_at.desc())
                .load::<DbProduct>(&mut conn)?,
        };

        let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
        let mut sizes = load_sizes(&mut conn, &ids)?;
        let mut colors = load_colors(&mut conn, &ids)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row_sizes = sizes.remove(&row.id).unwrap_or_default();
            let row_colors = colors.remove(&row.id).unwrap_or_default();
            items.push(row.into_domain(row_sizes, row_colors)?);
        }

        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let ids = [row.id];
        let sizes = load_sizes(&mut conn, &ids)?
            .remove(&row.id)
            .unwrap_or_default();
        let colors = load_colors(&mut conn, &ids)?
            .remove(&row.id)
            .unwrap_or_default();

        Ok(Some(row.into_domain(sizes, colors)?))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let created = conn.transaction::<_, RepositoryError, _>(|conn| {
            let id = diesel::insert_into(products::table)
                .values(DbNewProduct::from(product.clone()))
                .returning(products::id)
                .get_result::<i32>(conn)?;

            replace_sizes(conn, id, product.sizes.iter().map(|label| label.as_str()))?;
            replace_colors(conn, id, product.colors.iter().map(|label| label.as_str()))?;

            let row = products::table.find(id).first::<DbProduct>(conn)?;
            let ids = [row.id];
            let sizes = load_sizes(conn, &ids)?.remove(&row.id).unwrap_or_default();
            let colors = load_colors(conn, &ids)?.remove(&row.id).unwrap_or_default();

            Ok(row.into_domain(sizes, colors)?)
        })?;

        Ok(created)
    }

    fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        // Read-modify-write without a concurrency token: two concurrent
        // updates to the same id interleave with last-write-wins semantics.
        let updated = conn.transaction::<_, RepositoryError, _>(|conn| {
            let row = products::table
                .filter(products::id.eq(id.get()))
                .filter(products::is_deleted.eq(false))
                .first::<DbProduct>(conn)
                .optional()?;

            let Some(row) = row else {
                return Ok(None);
            };

            let ids = [row.id];
            let sizes = load_sizes(conn, &ids)?.remove(&row.id).unwrap_or_default();
            let colors = load_colors(conn, &ids)?.remove(&row.id).unwrap_or_default();

            let mut product = row.into_domain(sizes, colors)?;
            update.apply(&mut product, updated_at);

            diesel::update(products::table.filter(products::id.eq(id.get())))
                .set((
                    products::name.eq(product.name.as_str()),
                    products::category.eq(product.category.as_str()),
                    products::price.eq(product.price.get()),
                    products::description
                        .eq(product.description.as_ref().map(|desc| desc.as_str())),
                    products::image.eq(product.image.as_str()),
                    products::updated_at.eq(product.updated_at),
                ))
                .execute(conn)?;

            if update.sizes.is_some() {
                replace_sizes(conn, id.get(), product.sizes.iter().map(|label| label.as_str()))?;
            }
            if update.colors.is_some() {
                replace_colors(conn, id.get(), product.colors.iter().map(|label| label.as_str()))?;
            }

            Ok(Some(product))
        })?;

        Ok(updated)
    }

    fn soft_delete_product(
        &self,
        id: ProductId,
        deleted_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set((
                products::is_deleted.eq(true),
                products::deleted_at.eq(Some(deleted_at)),
                products::updated_at.eq(deleted_at),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn restore_product(
        &self,
        id: ProductId,
        restored_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set((
                products::is_deleted.eq(false),
                products::deleted_at.eq(None::<NaiveDateTime>),
                products::updated_at.eq(restored_at),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::{product_colors, product_sizes, products};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(
                product_sizes::table.filter(product_sizes::product_id.eq(id.get())),
            )
            .execute(conn)?;
            diesel::delete(
                product_colors::table.filter(product_colors::product_id.eq(id.get())),
            )
            .execute(conn)?;

            diesel::delete(products::table.filter(products::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }
}

fn load_sizes(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<String>>> {
    use crate::schema::product_sizes;

    let rows = product_sizes::table
        .filter(product_sizes::product_id.eq_any(ids))
        .order(product_sizes::size.asc())
        .load::<ProductSize>(conn)?;

    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.size);
    }
    Ok(grouped)
}

fn load_colors(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<String>>> {
    use crate::schema::product_colors;

    let rows = product_colors::table
        .filter(product_colors::product_id.eq_any(ids))
        .order(product_colors::color.asc())
        .load::<ProductColor>(conn)?;

    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.color);
    }
    Ok(grouped)
}

fn replace_sizes<'a>(
    conn: &mut SqliteConnection,
    product_id: i32,
    sizes: impl Iterator<Item = &'a str>,
) -> QueryResult<()> {
    use crate::schema::product_sizes;

    diesel::delete(product_sizes::table.filter(product_sizes::product_id.eq(product_id)))
        .execute(conn)?;

    let rows = sizes
        .map(|size| ProductSize {
            product_id,
            size: size.to_string(),
        })
        .collect::<Vec<_>>();

    diesel::insert_or_ignore_into(product_sizes::table)
        .values(rows)
        .execute(conn)?;

    Ok(())
}

fn replace_colors<'a>(
    conn: &mut SqliteConnection,
    product_id: i32,
    colors: impl Iterator<Item = &'a str>,
) -> QueryResult<()> {
    use crate::schema::product_colors;

    diesel::delete(product_colors::table.filter(product_colors::product_id.eq(product_id)))
        .execute(conn)?;

    let rows = colors
        .map(|color| ProductColor {
            product_id,
            color: color.to_string(),
        })
        .collect::<Vec<_>>();

    diesel::insert_or_ignore_into(product_colors::table)
        .values(rows)
        .execute(conn)?;

    Ok(())
}
