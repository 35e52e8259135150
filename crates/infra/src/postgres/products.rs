use std::sync::Arc;

use marketplace_catalog::{Predicate, Product, ProductRepository, SearchCriteria};
use marketplace_core::{Price, ProductId, RepositoryError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use super::{from_db, map_sqlx_error, run_blocking, to_db};

const SELECT_COLUMNS: &str = "SELECT id, name, category, brand, price_minor, stock FROM products";

/// Product store over the `products` table.
///
/// Listing and search order by `name, id`. Text filters compare with
/// `lower()` on both sides, so `%` and `_` in filter values match literally.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self, product), fields(name = %product.name), err)]
    pub async fn save_async(&self, product: Product) -> Result<Product, RepositoryError> {
        let price = to_db("products.save", product.price.minor())?;
        let stock = to_db("products.save", product.stock)?;

        let id = match product.id {
            None => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO products (name, category, brand, price_minor, stock)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(&product.name)
                .bind(&product.category)
                .bind(&product.brand)
                .bind(price)
                .bind(stock)
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("products.save", e))?;
                let raw: i64 = row
                    .try_get("id")
                    .map_err(|e| map_sqlx_error("products.save", e))?;
                from_db::<ProductId>("products.save", raw)?
            }
            Some(id) => {
                self.overwrite(id, &product, price, stock).await?;
                id
            }
        };

        Ok(Product {
            id: Some(id),
            ..product
        })
    }

    /// Update in place, or insert under the given id and move the sequence
    /// past it.
    async fn overwrite(
        &self,
        id: ProductId,
        product: &Product,
        price: i64,
        stock: i64,
    ) -> Result<(), RepositoryError> {
        let raw_id = to_db("products.save", id.get())?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("products.save", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, category = $3, brand = $4, price_minor = $5, stock = $6
            WHERE id = $1
            "#,
        )
        .bind(raw_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(price)
        .bind(stock)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("products.save", e))?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, category, brand, price_minor, stock)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(raw_id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.brand)
            .bind(price)
            .bind(stock)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("products.save", e))?;

            sqlx::query(
                "SELECT setval(pg_get_serial_sequence('products', 'id'), (SELECT MAX(id) FROM products))",
            )
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("products.save", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("products.save", e))
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_id_async(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(to_db("products.find_by_id", id.get())?)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.find_by_id", e))?;
        row.as_ref()
            .map(|r| product_from_row("products.find_by_id", r))
            .transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn find_all_async(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY name, id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.find_all", e))?;
        rows.iter()
            .map(|r| product_from_row("products.find_all", r))
            .collect()
    }

    #[instrument(skip(self), err)]
    pub async fn delete_by_id_async(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(to_db("products.delete_by_id", id.get())?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.delete_by_id", e))?;
        Ok(done.rows_affected() > 0)
    }

    #[instrument(skip(self, criteria), fields(criteria = %criteria), err)]
    pub async fn search_async(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, RepositoryError> {
        let mut query = search_query(criteria)?;
        let rows = query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.search", e))?;
        rows.iter()
            .map(|r| product_from_row("products.search", r))
            .collect()
    }
}

/// Parameterized `SELECT` for the set filters, in predicate order.
fn search_query(criteria: &SearchCriteria) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
    let mut joiner = " WHERE ";

    for predicate in criteria.predicates() {
        query.push(joiner);
        joiner = " AND ";
        match predicate {
            Predicate::CategoryIs(category) => {
                query
                    .push("lower(category) = lower(")
                    .push_bind(category.to_owned())
                    .push(")");
            }
            Predicate::BrandIs(brand) => {
                query
                    .push("lower(brand) = lower(")
                    .push_bind(brand.to_owned())
                    .push(")");
            }
            Predicate::PriceAtLeast(min) => {
                query
                    .push("price_minor >= ")
                    .push_bind(to_db("products.search", min.minor())?);
            }
            Predicate::PriceAtMost(max) => {
                query
                    .push("price_minor <= ")
                    .push_bind(to_db("products.search", max.minor())?);
            }
        }
    }

    query.push(" ORDER BY name, id");
    Ok(query)
}

fn product_from_row(operation: &'static str, row: &PgRow) -> Result<Product, RepositoryError> {
    let get_i64 = |column: &str| -> Result<i64, RepositoryError> {
        row.try_get::<i64, _>(column)
            .map_err(|e| map_sqlx_error(operation, e))
    };
    let get_text = |column: &str| -> Result<String, RepositoryError> {
        row.try_get::<String, _>(column)
            .map_err(|e| map_sqlx_error(operation, e))
    };

    Ok(Product {
        id: Some(from_db::<ProductId>(operation, get_i64("id")?)?),
        name: get_text("name")?,
        category: get_text("category")?,
        brand: get_text("brand")?,
        price: Price::from_minor(from_db(operation, get_i64("price_minor")?)?),
        stock: from_db(operation, get_i64("stock")?)?,
    })
}

impl ProductRepository for PostgresProductRepository {
    fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        run_blocking("products.save", self.save_async(product))?
    }

    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        run_blocking("products.find_by_id", self.find_by_id_async(id))?
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        run_blocking("products.find_all", self.find_all_async())?
    }

    fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        run_blocking("products.delete_by_id", self.delete_by_id_async(id))?
    }

    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, RepositoryError> {
        run_blocking("products.search", self.search_async(criteria))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn unrestricted_search_has_no_where_clause() {
        let mut q = search_query(&SearchCriteria::any()).unwrap();
        assert_eq!(
            q.build().sql(),
            "SELECT id, name, category, brand, price_minor, stock FROM products ORDER BY name, id"
        );
    }

    #[test]
    fn filters_become_bound_parameters() {
        let criteria = SearchCriteria::any()
            .with_category("Books")
            .with_brand("Acme")
            .with_min_price(Price::from_minor(100))
            .with_max_price(Price::from_minor(900));
        let mut q = search_query(&criteria).unwrap();
        let built = q.build();
        let sql = built.sql();
        assert!(sql.contains(
            "WHERE lower(category) = lower($1) AND lower(brand) = lower($2) \
             AND price_minor >= $3 AND price_minor <= $4 ORDER BY name, id"
        ));
        assert!(!sql.contains("Books"));
    }
}
