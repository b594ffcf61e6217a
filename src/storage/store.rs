use crate::{error::Result, storage::DBPool};

use super::{Article, Author, Category};

/// 提供文章、分类和作者的写入接口
///
/// 修改先排队，调用 [`Store::commit`] 时在同一事务中一次性提交。
pub trait Store: Send + Sync {
    /// 清空所有文章、分类和作者
    fn clean(&mut self) -> &mut Self;
    /// 插入或更新分类
    fn upsert_category(&mut self, category: &Category) -> &mut Self;
    /// 插入或更新作者
    fn upsert_author(&mut self, author: &Author) -> &mut Self;
    /// 插入或更新文章
    fn upsert_article(&mut self, article: &Article) -> &mut Self;
    /// 提交更改
    fn commit(self) -> impl std::future::Future<Output = Result<()>>;
}

/// sqlx 的 [`Store`] 实现
pub struct SqlxStore {
    pool: DBPool,
    queries: Vec<sqlx::query::Query<'static, sqlx::Postgres, sqlx::postgres::PgArguments>>,
}

impl SqlxStore {
    pub fn new(pool: DBPool) -> Self {
        Self {
            pool,
            queries: Default::default(),
        }
    }
}

impl Store for SqlxStore {
    fn clean(&mut self) -> &mut Self {
        let query = sqlx::query("TRUNCATE TABLE articles, categories, users");
        self.queries.push(query);
        self
    }

    fn upsert_category(&mut self, category: &Category) -> &mut Self {
        let q = sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug
            "#,
        )
        .bind(category.id.to_owned())
        .bind(category.name.to_owned())
        .bind(category.slug.to_owned());

        self.queries.push(q);
        self
    }

    fn upsert_author(&mut self, author: &Author) -> &mut Self {
        let q = sqlx::query(
            r#"
            INSERT INTO users (id, full_name, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role
            "#,
        )
        .bind(author.id.to_owned())
        .bind(author.full_name.to_owned())
        .bind(author.role.as_str());

        self.queries.push(q);
        self
    }

    fn upsert_article(&mut self, article: &Article) -> &mut Self {
        let q = sqlx::query(
            "
            INSERT INTO articles
                (id, title, slug, short_description, content, cover_image_url, status,
                 category_id, author_id, tags, views, publication_date, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id)
            DO UPDATE SET
                title = EXCLUDED.title,
                slug = EXCLUDED.slug,
                short_description = EXCLUDED.short_description,
                content = EXCLUDED.content,
                cover_image_url = EXCLUDED.cover_image_url,
                status = EXCLUDED.status,
                category_id = EXCLUDED.category_id,
                author_id = EXCLUDED.author_id,
                tags = EXCLUDED.tags,
                views = EXCLUDED.views,
                publication_date = EXCLUDED.publication_date,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(article.id.to_owned())
        .bind(article.title.to_owned())
        .bind(article.slug.to_owned())
        .bind(article.short_description.to_owned())
        .bind(article.content.to_owned())
        .bind(article.cover_image_url.to_owned())
        .bind(article.status.as_str())
        .bind(article.category_id.to_owned())
        .bind(article.author_id.to_owned())
        .bind(article.tags.to_owned())
        .bind(article.views)
        .bind(article.publication_date)
        .bind(article.updated_at);

        self.queries.push(q);
        self
    }

    async fn commit(mut self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for q in self.queries.drain(..) {
            q.execute(tx.as_mut()).await?;
        }

        Ok(tx.commit().await?)
    }
}
