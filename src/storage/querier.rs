use sqlx::{Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    error::Result,
    search::{
        CONSTANT_RELEVANCE, CONTENT_WEIGHT, Direction, Filter, Relevance, SUMMARY_WEIGHT,
        SearchPlan, SortField, SortSpec, TITLE_WEIGHT,
    },
};

use super::{
    AUTHOR_FALLBACK_NAME, ArticleHit, CATEGORY_FALLBACK_NAME, CATEGORY_FALLBACK_SLUG, Category,
    DBPool, SearchHits,
};

/// 用于查询文章相关数据
///
/// 所有方法都是只读的，不会修改浏览量等计数。
pub trait Querier: Send + Sync {
    /// 按 slug 或名称查找分类，slug 精确匹配优先于名称匹配
    fn find_category(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Category>>> + Send;

    /// 执行搜索计划
    ///
    /// 返回 [`SearchHits`]：`items` 为排序后结果中当前页的切片，
    /// `total` 为分页前满足过滤条件的文章总数。
    fn search(
        &self,
        plan: &SearchPlan,
    ) -> impl std::future::Future<Output = Result<SearchHits>> + Send;

    /// 查询所有分类，按名称排序
    fn categories(&self) -> impl std::future::Future<Output = Result<Vec<Category>>> + Send;
}

/// slug 匹配优先；名称重复时取 ID 最小的分类，与 [`super::MemoryStore`] 一致
const FIND_CATEGORY_SQL: &str = r#"
    SELECT id, name, slug
    FROM categories
    WHERE slug = $1 OR name = $1
    ORDER BY (slug = $1) DESC, id COLLATE "C" ASC
    LIMIT 1
"#;

impl Querier for DBPool {
    async fn find_category(&self, key: &str) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(FIND_CATEGORY_SQL)
            .bind(key)
            .fetch_optional(self)
            .await?;
        Ok(category)
    }

    /// 计数与分页查询在同一个只读快照事务中执行
    #[instrument(name = "pg search", skip_all, fields(page = plan.page.number()))]
    async fn search(&self, plan: &SearchPlan) -> Result<SearchHits> {
        let mut tx = self.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count = count_query(plan);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut page = page_query(plan);
        let items = page
            .build_query_as::<ArticleHit>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(SearchHits {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
                SELECT id, name, slug
                FROM categories
                ORDER BY name
                "#,
        )
        .fetch_all(self)
        .await?;
        Ok(rows)
    }
}

fn count_query(plan: &SearchPlan) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM articles a");
    push_filter(&mut builder, &plan.filter);
    builder
}

fn page_query(plan: &SearchPlan) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT a.id, a.title, a.slug, a.short_description, a.cover_image_url,
               a.publication_date, a.views, a.tags,
        "#,
    );
    builder
        .push(" COALESCE(c.name, ")
        .push_bind(CATEGORY_FALLBACK_NAME)
        .push(") AS category_name, COALESCE(c.slug, ")
        .push_bind(CATEGORY_FALLBACK_SLUG)
        .push(") AS category_slug, COALESCE(u.full_name, ")
        .push_bind(AUTHOR_FALLBACK_NAME)
        .push(") AS author_name, ");
    push_relevance(&mut builder, &plan.relevance);
    builder.push(
        r#" AS relevance
        FROM articles a
        LEFT JOIN categories c ON c.id = a.category_id
        LEFT JOIN users u ON u.id = a.author_id
        "#,
    );

    push_filter(&mut builder, &plan.filter);
    push_order_by(&mut builder, &plan.sort);

    builder
        .push(" LIMIT ")
        .push_bind(i64::try_from(plan.page.take()).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(plan.page.skip()).unwrap_or(i64::MAX));
    builder
}

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    builder
        .push(" WHERE a.status = ")
        .push_bind(filter.status().as_str());

    if let Some(text) = filter.text() {
        let pattern = like_pattern(text.needle());
        builder
            .push(" AND (a.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.short_description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM UNNEST(a.tags) AS t(tag) WHERE t.tag ILIKE ")
            .push_bind(pattern)
            .push("))");
    }

    if let Some(category_id) = filter.category_id() {
        builder
            .push(" AND a.category_id = ")
            .push_bind(category_id.to_string());
    }
}

fn push_relevance(builder: &mut QueryBuilder<'static, Postgres>, relevance: &Relevance) {
    match relevance {
        Relevance::Constant => {
            builder.push(CONSTANT_RELEVANCE);
        }
        Relevance::Weighted(text) => {
            let pattern = like_pattern(text.needle());
            builder
                .push("(CASE WHEN a.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" THEN ")
                .push(TITLE_WEIGHT)
                .push(" ELSE 0 END + CASE WHEN a.short_description ILIKE ")
                .push_bind(pattern.clone())
                .push(" THEN ")
                .push(SUMMARY_WEIGHT)
                .push(" ELSE 0 END + CASE WHEN a.content ILIKE ")
                .push_bind(pattern)
                .push(" THEN ")
                .push(CONTENT_WEIGHT)
                .push(" ELSE 0 END)");
        }
    }
}

fn push_order_by(builder: &mut QueryBuilder<'static, Postgres>, sort: &SortSpec) {
    builder.push(" ORDER BY ");
    for key in sort.keys() {
        let column = match key.field {
            SortField::Relevance => "relevance",
            SortField::PublicationDate => "a.publication_date",
            SortField::Views => "a.views",
        };
        // 缺失的发布时间视为最早
        let direction = match key.direction {
            Direction::Asc => "ASC NULLS FIRST",
            Direction::Desc => "DESC NULLS LAST",
        };
        builder.push(column).push(" ").push(direction).push(", ");
    }
    builder.push(r#"a.id COLLATE "C" ASC"#);
}

/// 将关键词转为 `ILIKE` 子串模式，转义其中的 `\`、`%`、`_`
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use sqlx::Execute;

    use super::*;
    use crate::search::{SearchRequest, SortBy};

    fn plan(query: &str, category: Option<Category>, sort_by: SortBy) -> SearchPlan {
        let request = SearchRequest::new(query, "cong-nghe", sort_by, 2, 10).unwrap();
        SearchPlan::build(&request, category.as_ref())
    }

    #[test]
    fn category_lookup_is_deterministic() {
        assert!(FIND_CATEGORY_SQL.contains(r#"ORDER BY (slug = $1) DESC, id COLLATE "C" ASC"#));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("kinh tế"), "%kinh tế%");
        assert_eq!(like_pattern("100%_a\\b"), r"%100\%\_a\\b%");
    }

    #[test]
    fn count_query_without_text() {
        let category = Category {
            id: "c1".into(),
            name: "Công nghệ".into(),
            slug: "cong-nghe".into(),
        };
        let mut builder = count_query(&plan("", Some(category), SortBy::Newest));
        let sql = builder.build().sql().to_string();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM articles a WHERE a.status = $1 AND a.category_id = $2"
        );
    }

    #[test]
    fn page_query_relevance_order() {
        let mut builder = page_query(&plan("vàng", None, SortBy::Relevance));
        let sql = builder.build().sql().to_string();

        assert!(sql.contains("a.title ILIKE $8 OR a.short_description ILIKE $9"));
        assert!(sql.contains("THEN 10 ELSE 0 END"));
        assert!(sql.contains(
            r#"ORDER BY relevance DESC NULLS LAST, a.publication_date DESC NULLS LAST, a.id COLLATE "C" ASC"#
        ));
        assert!(sql.trim_end().ends_with("LIMIT $12 OFFSET $13"));
    }

    #[test]
    fn page_query_constant_relevance() {
        let category = Category {
            id: "c1".into(),
            name: "Công nghệ".into(),
            slug: "cong-nghe".into(),
        };
        let mut builder = page_query(&plan("", Some(category), SortBy::Oldest));
        let sql = builder.build().sql().to_string();

        assert!(sql.contains("1 AS relevance"));
        assert!(!sql.contains("ILIKE"));
        assert!(sql.contains("ORDER BY a.publication_date ASC NULLS FIRST"));
    }
}
