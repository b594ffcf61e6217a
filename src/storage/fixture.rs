use serde::Deserialize;

use crate::error::Result;

use super::{Article, Author, Category, Store};

/// 初始数据
///
/// JSON 格式：`{ "categories": [...], "authors": [...], "articles": [...] }`，
/// 文章字段使用 camelCase。
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl Fixture {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 将数据写入存储，`reset` 为 `true` 时先清空已有数据
    pub async fn load<S: Store>(&self, mut store: S, reset: bool) -> Result<()> {
        if reset {
            store.clean();
        }
        for category in &self.categories {
            store.upsert_category(category);
        }
        for author in &self.authors {
            store.upsert_author(author);
        }
        for article in &self.articles {
            store.upsert_article(article);
        }

        tracing::info!(
            categories = self.categories.len(),
            authors = self.authors.len(),
            articles = self.articles.len(),
            reset,
            "loading fixture"
        );
        store.commit().await
    }
}
