use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::instrument;

use crate::{
    error::{Error, Result},
    search::SearchPlan,
};

use super::{Article, ArticleHit, Author, Category, Querier, SearchHits, Store};

#[derive(Debug, Default)]
struct Collections {
    articles: BTreeMap<String, Article>,
    categories: BTreeMap<String, Category>,
    authors: BTreeMap<String, Author>,
}

/// 进程内的文档存储
///
/// 保存文章、分类、作者三个集合，在内存中执行与数据库相同的 [`SearchPlan`]。
/// 用于测试和本地演示。克隆得到的实例共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取写入对象，所有修改在 [`Store::commit`] 时一次性生效
    pub fn writer(&self) -> MemoryWriter {
        MemoryWriter {
            store: self.clone(),
            ops: Vec::new(),
        }
    }

    /// 按 ID 读取原始文章
    pub fn article(&self, id: &str) -> Result<Option<Article>> {
        let data = self.inner.read().map_err(poisoned)?;
        Ok(data.articles.get(id).cloned())
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::StoreUnavailable("memory store lock poisoned".to_string())
}

impl Querier for MemoryStore {
    async fn find_category(&self, key: &str) -> Result<Option<Category>> {
        let data = self.inner.read().map_err(poisoned)?;
        let categories = || data.categories.values();

        Ok(categories()
            .find(|c| c.slug == key)
            .or_else(|| categories().find(|c| c.name == key))
            .cloned())
    }

    #[instrument(name = "memory search", skip_all, fields(page = plan.page.number()))]
    async fn search(&self, plan: &SearchPlan) -> Result<SearchHits> {
        let data = self.inner.read().map_err(poisoned)?;

        let mut matched: Vec<ArticleHit> = data
            .articles
            .values()
            .filter(|article| plan.filter.matches(article))
            .map(|article| {
                let category = article
                    .category_id
                    .as_deref()
                    .and_then(|id| data.categories.get(id));
                let author = article
                    .author_id
                    .as_deref()
                    .and_then(|id| data.authors.get(id));
                ArticleHit::enrich(article, category, author, plan.relevance.score(article))
            })
            .collect();

        let total = matched.len() as u64;
        matched.sort_by(|a, b| plan.sort.compare(a, b));

        let skip = usize::try_from(plan.page.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(plan.page.take()).unwrap_or(usize::MAX);
        let items = matched.into_iter().skip(skip).take(take).collect();

        Ok(SearchHits { items, total })
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let data = self.inner.read().map_err(poisoned)?;
        let mut categories: Vec<Category> = data.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

enum Op {
    Clean,
    Category(Category),
    Author(Author),
    Article(Article),
}

/// [`MemoryStore`] 的 [`Store`] 实现
pub struct MemoryWriter {
    store: MemoryStore,
    ops: Vec<Op>,
}

impl Store for MemoryWriter {
    fn clean(&mut self) -> &mut Self {
        self.ops.push(Op::Clean);
        self
    }

    fn upsert_category(&mut self, category: &Category) -> &mut Self {
        self.ops.push(Op::Category(category.clone()));
        self
    }

    fn upsert_author(&mut self, author: &Author) -> &mut Self {
        self.ops.push(Op::Author(author.clone()));
        self
    }

    fn upsert_article(&mut self, article: &Article) -> &mut Self {
        self.ops.push(Op::Article(article.clone()));
        self
    }

    async fn commit(self) -> Result<()> {
        let mut data = self.store.inner.write().map_err(poisoned)?;

        for op in self.ops {
            match op {
                Op::Clean => *data = Collections::default(),
                Op::Category(c) => {
                    data.categories.insert(c.id.clone(), c);
                }
                Op::Author(a) => {
                    data.authors.insert(a.id.clone(), a);
                }
                Op::Article(a) => {
                    data.articles.insert(a.id.clone(), a);
                }
            }
        }
        Ok(())
    }
}
