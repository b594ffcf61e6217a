use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文章分类无法解析时展示的名称
pub const CATEGORY_FALLBACK_NAME: &str = "Chưa phân loại";
/// 文章分类无法解析时使用的 slug
pub const CATEGORY_FALLBACK_SLUG: &str = "uncategorized";
/// 文章作者无法解析时展示的名称
pub const AUTHOR_FALLBACK_NAME: &str = "Không rõ";

/// 文章的发布状态
///
/// 只有 [`ArticleStatus::Published`] 的文章对搜索可见。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    /// 数据库中保存的字符串形式
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// 文章分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// 分类 ID
    pub id: String,
    /// 分类名称，用于展示
    pub name: String,
    /// 分类 slug，唯一
    pub slug: String,
}

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// 文章作者（即 `users` 集合中的用户）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

/// 存储中的原始文章文档
///
/// 除 `id`、`title` 外的字段都允许缺失，缺失时按默认值处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    /// 分类引用，存储层不保证其有效
    #[serde(default)]
    pub category_id: Option<String>,
    /// 作者引用，存储层不保证其有效
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub views: i64,
    /// 发布时间，草稿为 `None`
    #[serde(default)]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// 搜索命中的文章
///
/// 已经完成分类、作者的关联，名称字段不会为空。
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ArticleHit {
    pub id: String,
    pub title: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub cover_image_url: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub views: i64,
    pub tags: Vec<String>,
    pub category_name: String,
    pub category_slug: String,
    pub author_name: String,
    pub relevance: i32,
}

impl ArticleHit {
    /// 将文章与其分类、作者关联，无法解析的引用使用兜底名称
    pub fn enrich(
        article: &Article,
        category: Option<&Category>,
        author: Option<&Author>,
        relevance: i32,
    ) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            slug: article.slug.clone(),
            short_description: article.short_description.clone(),
            cover_image_url: article.cover_image_url.clone(),
            publication_date: article.publication_date,
            views: article.views,
            tags: article.tags.clone(),
            category_name: category
                .map(|c| c.name.clone())
                .unwrap_or_else(|| CATEGORY_FALLBACK_NAME.to_string()),
            category_slug: category
                .map(|c| c.slug.clone())
                .unwrap_or_else(|| CATEGORY_FALLBACK_SLUG.to_string()),
            author_name: author
                .map(|a| a.full_name.clone())
                .unwrap_or_else(|| AUTHOR_FALLBACK_NAME.to_string()),
            relevance,
        }
    }
}

/// 一次搜索的结果：当前页的文章和分页前的总数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub items: Vec<ArticleHit>,
    pub total: u64,
}
