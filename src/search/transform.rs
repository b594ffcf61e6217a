use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::ArticleHit;

use super::time_ago;

/// 文章没有封面图时使用的图片路径
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// 搜索结果中的文章
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArticle {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: String,
    pub category: String,
    pub category_slug: String,
    pub author: String,
    /// 相对时间描述，参见 [`time_ago`]
    pub published_at: String,
    pub published_date: Option<DateTime<Utc>>,
    pub slug: String,
    pub views: i64,
    pub tags: Vec<String>,
    pub relevance: i32,
}

impl SearchArticle {
    /// 将命中结果转换为对外结构，`now` 用于计算相对时间
    pub fn from_hit(hit: ArticleHit, now: DateTime<Utc>) -> Self {
        let slug = hit
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| derive_slug(&hit.title));

        Self {
            id: hit.id,
            excerpt: hit.short_description.unwrap_or_default(),
            image_url: hit
                .cover_image_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            category: hit.category_name,
            category_slug: hit.category_slug,
            author: hit.author_name,
            published_at: time_ago(hit.publication_date, now),
            published_date: hit.publication_date,
            slug,
            views: hit.views,
            tags: hit.tags,
            relevance: hit.relevance,
            title: hit.title,
        }
    }
}

/// 由标题生成 slug：转为小写，每段连续空白（包括首尾）替换为一个 `-`
///
/// 仅用于展示链接，不保证唯一。
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;

    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}
