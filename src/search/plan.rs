use std::cmp::Ordering;

use crate::storage::{Article, ArticleHit, ArticleStatus, Category};

use super::{SearchRequest, SortBy};

/// 标题命中时的相关度权重
pub const TITLE_WEIGHT: i32 = 10;
/// 摘要命中时的相关度权重
pub const SUMMARY_WEIGHT: i32 = 5;
/// 正文命中时的相关度权重
pub const CONTENT_WEIGHT: i32 = 2;
/// 没有关键词时所有文章的相关度
pub const CONSTANT_RELEVANCE: i32 = 1;

/// 大小写不敏感的子串匹配
///
/// 关键词按字面匹配，不作为正则或通配模式解释。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    needle: String,
    lowered: String,
}

impl TextMatch {
    pub fn new(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let lowered = needle.to_lowercase();
        Self { needle, lowered }
    }

    /// 原始关键词
    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.lowered)
    }

    fn matches_opt(&self, haystack: Option<&str>) -> bool {
        haystack.is_some_and(|h| self.matches(h))
    }

    /// 标题、摘要、正文或任一标签命中即视为匹配
    pub fn matches_article(&self, article: &Article) -> bool {
        self.matches(&article.title)
            || self.matches_opt(article.short_description.as_deref())
            || self.matches(&article.content)
            || article.tags.iter().any(|tag| self.matches(tag))
    }
}

/// 过滤条件
///
/// 状态条件始终为 [`ArticleStatus::Published`]，无法修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    status: ArticleStatus,
    text: Option<TextMatch>,
    category_id: Option<String>,
}

impl Filter {
    pub fn status(&self) -> ArticleStatus {
        self.status
    }

    pub fn text(&self) -> Option<&TextMatch> {
        self.text.as_ref()
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub fn matches(&self, article: &Article) -> bool {
        article.status == self.status
            && self.text.as_ref().is_none_or(|t| t.matches_article(article))
            && self
                .category_id
                .as_deref()
                .is_none_or(|id| article.category_id.as_deref() == Some(id))
    }
}

/// 相关度计算方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    /// 所有文章的相关度都是 [`CONSTANT_RELEVANCE`]
    Constant,
    /// 按字段命中加权求和，取值范围 `[0, 17]`
    Weighted(TextMatch),
}

impl Relevance {
    pub fn score(&self, article: &Article) -> i32 {
        match self {
            Relevance::Constant => CONSTANT_RELEVANCE,
            Relevance::Weighted(text) => {
                let mut score = 0;
                if text.matches(&article.title) {
                    score += TITLE_WEIGHT;
                }
                if text.matches_opt(article.short_description.as_deref()) {
                    score += SUMMARY_WEIGHT;
                }
                if text.matches(&article.content) {
                    score += CONTENT_WEIGHT;
                }
                score
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Relevance,
    PublicationDate,
    Views,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }
}

/// 排序规则
///
/// 所有排序键比较完后，再按文章 ID 升序决出先后，保证分页结果稳定。
/// 缺失的发布时间视为最早。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(sort_by: SortBy) -> Self {
        let keys = match sort_by {
            SortBy::Newest => vec![SortKey::desc(SortField::PublicationDate)],
            SortBy::Oldest => vec![SortKey::asc(SortField::PublicationDate)],
            SortBy::MostViewed => vec![SortKey::desc(SortField::Views)],
            SortBy::Relevance => vec![
                SortKey::desc(SortField::Relevance),
                SortKey::desc(SortField::PublicationDate),
            ],
        };
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn compare(&self, a: &ArticleHit, b: &ArticleHit) -> Ordering {
        self.keys
            .iter()
            .map(|key| {
                let ordering = match key.field {
                    SortField::Relevance => a.relevance.cmp(&b.relevance),
                    SortField::PublicationDate => a.publication_date.cmp(&b.publication_date),
                    SortField::Views => a.views.cmp(&b.views),
                };
                match key.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            })
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

/// 分页参数，页码从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// 需要跳过的文章数
    pub fn skip(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    /// 本页最多返回的文章数
    pub fn take(&self) -> u64 {
        u64::from(self.size)
    }
}

/// 一次搜索的执行计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub filter: Filter,
    pub relevance: Relevance,
    pub sort: SortSpec,
    pub page: Page,
}

impl SearchPlan {
    /// 根据请求和已解析的分类构建执行计划
    ///
    /// `category` 为 `None` 时不按分类过滤，即使请求中指定了分类。
    pub fn build(request: &SearchRequest, category: Option<&Category>) -> Self {
        let text = request.query().map(TextMatch::new);

        let relevance = match &text {
            Some(text) => Relevance::Weighted(text.clone()),
            None => Relevance::Constant,
        };

        Self {
            filter: Filter {
                status: ArticleStatus::Published,
                text,
                category_id: category.map(|c| c.id.clone()),
            },
            relevance,
            sort: SortSpec::new(request.sort_by()),
            page: Page::new(request.page(), request.limit()),
        }
    }
}
