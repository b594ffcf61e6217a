use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 12;
/// 单页最多返回的文章数，超出时截断
pub const MAX_LIMIT: u32 = 100;

/// 表示“不按分类过滤”的取值
const ALL_CATEGORIES: [&str; 2] = ["all", "Tất cả"];

const MISSING_CRITERIA: &str = "Vui lòng nhập từ khóa tìm kiếm hoặc chọn danh mục";
const INVALID_PAGE: &str = "Số trang không hợp lệ";
const INVALID_LIMIT: &str = "Số bài viết mỗi trang không hợp lệ";

/// 排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// 相关度降序，相同时按发布时间降序
    #[default]
    Relevance,
    /// 发布时间降序
    Newest,
    /// 发布时间升序
    Oldest,
    /// 浏览量降序
    MostViewed,
}

impl SortBy {
    /// 解析排序方式，无法识别的取值按 [`SortBy::Relevance`] 处理
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "newest" => SortBy::Newest,
            "oldest" => SortBy::Oldest,
            "most-viewed" => SortBy::MostViewed,
            _ => SortBy::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::MostViewed => "most-viewed",
        }
    }
}

/// 经过校验的搜索请求
///
/// 创建后不可变，依次传递给 [`super::SearchPlan`]、存储层和结果转换。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    raw_query: String,
    query: String,
    raw_category: String,
    category: Option<String>,
    sort_by: SortBy,
    page: u32,
    limit: u32,
}

impl SearchRequest {
    /// 创建搜索请求
    ///
    /// 关键词与分类至少提供一个，`page` 必须不小于 1，`limit` 必须在
    /// `1..=`[`MAX_LIMIT`] 之间，否则返回 [`Error::InvalidRequest`]。
    pub fn new(
        query: impl Into<String>,
        category: impl Into<String>,
        sort_by: SortBy,
        page: u32,
        limit: u32,
    ) -> Result<Self> {
        let raw_query = query.into();
        let raw_category = category.into();

        let query = raw_query.trim().to_string();
        let category = Some(raw_category.trim())
            .filter(|c| !c.is_empty() && !ALL_CATEGORIES.contains(c))
            .map(str::to_string);

        if query.is_empty() && category.is_none() {
            return Err(Error::InvalidRequest(MISSING_CRITERIA));
        }
        if page == 0 {
            return Err(Error::InvalidRequest(INVALID_PAGE));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(Error::InvalidRequest(INVALID_LIMIT));
        }

        Ok(Self {
            raw_query,
            query,
            raw_category,
            category,
            sort_by,
            page,
            limit,
        })
    }

    /// 解析字符串形式的页码，缺省时为 [`DEFAULT_PAGE`]
    pub fn parse_page(value: Option<&str>) -> Result<u32> {
        parse_positive(value, DEFAULT_PAGE).ok_or(Error::InvalidRequest(INVALID_PAGE))
    }

    /// 解析字符串形式的每页数量，缺省时为 [`DEFAULT_LIMIT`]
    pub fn parse_limit(value: Option<&str>) -> Result<u32> {
        parse_positive(value, DEFAULT_LIMIT).ok_or(Error::InvalidRequest(INVALID_LIMIT))
    }

    /// 去除首尾空白后的关键词，为空时返回 `None`
    pub fn query(&self) -> Option<&str> {
        Some(self.query.as_str()).filter(|q| !q.is_empty())
    }

    /// 调用方传入的原始关键词
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// 需要解析的分类（slug 或名称），未指定或为“全部”时返回 `None`
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// 调用方传入的原始分类参数
    pub fn raw_category(&self) -> &str {
        &self.raw_category
    }

    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

fn parse_positive(value: Option<&str>, default: u32) -> Option<u32> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Some(default),
        Some(v) => v.parse::<u32>().ok().filter(|n| *n >= 1),
    }
}
