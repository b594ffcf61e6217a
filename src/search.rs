//! 文章搜索
//!
//! 搜索请求的处理分为以下几步：
//!
//! 1. [`SearchRequest`]：校验并规范化调用方提供的参数
//! 2. [`SearchPlan`]：将请求翻译为过滤条件、相关度计算和排序规则
//! 3. [`crate::storage::Querier::search`]：在存储上执行计划，返回当前页和总数
//! 4. [`SearchArticle`] / [`Pagination`]：将命中结果整理为对外的响应结构

mod pagination;
mod plan;
mod request;
mod time_ago;
mod transform;

pub use self::{
    pagination::Pagination,
    plan::{
        CONSTANT_RELEVANCE, CONTENT_WEIGHT, Direction, Filter, Page, Relevance, SUMMARY_WEIGHT,
        SearchPlan, SortField, SortKey, SortSpec, TITLE_WEIGHT, TextMatch,
    },
    request::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, SearchRequest, SortBy},
    time_ago::time_ago,
    transform::{PLACEHOLDER_IMAGE, SearchArticle, derive_slug},
};
