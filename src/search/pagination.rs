use serde::Serialize;

/// 分页信息，页码从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// 根据当前页、每页数量和分页前的总数计算分页信息
    ///
    /// 当前页超出总页数时不视为错误，`has_next_page` 为 `false`。
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));

        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }
}
