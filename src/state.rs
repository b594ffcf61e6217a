use crate::storage::Querier;

/// 应用程序上下文
///
/// [`AppState`] 封装了只读的存储访问对象，搜索请求之间不共享其他可变状态。
#[derive(Clone)]
pub struct AppState<Q> {
    querier: Q,
}

impl<Q: Querier> AppState<Q> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(querier: Q) -> Self {
        Self { querier }
    }

    /// 获取查询对象
    pub fn querier(&self) -> &Q {
        &self.querier
    }
}
