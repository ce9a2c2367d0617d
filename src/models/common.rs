// 列表接口通用的分页结构

use serde::Serialize;

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginate<T> {
    pub page_number: u64,
    pub row_total_count: u64,
    pub total_page_count: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}

impl<T> Paginate<T> {
    pub fn new(page_number: u64, page_size: u64, row_total_count: u64, items: Vec<T>) -> Self {
        Self {
            page_number,
            row_total_count,
            total_page_count: total_pages(row_total_count, page_size),
            page_size,
            items,
        }
    }
}

/// 第 `page_number` 页之前需要跳过的条数，页码从 1 开始
pub fn offset(page_number: u64, page_size: u64) -> u64 {
    page_number.saturating_sub(1).saturating_mul(page_size)
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
