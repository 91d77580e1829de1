//! 列表查询参数
//!
//! 所有列表端点共用同一组查询参数：`pageNumber`/`pageSize`/`sortBy`/
//! `sortDirection`，外加各资源的搜索词。缺省为第 1 页、每页 10 条、
//! createdAt 降序。

use domain::{Pagination, SortConfig, SortDirection, UserListFilter};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub search_name_term: Option<String>,
    pub search_login_term: Option<String>,
    pub search_email_term: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_number.unwrap_or(1), self.page_size.unwrap_or(10))
    }

    /// 排序方向只认 `asc`（大小写不敏感），其余一律降序。
    pub fn sort(&self) -> SortConfig {
        let default = SortConfig::default();
        let field = self
            .sort_by
            .clone()
            .filter(|field| !field.is_empty())
            .unwrap_or(default.field);
        let direction = match &self.sort_direction {
            Some(value) if value.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        SortConfig::new(field, direction)
    }

    pub fn name_term(&self) -> Option<String> {
        self.search_name_term.clone().filter(|term| !term.is_empty())
    }

    pub fn user_filter(&self) -> UserListFilter {
        UserListFilter {
            login_term: self
                .search_login_term
                .clone()
                .filter(|term| !term.is_empty()),
            email_term: self
                .search_email_term
                .clone()
                .filter(|term| !term.is_empty()),
        }
    }
}
