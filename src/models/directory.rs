use serde::{Deserialize, Serialize};

use super::profile::IdNameObject;
use super::record::EmployeeRecord;
use super::wire;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct EmployeeListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
    pub search: Option<String>,
}

impl EmployeeListQuery {
    pub fn filter(&self) -> EmployeeFilter {
        EmployeeFilter {
            department_id: self.department_id,
            job_id: self.job_id,
            manager_id: self.manager_id,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
    /// Case-insensitive name fragment, or an exact id when numeric.
    pub search: Option<String>,
}

impl EmployeeFilter {
    pub fn search_id(&self) -> Option<i32> {
        self.search.as_deref().and_then(|term| term.parse().ok())
    }

    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        fn reference_is(reference: &Option<IdNameObject>, wanted: Option<i32>) -> bool {
            match wanted {
                Some(id) => reference.as_ref().map(|r| r.id) == Some(id),
                None => true,
            }
        }

        let search_ok = match &self.search {
            Some(term) => {
                record.name.to_lowercase().contains(&term.to_lowercase())
                    || self.search_id() == Some(record.id)
            }
            None => true,
        };

        search_ok
            && reference_is(&record.department, self.department_id)
            && reference_is(&record.job, self.job_id)
            && reference_is(&record.manager, self.manager_id)
    }
}

/// Resolved page window for a result set of `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn resolve(page: Option<i64>, limit: Option<i64>, total: i64) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let pages = (total + limit - 1) / limit;
        let page = if pages > 0 {
            page.unwrap_or(1).clamp(1, pages)
        } else {
            1
        };
        Pagination { page, limit, pages, offset: (page - 1) * limit }
    }
}

/// One page of a filtered listing, with the total it was cut from.
#[derive(Debug, Clone)]
pub struct EmployeePage {
    pub total: i64,
    pub window: Pagination,
    pub records: Vec<EmployeeRecord>,
}

impl From<EmployeePage> for EmployeeList {
    fn from(page: EmployeePage) -> Self {
        EmployeeList {
            total: page.total,
            page: page.window.page,
            limit: page.window.limit,
            pages: page.window.pages,
            employees: page.records.into_iter().map(EmployeeSummary::from).collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EmployeeSummary {
    pub id: i32,
    pub name: String,
    pub job_title: String,
    #[serde(with = "wire::reference")]
    pub department_id: Option<IdNameObject>,
    #[serde(with = "wire::reference")]
    pub job_id: Option<IdNameObject>,
    #[serde(with = "wire::reference")]
    pub parent_id: Option<IdNameObject>,
    pub mobile_phone: String,
    pub work_email: String,
    pub image_1920: String,
}

impl From<EmployeeRecord> for EmployeeSummary {
    fn from(record: EmployeeRecord) -> Self {
        EmployeeSummary {
            id: record.id,
            name: record.name,
            job_title: record.job_title,
            department_id: record.department,
            job_id: record.job,
            parent_id: record.manager,
            mobile_phone: record.mobile_phone,
            work_email: record.work_email,
            image_1920: record.avatars.size_1920,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EmployeeList {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub employees: Vec<EmployeeSummary>,
}
