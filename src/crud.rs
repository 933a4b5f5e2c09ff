//! 通用资源 CRUD 模块
//!
//! 每个功能页面都是同一套流程：带分页/搜索/过滤的列表请求、创建、更新、删除、详情。
//! `ResourceCrud` 由资源描述参数化；变更成功后总是重新请求列表。

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::request::HttpMethod;
use campusdesk_shared::{Page, Resource, ResourceSchema};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// 通用页面使用的无类型记录
pub type Record = serde_json::Value;

/// 记录的 id（`id` 或 `_id`，字符串或数字）
pub fn record_id(record: &Record) -> Option<String> {
    let raw = record.get("id").or_else(|| record.get("_id"))?;
    match raw {
        Record::String(s) if !s.is_empty() => Some(s.clone()),
        Record::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =========================================================
// 列表查询参数
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// 修改搜索词会回到第一页
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// 修改过滤条件会回到第一页；空值表示移除该条件
    pub fn set_filter(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value);
        }
        self.page = 1;
    }

    pub fn next_page(&mut self, total_pages: u32) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// 当前页超出总页数时退回最后一页（至少第一页），返回是否有变化
    pub fn clamp_to(&mut self, total_pages: u32) -> bool {
        let last = total_pages.max(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// 组装查询参数：总是带 `page` 与 `limit`，空的搜索词与过滤值省略
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }
        for (k, v) in &self.filters {
            if !v.trim().is_empty() {
                params.push((k.clone(), v.clone()));
            }
        }
        params
    }
}

/// 页面的列表视图状态
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub loading: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
            loading: false,
        }
    }
}

impl<T> ListState<T> {
    /// 用新的一页整体替换
    pub fn replace(&mut self, page: Page<T>) {
        self.items = page.items;
        self.total_pages = page.total_pages;
        self.loading = false;
    }
}

// =========================================================
// 通用 CRUD
// =========================================================

pub struct ResourceCrud<T = Record> {
    api: ApiClient,
    schema: &'static ResourceSchema,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceCrud<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            schema: self.schema,
            _marker: PhantomData,
        }
    }
}

impl<T: Resource + Serialize + DeserializeOwned> ResourceCrud<T> {
    pub fn new(api: ApiClient) -> Self {
        Self::for_schema(api, T::schema())
    }
}

impl<T: Serialize + DeserializeOwned> ResourceCrud<T> {
    pub fn for_schema(api: ApiClient, schema: &'static ResourceSchema) -> Self {
        Self {
            api,
            schema,
            _marker: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<T>> {
        self.api
            .get_json(self.schema.path, &query.to_params())
            .await
            .inspect_err(|e| log::error!("[Crud] list {} failed: {}", self.schema.path, e))
    }

    pub async fn get(&self, id: &str) -> ApiResult<T> {
        self.api.get_json(&self.schema.item_path(id), &[]).await
    }

    /// 创建；后端可能返回新记录，也可能只返回一条消息
    pub async fn create(&self, item: &T) -> ApiResult<Option<T>> {
        self.mutate(HttpMethod::Post, self.schema.path.to_string(), item)
            .await
    }

    pub async fn update(&self, id: &str, item: &T) -> ApiResult<Option<T>> {
        self.mutate(HttpMethod::Put, self.schema.item_path(id), item)
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api
            .delete(&self.schema.item_path(id))
            .await
            .inspect_err(|e| log::error!("[Crud] delete {} {} failed: {}", self.schema.path, id, e))
    }

    async fn mutate(&self, method: HttpMethod, path: String, item: &T) -> ApiResult<Option<T>> {
        let body = serde_json::to_value(item).map_err(|e| ApiError::Encode(e.to_string()))?;
        let resp = self
            .api
            .request(method, &path, Some(body), &[])
            .await
            .inspect_err(|e| log::error!("[Crud] {} {} failed: {}", method.as_str(), path, e))?;
        if !resp.ok() {
            let err = ApiError::from_response(resp.status, &resp.body);
            log::error!("[Crud] {} {} failed: {}", method.as_str(), path, err);
            return Err(err);
        }
        Ok(resp.json::<T>().ok())
    }

    /// 统计端点返回的原始 JSON；没有统计端点时为 `None`
    pub async fn stats(&self) -> ApiResult<Option<serde_json::Value>> {
        match self.schema.stats_path {
            Some(path) => self.api.get_json(path, &[]).await.map(Some),
            None => Ok(None),
        }
    }

    /// 并发请求列表与统计
    pub async fn list_with_stats(
        &self,
        query: &ListQuery,
    ) -> (ApiResult<Page<T>>, ApiResult<Option<serde_json::Value>>) {
        futures::join!(self.list(query), self.stats())
    }

    pub async fn create_and_refresh(&self, item: &T, query: &ListQuery) -> ApiResult<Page<T>> {
        self.create(item).await?;
        self.list(query).await
    }

    pub async fn update_and_refresh(&self, id: &str, item: &T, query: &ListQuery) -> ApiResult<Page<T>> {
        self.update(id, item).await?;
        self.list(query).await
    }

    pub async fn delete_and_refresh(&self, id: &str, query: &ListQuery) -> ApiResult<Page<T>> {
        self.delete(id).await?;
        self.list(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{BASE, client_with};
    use crate::config::ClientConfig;
    use crate::demo::DemoBackend;
    use crate::form::FormState;
    use crate::token::MemoryTokenStore;
    use campusdesk_shared::resources::Department;
    use campusdesk_shared::schema::{LEAVE_APPLICATIONS, STUDENTS};
    use serde_json::json;
    use std::sync::Arc;

    fn demo_api(paths: &[&str]) -> ApiClient {
        let backend = DemoBackend::new(BASE).serving(paths.iter().copied());
        ApiClient::new(
            ClientConfig::new(BASE),
            Arc::new(backend),
            Arc::new(MemoryTokenStore::with_token("t")),
        )
        .unwrap()
    }

    #[test]
    fn params_always_carry_page_and_limit() {
        let mut q = ListQuery::new(20);
        q.set_search("   ");
        q.set_filter("status", "");
        assert_eq!(
            q.to_params(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );

        q.page = 3;
        q.set_filter("status", "approved");
        q.set_search(" ada ");
        let params = q.to_params();
        assert_eq!(params[0], ("page".to_string(), "1".to_string()));
        assert!(params.contains(&("search".to_string(), "ada".to_string())));
        assert!(params.contains(&("status".to_string(), "approved".to_string())));
    }

    #[test]
    fn paging_is_bounded() {
        let mut q = ListQuery::new(10);
        assert!(!q.prev_page());
        assert!(q.next_page(2));
        assert!(!q.next_page(2));
        assert_eq!(q.page, 2);
        assert!(q.prev_page());
    }

    #[test]
    fn record_id_accepts_both_shapes() {
        assert_eq!(record_id(&json!({"id": 4})).as_deref(), Some("4"));
        assert_eq!(record_id(&json!({"_id": "x"})).as_deref(), Some("x"));
        assert_eq!(record_id(&json!({"id": ""})), None);
    }

    #[tokio::test]
    async fn create_then_list_reflects_new_item() {
        let api = demo_api(&["/departments"]);
        let crud: ResourceCrud<Department> = ResourceCrud::new(api);
        let query = ListQuery::new(10);
        let before = crud.list(&query).await.unwrap();

        let dept = Department {
            id: String::new(),
            code: "PHY".into(),
            name: "Physics".into(),
            head: None,
            established: None,
        };
        let page = crud.create_and_refresh(&dept, &query).await.unwrap();

        assert_eq!(page.items.len(), before.items.len() + 1);
        let created = page.items.iter().find(|d| d.code == "PHY").unwrap();
        assert!(!created.id.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_refresh_the_list() {
        let api = demo_api(&["/students"]);
        let crud: ResourceCrud = ResourceCrud::for_schema(api, &STUDENTS);
        let query = ListQuery::new(50);

        let created = crud
            .create(&json!({"student_id": "S-9", "name": "Bo", "email": "bo@uni.edu", "department": "Math"}))
            .await
            .unwrap()
            .unwrap();
        let id = record_id(&created).unwrap();

        let page = crud
            .update_and_refresh(&id, &json!({"name": "Bo Li"}), &query)
            .await
            .unwrap();
        let row = page.items.iter().find(|r| record_id(r).as_deref() == Some(id.as_str())).unwrap();
        assert_eq!(row["name"], "Bo Li");
        assert_eq!(row["department"], "Math");

        let page = crud.delete_and_refresh(&id, &query).await.unwrap();
        assert!(page.items.iter().all(|r| record_id(r).as_deref() != Some(id.as_str())));
    }

    #[tokio::test]
    async fn clearing_an_optional_field_on_edit_removes_it() {
        let api = demo_api(&["/students"]);
        let crud: ResourceCrud = ResourceCrud::for_schema(api, &STUDENTS);
        let query = ListQuery::new(50);

        let created = crud
            .create(&json!({"student_id": "S1", "name": "Bo", "email": "bo@uni.edu", "department": "Math", "phone": "555"}))
            .await
            .unwrap()
            .unwrap();
        let id = record_id(&created).unwrap();

        let mut form = FormState::from_record(&STUDENTS, &created);
        form.set("phone", "");
        let body = form.validate_for_update(&STUDENTS).unwrap();
        let page = crud.update_and_refresh(&id, &body, &query).await.unwrap();

        let row = page.items.iter().find(|r| record_id(r).as_deref() == Some(id.as_str())).unwrap();
        assert!(row.get("phone").is_none());
        assert_eq!(row["name"], "Bo");
    }

    #[test]
    fn page_is_clamped_after_the_last_page_empties() {
        let mut q = ListQuery::new(10);
        q.page = 3;
        assert!(q.clamp_to(2));
        assert_eq!(q.page, 2);
        assert!(!q.clamp_to(2));

        // 空列表仍停在第一页
        assert!(q.clamp_to(0));
        assert_eq!(q.page, 1);
        assert!(!q.clamp_to(0));
    }

    #[tokio::test]
    async fn list_sends_query_and_stats_concurrently() {
        let (api, mock, _) = client_with(Some("t"));
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/leave-applications",
            200,
            json!({"items": [{"id": 1, "status": "pending"}], "totalPages": 3}),
        );
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/leave-applications/stats",
            200,
            json!({"pending": 1, "approved": 0}),
        );
        let crud: ResourceCrud = ResourceCrud::for_schema(api, &LEAVE_APPLICATIONS);
        let mut query = ListQuery::new(5);
        query.set_filter("status", "pending");

        let (page, stats) = crud.list_with_stats(&query).await;

        let page = page.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(stats.unwrap().unwrap()["pending"], 1);
        let urls: Vec<_> = mock.sent().into_iter().map(|r| r.url).collect();
        assert!(urls.contains(&"http://api.test/leave-applications?page=1&limit=5&status=pending".to_string()));
    }

    #[tokio::test]
    async fn failed_mutation_does_not_refresh() {
        let (api, mock, _) = client_with(Some("t"));
        mock.mock_response(HttpMethod::Post, "http://api.test/students", 422, json!({"message": "duplicate"}));
        let crud: ResourceCrud = ResourceCrud::for_schema(api, &STUDENTS);

        let err = crud
            .create_and_refresh(&json!({"name": "x"}), &ListQuery::new(10))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "duplicate");
        assert_eq!(mock.sent().len(), 1);
    }

    #[test]
    fn list_state_replace_clears_loading() {
        let mut state: ListState<u32> = ListState {
            loading: true,
            ..Default::default()
        };
        state.replace(Page {
            items: vec![1, 2],
            total_pages: 1,
        });
        assert!(!state.loading);
        assert_eq!(state.items, vec![1, 2]);
    }
}
