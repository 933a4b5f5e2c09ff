//! 内存演示后端
//!
//! 后端尚未提供接口的页面（学期、选课、成绩单、文档）由这里接管。
//! `DemoBackend` 实现 `HttpClient`，按路径前缀拦截请求，其余请求交给真正的传输层。

use crate::error::ApiResult;
use crate::form::display_value;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::{read_lock, write_lock};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

const DEFAULT_LIMIT: usize = 10;

pub struct DemoBackend {
    /// 基地址中的路径部分，例如 `/api`
    base_path: String,
    tables: RwLock<HashMap<String, Vec<Value>>>,
    fallback: Option<Arc<dyn HttpClient>>,
}

impl DemoBackend {
    pub fn new(base_url: &str) -> Self {
        let base_path = Url::parse(base_url)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        Self {
            base_path,
            tables: RwLock::new(HashMap::new()),
            fallback: None,
        }
    }

    /// 带示例数据的占位页面后端
    pub fn seeded(base_url: &str) -> Self {
        let mut backend = Self::new(base_url).serving(campusdesk_shared::schema::placeholder_paths());
        for (path, rows) in seed_rows() {
            backend = backend.with_rows(path, rows);
        }
        backend
    }

    /// 接管这些资源路径（初始为空表）
    pub fn serving<'a>(self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        {
            let mut tables = write_lock(&self.tables);
            for path in paths {
                tables.entry(path.to_string()).or_default();
            }
        }
        self
    }

    /// 预置数据；没有 id 的行会分配一个
    pub fn with_rows(self, path: &str, rows: Vec<Value>) -> Self {
        {
            let mut tables = write_lock(&self.tables);
            let table = tables.entry(path.to_string()).or_default();
            table.extend(rows.into_iter().map(with_new_id));
        }
        self
    }

    /// 未接管的请求转发给另一个传输层
    pub fn with_fallback(mut self, fallback: Arc<dyn HttpClient>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// 把请求路径拆成 (资源路径, 可选 id)
    fn route(&self, url: &Url) -> Option<(String, Option<String>)> {
        let path = url.path();
        let path = path.strip_prefix(self.base_path.as_str()).unwrap_or(path);
        let path = path.trim_end_matches('/');
        let tables = read_lock(&self.tables);

        if tables.contains_key(path) {
            return Some((path.to_string(), None));
        }
        let (collection, id) = path.rsplit_once('/')?;
        if tables.contains_key(collection) && !id.is_empty() {
            return Some((collection.to_string(), Some(id.to_string())));
        }
        None
    }

    fn list(&self, collection: &str, url: &Url) -> HttpResponse {
        let mut page = 1usize;
        let mut limit = DEFAULT_LIMIT;
        let mut search = String::new();
        let mut filters = Vec::new();
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "page" => page = v.parse::<usize>().unwrap_or(1).max(1),
                "limit" => limit = v.parse::<usize>().unwrap_or(DEFAULT_LIMIT).max(1),
                "search" => search = v.trim().to_lowercase(),
                _ => filters.push((k.into_owned(), v.into_owned())),
            }
        }

        let tables = read_lock(&self.tables);
        let rows = tables.get(collection).map(Vec::as_slice).unwrap_or_default();
        let matched: Vec<&Value> = rows
            .iter()
            .filter(|row| search.is_empty() || matches_search(row, &search))
            .filter(|row| {
                filters
                    .iter()
                    .all(|(k, v)| row.get(k).map(display_value).as_deref() == Some(v.as_str()))
            })
            .collect();

        let total_pages = matched.len().div_ceil(limit).max(1);
        let items: Vec<&Value> = matched.into_iter().skip((page - 1) * limit).take(limit).collect();
        respond(200, json!({ "items": items, "totalPages": total_pages }))
    }

    fn create(&self, collection: &str, body: Option<&str>) -> HttpResponse {
        let Some(record) = parse_object(body) else {
            return respond(400, json!({ "message": "请求体必须是 JSON 对象" }));
        };
        let record = with_new_id(record);
        write_lock(&self.tables)
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        respond(201, record)
    }

    fn update(&self, collection: &str, id: &str, body: Option<&str>) -> HttpResponse {
        let Some(Value::Object(patch)) = parse_object(body) else {
            return respond(400, json!({ "message": "请求体必须是 JSON 对象" }));
        };
        let mut tables = write_lock(&self.tables);
        let row = tables
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)));
        match row {
            Some(Value::Object(existing)) => {
                for (k, v) in patch {
                    if k == "id" {
                        continue;
                    }
                    // null 表示清除该字段
                    if v.is_null() {
                        existing.remove(&k);
                    } else {
                        existing.insert(k, v);
                    }
                }
                respond(200, Value::Object(existing.clone()))
            }
            _ => not_found(),
        }
    }

    fn remove(&self, collection: &str, id: &str) -> HttpResponse {
        let mut tables = write_lock(&self.tables);
        let Some(rows) = tables.get_mut(collection) else {
            return not_found();
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() < before {
            respond(200, json!({ "message": "已删除" }))
        } else {
            not_found()
        }
    }

    fn find(&self, collection: &str, id: &str) -> HttpResponse {
        read_lock(&self.tables)
            .get(collection)
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(id)))
            .map(|row| respond(200, row.clone()))
            .unwrap_or_else(not_found)
    }
}

#[async_trait(?Send)]
impl HttpClient for DemoBackend {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let routed = Url::parse(&req.url)
            .ok()
            .and_then(|url| self.route(&url).map(|r| (url, r)));

        let Some((url, (collection, id))) = routed else {
            return match &self.fallback {
                Some(fallback) => fallback.send(req).await,
                None => Ok(not_found()),
            };
        };

        log::debug!("[Demo] {} {}", req.method.as_str(), req.url);
        let body = req.body.as_deref();
        Ok(match (req.method, id.as_deref()) {
            (HttpMethod::Get, None) => self.list(&collection, &url),
            (HttpMethod::Get, Some(id)) => self.find(&collection, id),
            (HttpMethod::Post, None) => self.create(&collection, body),
            (HttpMethod::Put, Some(id)) => self.update(&collection, id, body),
            (HttpMethod::Delete, Some(id)) => self.remove(&collection, id),
            _ => respond(405, json!({ "message": "Method Not Allowed" })),
        })
    }
}

fn respond(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

fn not_found() -> HttpResponse {
    respond(404, json!({ "message": "记录不存在" }))
}

fn parse_object(body: Option<&str>) -> Option<Value> {
    serde_json::from_str::<Value>(body?).ok().filter(Value::is_object)
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn with_new_id(mut row: Value) -> Value {
    if let Value::Object(map) = &mut row {
        if !map.get("id").is_some_and(|id| id.as_str().is_some_and(|s| !s.is_empty())) {
            map.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
    }
    row
}

fn matches_search(row: &Value, needle: &str) -> bool {
    row.as_object().is_some_and(|map| {
        map.iter()
            .filter(|(k, _)| k.as_str() != "id")
            .any(|(_, v)| display_value(v).to_lowercase().contains(needle))
    })
}

fn seed_rows() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        (
            "/semesters",
            vec![
                json!({"name": "2025 秋季", "start_date": "2025-09-01", "end_date": "2026-01-15", "status": "closed"}),
                json!({"name": "2026 春季", "start_date": "2026-02-23", "end_date": "2026-07-03", "status": "active"}),
                json!({"name": "2026 秋季", "start_date": "2026-09-07", "end_date": "2027-01-22", "status": "planned"}),
            ],
        ),
        (
            "/course-registrations",
            vec![
                json!({"course_code": "CS101", "semester": "2026 春季", "status": "enrolled"}),
                json!({"course_code": "MA201", "semester": "2026 春季", "status": "waitlisted"}),
            ],
        ),
        (
            "/transcripts",
            vec![json!({"student_id": "S-1001", "copies": 2, "delivery": "pickup", "status": "ready"})],
        ),
        (
            "/documents",
            vec![
                json!({"title": "在读证明", "category": "certificate", "status": "ready"}),
                json!({"title": "缓考申请表", "category": "form", "status": "requested"}),
                json!({"title": "学生手册", "category": "policy", "status": "ready", "url": "https://example.edu/handbook.pdf"}),
            ],
        ),
    ]
}
