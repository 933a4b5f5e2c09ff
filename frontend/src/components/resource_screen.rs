//! 通用资源页面
//!
//! 列表、搜索、过滤、分页、新建/编辑、删除确认、详情、统计与导出。
//! 查询条件每次变化都重新请求列表；增删改成功后无条件重新请求。

use crate::auth::use_auth;
use crate::components::notice::{Notifier, use_notifier};
use crate::components::resource_form::{FormTarget, ResourceForm};
use crate::web::download;
use campusdesk::form::display_value;
use campusdesk::{ApiResult, ListQuery, ListState, Record, ResourceCrud, record_id, report};
use campusdesk_shared::{Page, ResourceSchema};
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;

#[derive(Clone, Copy)]
enum ExportFormat {
    Csv,
    Json,
}

/// 写入列表结果；删除清空最后一页时退回到仍有数据的页
fn apply_page(list: RwSignal<ListState<Record>>, query: RwSignal<ListQuery>, page: Page<Record>) {
    let total = page.total_pages;
    let _ = list.try_update(|l| l.replace(page));
    if query.try_with_untracked(|q| q.page > total.max(1)) == Some(true) {
        let _ = query.try_update(|q| {
            q.clamp_to(total);
        });
    }
}

/// 请求序号：只有最后发出的列表请求能写入结果
#[derive(Clone, Copy)]
struct Generation(StoredValue<u64>);

impl Generation {
    fn new() -> Self {
        Self(StoredValue::new(0))
    }

    fn next(self) -> u64 {
        let ticket = self.0.get_value() + 1;
        self.0.set_value(ticket);
        ticket
    }

    fn is_current(self, ticket: u64) -> bool {
        self.0.try_with_value(|g| *g == ticket).unwrap_or(false)
    }
}

/// 变更请求完成后更新列表并提示
fn settle(
    list: RwSignal<ListState<Record>>,
    query: RwSignal<ListQuery>,
    notifier: Notifier,
    result: ApiResult<Page<Record>>,
    done: &str,
) {
    match result {
        Ok(page) => {
            apply_page(list, query, page);
            notifier.success(done);
        }
        Err(e) => {
            let _ = list.try_update(|l| l.loading = false);
            notifier.error(format!("操作失败: {}", e.message()));
        }
    }
}

fn cell(record: &Record, name: &str) -> String {
    record.get(name).map(display_value).unwrap_or_default()
}

#[component]
fn StatsPanel(
    schema: &'static ResourceSchema,
    stats: RwSignal<Option<Value>>,
    list: RwSignal<ListState<Record>>,
) -> impl IntoView {
    // 统计端点返回的结构不固定，只展示顶层标量
    let entries = move || {
        stats.with(|s| match s {
            Some(Value::Object(map)) => map
                .iter()
                .filter(|(_, v)| !v.is_object() && !v.is_array())
                .map(|(k, v)| (k.clone(), display_value(v)))
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    };

    let tally = move || {
        let filter = schema.filters.first()?;
        let counts = list.with(|l| report::tally_by(&l.items, filter.name));
        (!counts.is_empty()).then_some((filter.label, counts))
    };

    view! {
        <Show when=move || !entries().is_empty()>
            <div class="stats shadow bg-base-100 w-full overflow-x-auto">
                <For
                    each=entries
                    key=|(k, _)| k.clone()
                    children=|(k, v)| view! {
                        <div class="stat">
                            <div class="stat-title">{k}</div>
                            <div class="stat-value text-primary text-2xl">{v}</div>
                        </div>
                    }
                />
            </div>
        </Show>

        {move || tally().map(|(label, counts)| {
            let max = counts.values().copied().max().unwrap_or(1).max(1);
            view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body py-4">
                        <h4 class="font-semibold">{format!("按{}统计（当前页）", label)}</h4>
                        {counts
                            .into_iter()
                            .map(|(key, n)| view! {
                                <div class="flex items-center gap-2">
                                    <span class="w-24 text-sm truncate">{key}</span>
                                    <progress
                                        class="progress progress-primary flex-1"
                                        value=(n * 100 / max).to_string()
                                        max="100"
                                    ></progress>
                                    <span class="text-sm w-8 text-right">{n}</span>
                                </div>
                            })
                            .collect_view()}
                    </div>
                </div>
            }
        })}
    }
}

#[component]
pub fn ResourceScreen(schema: &'static ResourceSchema) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let crud = StoredValue::new(ResourceCrud::<Record>::for_schema(auth.api(), schema));

    let query = RwSignal::new(ListQuery::new(auth.config().page_size));
    let list = RwSignal::new(ListState::<Record>::default());
    let stats = RwSignal::new(None::<Value>);
    let search_input = RwSignal::new(String::new());
    let form_target = RwSignal::new(None::<FormTarget>);
    let detail = RwSignal::new(None::<Record>);
    let pending_delete = RwSignal::new(None::<String>);
    let generation = Generation::new();

    // 1. 查询条件变化 -> 并发请求列表与统计
    Effect::new(move |_| {
        let q = query.get();
        let crud = crud.get_value();
        let ticket = generation.next();
        list.update(|l| l.loading = true);
        spawn_local(async move {
            let (page, summary) = crud.list_with_stats(&q).await;
            if !generation.is_current(ticket) {
                return;
            }
            match page {
                Ok(page) => apply_page(list, query, page),
                Err(e) => {
                    let _ = list.try_update(|l| l.loading = false);
                    notifier.error(format!("加载{}失败: {}", schema.title, e.message()));
                }
            }
            match summary {
                Ok(summary) => {
                    let _ = stats.try_set(summary);
                }
                Err(e) => log::warn!("[Screen] stats for {} failed: {}", schema.path, e),
            }
        });
    });

    // 2. 新建 / 编辑
    let on_submit = Callback::new(move |(id, record): (Option<String>, Record)| {
        let crud = crud.get_value();
        let q = query.get_untracked();
        let ticket = generation.next();
        spawn_local(async move {
            let result = match id {
                Some(id) => crud.update_and_refresh(&id, &record, &q).await,
                None => crud.create_and_refresh(&record, &q).await,
            };
            if result.is_ok() && !generation.is_current(ticket) {
                notifier.success("已保存");
                return;
            }
            settle(list, query, notifier, result, "已保存");
        });
    });

    // 3. 删除
    let confirm_delete = move |_| {
        let Some(id) = pending_delete.get_untracked() else {
            return;
        };
        pending_delete.set(None);
        let crud = crud.get_value();
        let q = query.get_untracked();
        let ticket = generation.next();
        spawn_local(async move {
            let result = crud.delete_and_refresh(&id, &q).await;
            if result.is_ok() && !generation.is_current(ticket) {
                notifier.success("已删除");
                return;
            }
            settle(list, query, notifier, result, "已删除");
        });
    };

    // 4. 详情
    let open_detail = move |id: String| {
        let crud = crud.get_value();
        spawn_local(async move {
            match crud.get(&id).await {
                Ok(record) => {
                    let _ = detail.try_set(Some(record));
                }
                Err(e) => notifier.error(format!("加载详情失败: {}", e.message())),
            }
        });
    };

    // 5. 导出当前页
    let export = move |format: ExportFormat| {
        let items = list.with_untracked(|l| l.items.clone());
        let today = chrono::Utc::now().date_naive();
        let (ext, mime, content) = match format {
            ExportFormat::Csv => ("csv", "text/csv;charset=utf-8", report::to_csv(schema, &items)),
            ExportFormat::Json => ("json", "application/json", report::to_json_pretty(&items)),
        };
        let filename = report::export_filename(schema, today, ext);
        if let Err(e) = download::save_text(&filename, mime, &content) {
            notifier.error(format!("导出失败: {}", e));
        }
    };

    let on_search = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let search = search_input.get_untracked();
        query.update(|q| q.set_search(search));
    };

    let columns = schema.listed_fields().count() + 1;
    let total_pages = move || list.with(|l| l.total_pages.max(1));

    view! {
        <div class="space-y-4">
            // 标题栏
            <div class="flex flex-wrap items-center justify-between gap-2">
                <div class="flex items-center gap-2">
                    <h2 class="text-2xl font-bold">{schema.title}</h2>
                    {schema.placeholder.then_some(view! {
                        <span class="badge badge-warning">"演示数据"</span>
                    })}
                </div>
                <div class="flex gap-2">
                    <button class="btn btn-ghost btn-sm" on:click=move |_| export(ExportFormat::Csv)>"导出 CSV"</button>
                    <button class="btn btn-ghost btn-sm" on:click=move |_| export(ExportFormat::Json)>"导出 JSON"</button>
                    <button class="btn btn-primary btn-sm" on:click=move |_| form_target.set(Some(FormTarget::Create))>
                        "新建"
                    </button>
                </div>
            </div>

            <StatsPanel schema=schema stats=stats list=list />

            // 搜索与过滤
            <div class="flex flex-wrap gap-2">
                <form class="join" on:submit=on_search>
                    <input
                        class="input input-bordered input-sm join-item"
                        placeholder="搜索..."
                        prop:value=move || search_input.get()
                        on:input=move |ev| search_input.set(event_target_value(&ev))
                    />
                    <button class="btn btn-sm join-item" type="submit">"搜索"</button>
                </form>
                {schema
                    .filters
                    .iter()
                    .map(|filter| view! {
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                query.update(|q| q.set_filter(filter.name, value));
                            }
                        >
                            <option value="">{format!("全部{}", filter.label)}</option>
                            {filter.options.iter().map(|o| view! { <option value=*o>{*o}</option> }).collect_view()}
                        </select>
                    })
                    .collect_view()}
            </div>

            // 列表
            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                {schema.listed_fields().map(|f| view! { <th>{f.label}</th> }).collect_view()}
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || list.with(|l| l.loading && l.items.is_empty())>
                                <tr>
                                    <td colspan=columns class="text-center py-8 text-base-content/50">
                                        <span class="loading loading-spinner loading-md"></span> " 加载中..."
                                    </td>
                                </tr>
                            </Show>
                            <Show when=move || list.with(|l| !l.loading && l.items.is_empty())>
                                <tr>
                                    <td colspan=columns class="text-center py-8 text-base-content/50">"暂无数据"</td>
                                </tr>
                            </Show>
                            <For
                                each=move || list.with(|l| l.items.clone())
                                key=|row| row.to_string()
                                children=move |row| {
                                    let id = record_id(&row);
                                    let cells = schema
                                        .listed_fields()
                                        .map(|f| view! { <td>{cell(&row, f.name)}</td> })
                                        .collect_view();
                                    let actions = id.map(|id| {
                                        let detail_id = id.clone();
                                        let edit_id = id.clone();
                                        let edit_row = row.clone();
                                        view! {
                                            <div class="flex gap-1 justify-end">
                                                <button class="btn btn-ghost btn-xs" on:click=move |_| open_detail(detail_id.clone())>
                                                    "详情"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |_| form_target.set(Some(FormTarget::Edit {
                                                        id: edit_id.clone(),
                                                        record: edit_row.clone(),
                                                    }))
                                                >
                                                    "编辑"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs text-error"
                                                    on:click=move |_| pending_delete.set(Some(id.clone()))
                                                >
                                                    "删除"
                                                </button>
                                            </div>
                                        }
                                    });
                                    view! {
                                        <tr>
                                            {cells}
                                            <td>{actions}</td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>

            // 分页
            <div class="flex items-center justify-center gap-2">
                <button
                    class="btn btn-sm"
                    disabled=move || query.with(|q| q.page <= 1)
                    on:click=move |_| query.update(|q| {
                        q.prev_page();
                    })
                >
                    "上一页"
                </button>
                <span class="text-sm">
                    {move || format!("第 {} / {} 页", query.with(|q| q.page), total_pages())}
                </span>
                <button
                    class="btn btn-sm"
                    disabled=move || query.with(|q| q.page) >= total_pages()
                    on:click=move |_| {
                        let total = total_pages();
                        query.update(|q| {
                            q.next_page(total);
                        });
                    }
                >
                    "下一页"
                </button>
            </div>
        </div>

        <ResourceForm schema=schema target=form_target on_submit=on_submit />

        // 详情
        {move || detail.get().map(|record| view! {
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">{format!("{} · 详情", schema.title)}</h3>
                    <table class="table mt-4">
                        <tbody>
                            {schema
                                .fields
                                .iter()
                                .map(|f| view! {
                                    <tr>
                                        <th class="w-32">{f.label}</th>
                                        <td class="whitespace-pre-wrap">{cell(&record, f.name)}</td>
                                    </tr>
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                    <div class="modal-action">
                        <button class="btn" on:click=move |_| detail.set(None)>"关闭"</button>
                    </div>
                </div>
            </div>
        })}

        // 删除确认
        <Show when=move || pending_delete.with(Option::is_some)>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">"确认删除"</h3>
                    <p class="py-4">"删除后无法恢复，确定继续吗？"</p>
                    <div class="modal-action">
                        <button class="btn btn-ghost" on:click=move |_| pending_delete.set(None)>"取消"</button>
                        <button class="btn btn-error" on:click=confirm_delete>"删除"</button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
