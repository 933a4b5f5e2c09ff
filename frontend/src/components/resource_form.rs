//! 资源表单模态框
//!
//! 字段按资源描述渲染；提交前在本地校验，校验通过才交给调用方。

use campusdesk::{FormState, Record};
use campusdesk_shared::{FieldKind, FieldSpec, ResourceSchema};
use leptos::prelude::*;

/// 表单打开的目的
#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Create,
    Edit { id: String, record: Record },
}

fn input_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Email => "email",
        FieldKind::Number => "number",
        FieldKind::Date => "date",
        FieldKind::Url => "url",
        _ => "text",
    }
}

fn field_input(field: &'static FieldSpec, form: RwSignal<FormState>) -> AnyView {
    let name = field.name;
    let value = move || form.with(|f| f.get(name).to_string());
    let on_input = move |ev: leptos::ev::Event| {
        let v = event_target_value(&ev);
        form.update(|f| f.set(name, v));
    };

    let control = match field.kind {
        FieldKind::LongText => view! {
            <textarea
                id=name
                class="textarea textarea-bordered w-full"
                prop:value=value
                on:input=on_input
            ></textarea>
        }
        .into_any(),
        FieldKind::Select(options) => view! {
            <select id=name class="select select-bordered w-full" prop:value=value on:change=on_input>
                <option value="">"请选择"</option>
                {options
                    .iter()
                    .map(|o| view! { <option value=*o>{*o}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        kind => view! {
            <input
                id=name
                type=input_type(kind)
                step=if kind == FieldKind::Number { Some("any") } else { None }
                class="input input-bordered w-full"
                prop:value=value
                on:input=on_input
            />
        }
        .into_any(),
    };

    view! {
        <div class="form-control">
            <label for=name class="label">
                <span class="label-text">
                    {field.label}
                    {field.required.then_some(view! { <span class="text-error">" *"</span> })}
                </span>
            </label>
            {control}
        </div>
    }
    .into_any()
}

#[component]
pub fn ResourceForm(
    schema: &'static ResourceSchema,
    target: RwSignal<Option<FormTarget>>,
    #[prop(into)] on_submit: Callback<(Option<String>, Record)>,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let form = RwSignal::new(FormState::empty(schema));
    let errors = RwSignal::new(Vec::<String>::new());

    // 打开时重置或回填，并同步模态框的显示状态
    Effect::new(move |_| {
        let current = target.get();
        match &current {
            Some(FormTarget::Create) => form.set(FormState::empty(schema)),
            Some(FormTarget::Edit { record, .. }) => form.set(FormState::from_record(schema, record)),
            None => {}
        }
        errors.set(Vec::new());

        if let Some(dialog) = dialog_ref.get() {
            if current.is_some() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let id = target.with_untracked(|t| match t {
            Some(FormTarget::Edit { id, .. }) => Some(id.clone()),
            _ => None,
        });
        // 编辑时留空的可选字段需要显式清除
        let editing = id.is_some();
        let checked = form.with_untracked(|f| {
            if editing {
                f.validate_for_update(schema)
            } else {
                f.validate(schema)
            }
        });
        match checked {
            Ok(record) => {
                on_submit.run((id, record));
                target.set(None);
            }
            Err(errs) => errors.set(errs.iter().map(ToString::to_string).collect()),
        }
    };

    let heading = move || {
        target.with(|t| match t {
            Some(FormTarget::Edit { .. }) => format!("编辑 · {}", schema.title),
            _ => format!("新建 · {}", schema.title),
        })
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| target.set(None)>
            <div class="modal-box max-w-2xl">
                <h3 class="font-bold text-lg">{heading}</h3>

                <form on:submit=submit class="space-y-4 mt-4">
                    <Show when=move || errors.with(|e| !e.is_empty())>
                        <div role="alert" class="alert alert-error text-sm">
                            <ul>
                                {move || errors.get().into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
                            </ul>
                        </div>
                    </Show>

                    {schema.fields.iter().map(|field| field_input(field, form)).collect_view()}

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| target.set(None)>
                            "取消"
                        </button>
                        <button type="submit" class="btn btn-primary">"保存"</button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
