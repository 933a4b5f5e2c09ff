use crate::auth::use_auth;
use campusdesk_shared::User;
use leptos::prelude::*;

fn rows(user: &User) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("姓名", user.display_name().to_string()),
        ("邮箱", user.email.clone()),
        ("身份", user.role.label().to_string()),
    ];
    if let Some(profile) = &user.profile {
        let optional = [
            ("学号", profile.student_id.clone()),
            ("院系", profile.department.clone()),
            ("电话", profile.phone.clone()),
            ("年级", profile.year.clone()),
        ];
        rows.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
    }
    rows
}

/// 个人资料（只读）
#[component]
pub fn ProfilePanel() -> impl IntoView {
    let user = use_auth().user_signal();

    move || {
        user.get().map(|user| {
            let avatar = user.profile.as_ref().and_then(|p| p.avatar_url.clone());
            let initial = user.display_name().chars().next().unwrap_or('?').to_string();
            view! {
                <div class="card bg-base-100 shadow-xl max-w-2xl">
                    <div class="card-body">
                        <div class="flex items-center gap-4">
                            {match avatar {
                                Some(src) => view! {
                                    <div class="avatar"><div class="w-16 rounded-full"><img src=src /></div></div>
                                }.into_any(),
                                None => view! {
                                    <div class="avatar placeholder">
                                        <div class="bg-neutral text-neutral-content w-16 rounded-full">
                                            <span class="text-2xl">{initial}</span>
                                        </div>
                                    </div>
                                }.into_any(),
                            }}
                            <h3 class="card-title">{user.display_name().to_string()}</h3>
                        </div>
                        <table class="table mt-4">
                            <tbody>
                                {rows(&user)
                                    .into_iter()
                                    .map(|(label, value)| view! {
                                        <tr>
                                            <th class="w-32">{label}</th>
                                            <td>{value}</td>
                                        </tr>
                                    })
                                    .collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>
            }
        })
    }
}
