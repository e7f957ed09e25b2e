//! Compiled-in HTML templates with `{{placeholder}}` substitution.

use crate::models::Task;

const LOGIN_TEMPLATE: &str = include_str!("../../templates/login.html");
const REGISTER_TEMPLATE: &str = include_str!("../../templates/register.html");
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

pub fn login_page(error: Option<&str>) -> String {
    LOGIN_TEMPLATE.replace("{{flash}}", &flash(error))
}

pub fn register_page(error: Option<&str>) -> String {
    REGISTER_TEMPLATE.replace("{{flash}}", &flash(error))
}

pub fn index_page(username: &str, tasks: &[Task]) -> String {
    let rows = tasks
        .iter()
        .map(|task| {
            let id = escape(&task.id);
            format!(
                r#"            <tr>
                <td>{title}</td>
                <td>{description}</td>
                <td>
                    <form method="post" action="/tasks/{id}">
                        <input type="text" name="status" value="{status}">
                        <button type="submit">Update</button>
                    </form>
                </td>
                <td>{created}</td>
                <td>
                    <form method="post" action="/tasks/{id}/delete">
                        <button type="submit">Delete</button>
                    </form>
                </td>
            </tr>"#,
                title = escape(&task.title),
                description = escape(&task.description),
                status = escape(&task.status),
                created = task.created_at.format("%Y-%m-%d %H:%M:%S"),
                id = id,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    INDEX_TEMPLATE
        .replace("{{username}}", &escape(username))
        .replace("{{task_count}}", &tasks.len().to_string())
        .replace("{{tasks}}", &rows)
}

fn flash(error: Option<&str>) -> String {
    match error {
        Some(msg) if !msg.is_empty() => format!(r#"<p class="flash">{}</p>"#, escape(msg)),
        _ => String::new(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            // keeps user text from forming `{{placeholder}}`s
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}
