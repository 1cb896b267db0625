//! HTML rendering for the to-do page.
//!
//! The page shell is embedded at compile time using `include_str!`; task
//! rows are built with `format!` and every title is escaped.

use crate::types::Task;

/// The page shell with `{{task_list}}` and `{{version}}` placeholders.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Escape text for use in HTML content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_task(task: &Task) -> String {
    let complete_link = if task.is_done {
        String::new()
    } else {
        format!(r#"<a href="/complete/{}">Complete</a>"#, task.id)
    };

    format!(
        r#"<li class="task-{status}" id="task-{id}"><span class="title">{title}</span><span class="badge badge-{status}">{status}</span>{complete_link}<a href="/delete/{id}">Delete</a></li>"#,
        id = task.id,
        status = task.status_label(),
        title = html_escape(&task.title),
        complete_link = complete_link,
    )
}

/// Render the task list fragment.
pub fn render_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return r#"<div class="empty-state">Nothing to do yet</div>"#.to_string();
    }

    let mut html = String::from(r#"<ul class="tasks">"#);
    for task in tasks {
        html.push_str(&render_task(task));
    }
    html.push_str("</ul>");
    html
}

/// Render the full index page.
pub fn render_index(tasks: &[Task]) -> String {
    INDEX_TEMPLATE
        .replace("{{task_list}}", &render_task_list(tasks))
        .replace("{{version}}", env!("CARGO_PKG_VERSION"))
}

/// Render a minimal error page.
pub fn render_error(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Secure To-Do List</title></head><body><h1>Something went wrong</h1><p class="error-message">{}</p><p><a href="/">Back to the list</a></p></body></html>"#,
        html_escape(message)
    )
}
