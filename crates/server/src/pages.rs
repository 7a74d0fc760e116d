use shared::protocol::ListPage;

pub fn home_page() -> String {
    render_page("Start a new To-Do list", "/lists/new", "")
}

pub fn list_page(list: &ListPage) -> String {
    let mut rows = String::new();
    for row in &list.items {
        rows.push_str(&format!(
            "        <tr><td>{}: {}</td></tr>\n",
            row.rank,
            escape(&row.text)
        ));
    }
    let table = format!("    <table id=\"table_to-do_list\">\n{rows}    </table>\n");
    let action = format!("/lists/{}/add_item", list.list_id.0);
    render_page("Your To-Do list", &action, &table)
}

fn render_page(heading: &str, form_action: &str, table: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>To-Do lists</title>
</head>
<body>
    <h1>{heading}</h1>
    <form method="POST" action="{form_action}">
        <label for="new_item_input">Add a to-do item</label>
        <input id="new_item_input" name="item_text" placeholder="Enter a to-do item" />
    </form>
{table}</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
