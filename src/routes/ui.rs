//! HTML fragment endpoints
//!
//! Server-rendered pieces swapped into the page by HTMX. Every mutation
//! answers with the refreshed table it touched and raises the
//! `customers-changed` event so the other table reloads too.

use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;
use uuid::Uuid;

use crate::models::{ClientPayload, ClientView, SalesRep, SalesRepPayload, SalesRepView};
use crate::server::{ApiError, AppState, ErrorBody, HtmlError, PathId};

const CHANGED_EVENT: (&str, &str) = ("HX-Trigger", "customers-changed");

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/ui/clients", get(clients_table).post(create_client))
        .route(
            "/ui/clients/{id}",
            get(edit_client).put(update_client).delete(delete_client),
        )
        .route("/ui/salesreps", get(sales_reps_table).post(create_sales_rep))
        .route("/ui/salesreps/options", get(sales_rep_options))
        .route(
            "/ui/salesreps/{id}",
            get(edit_sales_rep).put(update_sales_rep).delete(delete_sales_rep),
        )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn clients_table(State(state): State<AppState>) -> Result<Html<String>, HtmlError> {
    Ok(render_clients_table(&state.clients.list_all().await?))
}

async fn sales_reps_table(State(state): State<AppState>) -> Result<Html<String>, HtmlError> {
    Ok(render_sales_reps_table(&state.sales_reps.list_all().await?))
}

async fn sales_rep_options(State(state): State<AppState>) -> Result<Html<String>, HtmlError> {
    Ok(render_sales_rep_options(&state.sales_reps.list_all().await?))
}

async fn create_client(
    State(state): State<AppState>,
    Form(payload): Form<ClientPayload>,
) -> Result<impl IntoResponse, HtmlError> {
    let input = payload.validate()?;
    state.clients.create(input).await?;
    let table = render_clients_table(&state.clients.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

async fn edit_client(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
) -> Result<Html<String>, HtmlError> {
    let PathId(id) = id?;
    let client = state.clients.get_details(id).await?.ok_or(ApiError::NotFound)?;
    let reps = state.sales_reps.list_all().await?;
    Ok(render_client_form(&client, &reps))
}

async fn update_client(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
    Form(payload): Form<ClientPayload>,
) -> Result<impl IntoResponse, HtmlError> {
    let PathId(id) = id?;
    let input = payload.validate()?;
    if !state.clients.update(id, input).await? {
        return Err(ApiError::NotFound.into());
    }
    let table = render_clients_table(&state.clients.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

async fn delete_client(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
) -> Result<impl IntoResponse, HtmlError> {
    let PathId(id) = id?;
    if !state.clients.delete(id).await? {
        return Err(ApiError::NotFound.into());
    }
    let table = render_clients_table(&state.clients.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

async fn create_sales_rep(
    State(state): State<AppState>,
    Form(payload): Form<SalesRepPayload>,
) -> Result<impl IntoResponse, HtmlError> {
    let input = payload.validate()?;
    state.sales_reps.create(input).await?;
    let table = render_sales_reps_table(&state.sales_reps.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

async fn edit_sales_rep(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
) -> Result<Html<String>, HtmlError> {
    let PathId(id) = id?;
    let rep = state.sales_reps.get_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(render_sales_rep_form(&rep))
}

async fn update_sales_rep(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
    Form(payload): Form<SalesRepPayload>,
) -> Result<impl IntoResponse, HtmlError> {
    let PathId(id) = id?;
    let input = payload.validate()?;
    if !state.sales_reps.update(id, input).await? {
        return Err(ApiError::NotFound.into());
    }
    let table = render_sales_reps_table(&state.sales_reps.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

async fn delete_sales_rep(
    State(state): State<AppState>,
    id: Result<PathId<Uuid>, ApiError>,
) -> Result<impl IntoResponse, HtmlError> {
    let PathId(id) = id?;
    if !state.sales_reps.delete(id).await? {
        return Err(ApiError::NotFound.into());
    }
    let table = render_sales_reps_table(&state.sales_reps.list_all().await?);
    Ok(([CHANGED_EVENT], table))
}

pub fn render_clients_table(clients: &[ClientView]) -> Html<String> {
    if clients.is_empty() {
        return Html(r#"<p class="empty">No clients yet.</p>"#.to_string());
    }

    let mut out = String::from(
        "<table>\n<thead><tr><th>Name</th><th>Contact</th><th>Visit</th><th>Sales rep</th><th>Notes</th><th></th></tr></thead>\n<tbody>\n",
    );
    for c in clients {
        let rep = c
            .sales_rep
            .as_ref()
            .map(|r| text(&r.name).into_owned())
            .unwrap_or_else(|| "(unknown)".to_string());
        let _ = writeln!(
            out,
            r##"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><button hx-get="/ui/clients/{}" hx-target="#editor">Edit</button> <button hx-delete="/ui/clients/{}" hx-target="#clients" hx-confirm="Delete client {}?">Delete</button></td></tr>"##,
            text(&c.name),
            text(&c.contact_email),
            c.visit_date.format("%Y-%m-%d %H:%M"),
            rep,
            text(c.notes.as_deref().unwrap_or("")),
            c.id,
            c.id,
            attr(&c.name),
        );
    }
    out.push_str("</tbody>\n</table>");
    Html(out)
}

pub fn render_sales_reps_table(reps: &[SalesRepView]) -> Html<String> {
    if reps.is_empty() {
        return Html(r#"<p class="empty">No sales reps yet.</p>"#.to_string());
    }

    let mut out = String::from(
        "<table>\n<thead><tr><th>Name</th><th>Email</th><th>Phone</th><th>Clients</th><th></th></tr></thead>\n<tbody>\n",
    );
    for r in reps {
        let clients = r
            .clients
            .iter()
            .map(|c| text(&c.name).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            r##"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><button hx-get="/ui/salesreps/{}" hx-target="#editor">Edit</button> <button hx-delete="/ui/salesreps/{}" hx-target="#sales-reps" hx-confirm="Delete sales rep {}?">Delete</button></td></tr>"##,
            text(&r.name),
            text(&r.email),
            text(r.phone.as_deref().unwrap_or("")),
            clients,
            r.id,
            r.id,
            attr(&r.name),
        );
    }
    out.push_str("</tbody>\n</table>");
    Html(out)
}

pub fn render_sales_rep_options(reps: &[SalesRepView]) -> Html<String> {
    let mut out = String::new();
    for r in reps {
        let _ = writeln!(out, r#"<option value="{}">{}</option>"#, r.id, text(&r.name));
    }
    Html(out)
}

/// Prefilled form that replaces the stored client on submit.
pub fn render_client_form(client: &ClientView, reps: &[SalesRepView]) -> Html<String> {
    let mut options = String::new();
    for r in reps {
        let selected = if r.id == client.sales_rep_id { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{}"{}>{}</option>"#,
            r.id,
            selected,
            text(&r.name)
        );
    }
    Html(format!(
        r##"<form hx-put="/ui/clients/{id}" hx-target="#clients" hx-on::after-request="if(event.detail.successful) this.remove()">
    <input name="name" value="{name}" required maxlength="200">
    <input name="contactEmail" type="email" value="{email}" required maxlength="200">
    <input name="visitDate" type="datetime-local" step="1" value="{visit}" required>
    <select name="salesRepId" required>{options}</select>
    <textarea name="notes" maxlength="1000">{notes}</textarea>
    <button type="submit">Save client</button>
</form>"##,
        id = client.id,
        name = attr(&client.name),
        email = attr(&client.contact_email),
        visit = client.visit_date.format("%Y-%m-%dT%H:%M:%S"),
        options = options,
        notes = text(client.notes.as_deref().unwrap_or("")),
    ))
}

pub fn render_sales_rep_form(rep: &SalesRep) -> Html<String> {
    Html(format!(
        r##"<form hx-put="/ui/salesreps/{id}" hx-target="#sales-reps" hx-on::after-request="if(event.detail.successful) this.remove()">
    <input name="name" value="{name}" required maxlength="200">
    <input name="email" type="email" value="{email}" required maxlength="200">
    <input name="phone" value="{phone}" maxlength="50">
    <button type="submit">Save sales rep</button>
</form>"##,
        id = rep.id,
        name = attr(&rep.name),
        email = attr(&rep.email),
        phone = attr(rep.phone.as_deref().unwrap_or("")),
    ))
}

pub fn render_error(body: &ErrorBody) -> Html<String> {
    let mut out = format!(r#"<div class="error" role="alert"><p>{}</p>"#, text(&body.message));
    if !body.errors.is_empty() {
        out.push_str("<ul>");
        for e in &body.errors {
            let _ = write!(out, "<li>{}: {}</li>", e.field, text(&e.message));
        }
        out.push_str("</ul>");
    }
    if !body.clients.is_empty() {
        out.push_str(r#"<ul class="blocking">"#);
        for name in &body.clients {
            let _ = write!(out, "<li>{}</li>", text(name));
        }
        out.push_str("</ul>");
    }
    out.push_str("</div>");
    Html(out)
}

const INDEX_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ACME | Customers</title>
    <script src="https://unpkg.com/htmx.org@2.0.4"></script>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; margin: 0 auto; max-width: 1100px; padding: 20px; color: #222; }
        h2 { font-size: 15px; text-transform: uppercase; letter-spacing: 1px; color: #555; }
        table { border-collapse: collapse; width: 100%; margin-bottom: 15px; }
        th, td { border: 1px solid #ddd; padding: 6px 8px; text-align: left; font-size: 13px; }
        th { background: #f4f4f4; }
        form { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 10px; }
        input, select, textarea, button { font-size: 13px; padding: 4px 8px; }
        .error { background: #fff0f0; border: 1px solid #e99; padding: 8px 12px; margin-bottom: 10px; }
        .empty { color: #888; font-style: italic; }
    </style>
</head>
<body>
    <h1>Customers</h1>
    <div id="flash"></div>
    <div id="editor"></div>

    <section>
        <h2>Sales reps</h2>
        <form hx-post="/ui/salesreps" hx-target="#sales-reps" hx-on::after-request="if(event.detail.successful) this.reset()">
            <input name="name" placeholder="Name" required maxlength="200">
            <input name="email" type="email" placeholder="Email" required maxlength="200">
            <input name="phone" placeholder="Phone" maxlength="50">
            <button type="submit">Add sales rep</button>
        </form>
        <div id="sales-reps" hx-get="/ui/salesreps" hx-trigger="load, customers-changed from:body"></div>
    </section>

    <section>
        <h2>Clients</h2>
        <form hx-post="/ui/clients" hx-target="#clients" hx-on::after-request="if(event.detail.successful) this.reset()">
            <input name="name" placeholder="Name" required maxlength="200">
            <input name="contactEmail" type="email" placeholder="Contact email" required maxlength="200">
            <input name="visitDate" type="datetime-local" required>
            <select name="salesRepId" hx-get="/ui/salesreps/options" hx-trigger="load, customers-changed from:body" required></select>
            <textarea name="notes" placeholder="Notes" maxlength="1000"></textarea>
            <button type="submit">Add client</button>
        </form>
        <div id="clients" hx-get="/ui/clients" hx-trigger="load, customers-changed from:body"></div>
    </section>

    <script>
        document.body.addEventListener('htmx:beforeSwap', (e) => {
            if (e.detail.xhr.status >= 400) {
                e.detail.shouldSwap = true;
                e.detail.target = document.getElementById('flash');
            } else if (e.detail.target.id !== 'flash') {
                document.getElementById('flash').innerHTML = '';
            }
        });
    </script>
</body>
</html>"##;
