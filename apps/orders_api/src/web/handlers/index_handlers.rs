// apps/orders_api/src/web/handlers/index_handlers.rs

use actix_web::{web, HttpResponse};
use orderflow::store::RECENT_ORDERS_LIMIT;
use orderflow::OrderRecord;
use std::fmt::Write;
use tracing::{error, instrument};

use crate::state::AppState;

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Orders demo</title>
    <style>
      body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 48rem; color: #1f2933; }
      table { width: 100%; border-collapse: collapse; }
      th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e4e7eb; }
      .status-line--error { color: #b42318; }
      .empty-state { color: #7b8794; }
    </style>
  </head>
  <body>
    <h1>Orders Demo</h1>
    <p>Create a new order and see it appear in the latest 50 orders.</p>
    <form id="order-form">
      <label for="order_id">Order ID</label>
      <input id="order_id" name="order_id" autocomplete="off" required>
      <button type="submit">Create order</button>
    </form>
    <div id="status" class="status-line"></div>
    <h2>Last 50 Orders</h2>
    <table>
      <thead><tr><th>Order ID</th><th>Quantity</th><th>Created at</th></tr></thead>
      <tbody id="orders-body">
"#;

const PAGE_TAIL: &str = r#"      </tbody>
    </table>
    <script>
      const statusEl = document.getElementById('status');
      function setStatus(text, mode) {
        statusEl.textContent = text || '';
        statusEl.className = mode === 'error' ? 'status-line status-line--error' : 'status-line';
      }
      document.getElementById('order-form').addEventListener('submit', async (e) => {
        e.preventDefault();
        const input = document.getElementById('order_id');
        const id = input.value.trim();
        if (!id) return;
        try {
          setStatus('Sending...');
          const res = await fetch('/orders', {
            method: 'POST',
            headers: {'Content-Type': 'application/json'},
            body: JSON.stringify({order_id: id})
          });
          if (!res.ok) throw new Error('POST /orders failed: ' + await res.text());
          setStatus('Order accepted. Refresh in a moment to see it in the list.');
          input.value = '';
        } catch (err) {
          setStatus(err.toString(), 'error');
        }
      });
    </script>
  </body>
</html>
"#;

/// Escapes text for use inside HTML element content.
pub fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}

pub fn render_index(orders: &[OrderRecord]) -> String {
  let mut page = String::from(PAGE_HEAD);
  if orders.is_empty() {
    page.push_str("        <tr><td colspan=\"3\" class=\"empty-state\">No orders yet.</td></tr>\n");
  }
  for order in orders {
    // Writing into a String cannot fail.
    let _ = writeln!(
      page,
      "        <tr><td>{}</td><td>{}</td><td>{}</td></tr>",
      escape_html(&order.order_id),
      order.quantity,
      order.created_at.to_rfc3339()
    );
  }
  page.push_str(PAGE_TAIL);
  page
}

/// `GET /`: the demo page with the latest orders.
#[instrument(name = "handler::index", skip(app_state))]
pub async fn index_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match app_state.store.list_recent_orders(RECENT_ORDERS_LIMIT).await {
    Ok(orders) => HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(render_index(&orders)),
    Err(e) => {
      error!(error = %e, "list_orders_failed");
      HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body("DB error")
    }
  }
}
