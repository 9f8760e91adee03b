//! Static Pages
//!
//! Full HTML pages compiled into the binary. Only the payment page takes
//! values, injected as escaped attribute text.

use paydesk_core::render::escape_html;

pub const CREATE_PAGE: &str = include_str!("../templates/create.html");
pub const LIST_PAGE: &str = include_str!("../templates/list.html");
const TRANSACTION_TEMPLATE: &str = include_str!("../templates/transaction.html");

/// Payment page with the browser-side token and entry point filled in
pub fn transaction_page(public_token: &str, entry_point: &str) -> String {
    TRANSACTION_TEMPLATE
        .replace("{{public_token}}", &escape_html(public_token))
        .replace("{{entry_point}}", &escape_html(entry_point))
}
