//! HTML Fragments
//!
//! Small htmx-swappable snippets. Every value that can originate from a user
//! or from the payment API goes through [`escape_html`] before interpolation.

use std::fmt::Write;

use crate::model::{CustomerSummary, PaymentResult};

/// Number of columns in the customer table, including the action column
pub const TABLE_COLUMNS: usize = 9;

const TABLE_HEADERS: [&str; TABLE_COLUMNS] = [
    "First Name", "Last Name", "Email", "Address", "City", "State", "Zip", "Time Zone", "",
];

/// Escape `&`, `<`, `>`, `"` and `'` for use in text or attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Customer table
// ============================================================================

/// Render the customer table, or a placeholder row when there are none
pub fn customer_table(customers: &[CustomerSummary]) -> String {
    let mut html = String::from("<table class=\"striped\">\n  <thead>\n    <tr>\n");
    for header in TABLE_HEADERS {
        let _ = writeln!(html, "      <th>{header}</th>");
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    if customers.is_empty() {
        let _ = writeln!(
            html,
            "    <tr><td colspan=\"{TABLE_COLUMNS}\" style=\"text-align: center; color: #666;\">No customers found. Create a customer to get started!</td></tr>"
        );
    } else {
        for customer in customers {
            html.push_str(&customer_row(customer));
        }
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

fn customer_row(customer: &CustomerSummary) -> String {
    let cell = |value: Option<&str>| escape_html(value.unwrap_or_default());
    let time_zone = customer.time_zone.map(|tz| tz.to_string());

    let mut row = String::from("    <tr>\n");
    for value in [
        customer.firstname.as_deref(),
        customer.lastname.as_deref(),
        customer.email.as_deref(),
        customer.address.as_deref(),
        customer.city.as_deref(),
        customer.state.as_deref(),
        customer.zip.as_deref(),
        time_zone.as_deref(),
    ] {
        let _ = writeln!(row, "      <td>{}</td>", cell(value));
    }
    match customer.customer_id {
        Some(id) => {
            let _ = writeln!(
                row,
                "      <td><button class=\"outline\" hx-delete=\"/api/delete/{id}\" hx-swap=\"innerHTML\" hx-target=\"closest tr\">&#x274C;</button></td>"
            );
        }
        None => row.push_str("      <td></td>\n"),
    }
    row.push_str("    </tr>\n");
    row
}

/// Shown when the listing call itself failed
pub fn list_failure() -> String {
    "<p>Error loading customers. Please check your API credentials and try again.</p>".into()
}

/// Table cell returned for a malformed delete id
pub fn invalid_customer_id() -> String {
    format!("<td colspan=\"{TABLE_COLUMNS}\">Invalid customer ID</td>")
}

/// Table cell replacing a row whose deletion failed
pub fn delete_failure(message: &str) -> String {
    format!(
        "<td colspan=\"{TABLE_COLUMNS}\">Error deleting customer: {}</td>",
        escape_html(message)
    )
}

// ============================================================================
// Status indicators
// ============================================================================

/// Read-only input used as a success/error indicator
pub fn status_input(valid: bool, message: &str, id: Option<&str>) -> String {
    let (name, invalid) = if valid { ("valid", "false") } else { ("invalid", "true") };
    let id_attr = id
        .map(|id| format!(" id=\"{}\"", escape_html(id)))
        .unwrap_or_default();

    format!(
        "<input type=\"text\" name=\"{name}\" value=\"{}\" aria-invalid=\"{invalid}\"{id_attr} readonly>",
        escape_html(message)
    )
}

pub fn create_success() -> String {
    status_input(true, "Success!", Some("form-result"))
}

pub fn create_failure() -> String {
    status_input(false, "Error!", Some("form-result"))
}

/// Success indicator for a completed charge
pub fn payment_success(result: &PaymentResult) -> String {
    let message = match result.reference_id.as_deref() {
        Some(reference) if !reference.is_empty() => {
            format!("Payment processed successfully! Reference ID: {reference}")
        }
        _ => "Payment processed successfully!".to_string(),
    };
    status_input(true, &message, None)
}

/// Generic processing error carrying the underlying message
pub fn payment_failure(message: &str) -> String {
    status_input(false, &format!("There was a processing error: {message}"), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoredPaymentMethod;

    fn customer(id: i64, email: &str) -> CustomerSummary {
        CustomerSummary {
            customer_id: Some(id),
            firstname: Some("Ada".into()),
            lastname: Some("Lovelace".into()),
            email: Some(email.into()),
            time_zone: Some(-5),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_table_has_single_placeholder() {
        let html = customer_table(&[]);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert_eq!(html.matches("colspan=\"9\"").count(), 1);
        assert_eq!(html.matches("<th>").count(), TABLE_COLUMNS);
    }

    #[test]
    fn test_rows_per_customer() {
        let customers = vec![customer(1, "a@x.io"), customer(2, "b@x.io"), customer(3, "c@x.io")];
        let html = customer_table(&customers);

        // header row + one per customer
        assert_eq!(html.matches("<tr>").count(), 4);
        assert!(!html.contains("No customers found"));
        assert!(html.contains("hx-delete=\"/api/delete/2\""));
    }

    #[test]
    fn test_script_in_email_is_escaped() {
        let html = customer_table(&[customer(1, "<script>alert('x')</script>")]);
        assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_missing_fields_render_empty_cells() {
        let html = customer_table(&[CustomerSummary { customer_id: Some(9), ..Default::default() }]);
        assert_eq!(html.matches("<td></td>").count(), 8);
    }

    #[test]
    fn test_row_without_id_has_no_delete_button() {
        let mut anonymous = customer(1, "a@x.io");
        anonymous.customer_id = None;
        let html = customer_table(&[anonymous, customer(2, "b@x.io")]);

        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("<td>a@x.io</td>"));
        assert_eq!(html.matches("hx-delete=").count(), 1);
        assert!(html.contains("hx-delete=\"/api/delete/2\""));
    }

    #[test]
    fn test_payment_failure_escapes_message() {
        let html = payment_failure("bad <card>");
        assert!(html.contains("There was a processing error: bad &lt;card&gt;"));
        assert!(html.contains("aria-invalid=\"true\""));
    }

    #[test]
    fn test_payment_success_includes_reference() {
        let result = PaymentResult {
            stored_method: StoredPaymentMethod::new("sm_1").unwrap(),
            reference_id: Some("txn_42".into()),
            result_text: None,
        };
        let html = payment_success(&result);
        assert!(html.contains("Reference ID: txn_42"));
        assert!(html.contains("name=\"valid\""));
    }

    #[test]
    fn test_create_fragments() {
        assert!(create_success().contains("id=\"form-result\""));
        assert!(create_failure().contains("value=\"Error!\""));
    }
}
