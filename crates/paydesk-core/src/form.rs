//! Form Adapter
//!
//! Turns untyped form fields into a [`CustomerRecord`].

use std::collections::{BTreeMap, HashMap};

use crate::error::{DeskError, Result};
use crate::model::CustomerRecord;

/// Fields a create-customer form must carry
pub const REQUIRED_FIELDS: [&str; 9] = [
    "firstname", "lastname", "email", "timeZone", "address", "city", "state", "zip", "country",
];

/// Checkbox-style attributes copied into `additional_fields` when set
pub const OPTIONAL_ATTRIBUTES: [&str; 2] = ["hvac", "electrical"];

/// Field the remote service de-duplicates customers on
pub const IDENTIFIER_FIELD: &str = "email";

/// Build a customer from submitted form fields.
///
/// Optional attributes are only included when present and non-empty, so an
/// unchecked box never shows up as an empty string remotely.
pub fn customer_from_form(form: &HashMap<String, String>) -> Result<CustomerRecord> {
    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !form.contains_key(**f)) {
        return Err(DeskError::Validation(format!("missing field '{missing}'")));
    }

    let field = |name: &str| form.get(name).cloned().unwrap_or_default();

    let raw_zone = field("timeZone");
    let time_zone = raw_zone.trim().parse::<i32>().map_err(|_| {
        DeskError::Validation(format!("timeZone '{raw_zone}' is not a whole number"))
    })?;

    let additional_fields: BTreeMap<String, Option<String>> = OPTIONAL_ATTRIBUTES
        .iter()
        .filter_map(|name| {
            form.get(*name)
                .filter(|v| !v.is_empty())
                .map(|v| ((*name).to_string(), Some(v.clone())))
        })
        .collect();

    Ok(CustomerRecord {
        firstname: field("firstname"),
        lastname: field("lastname"),
        email: field("email"),
        time_zone,
        address: field("address"),
        city: field("city"),
        state: field("state"),
        zip: field("zip"),
        country: field("country"),
        additional_fields,
        identifier_fields: vec![IDENTIFIER_FIELD.to_string()],
    })
}
