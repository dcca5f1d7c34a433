use crate::core::{CREATED_AT_COLUMN, IDENTITY_COLUMN, UPDATED_AT_COLUMN};
use super::descriptor::{ExposedField, FieldKind};

/// Composed columns never forwarded to the host.
pub const EXCLUDED_COLUMNS: [&str; 3] = [IDENTITY_COLUMN, CREATED_AT_COLUMN, UPDATED_AT_COLUMN];

/// Computes the fields a host forwards to one composed association:
/// the composed columns minus identity/timestamps minus `prefix` fields,
/// then the `with` extras, then one `<association>_<field>` alias per
/// prefix field. Names appear once, in that order.
pub fn exposed_fields(
    association: &str,
    columns: &[String],
    prefix: &[String],
    with: &[String],
) -> Vec<ExposedField> {
    let mut fields: Vec<ExposedField> = Vec::new();
    let mut push = |field: ExposedField| {
        if !fields.iter().any(|existing| existing.name == field.name) {
            fields.push(field);
        }
    };

    for column in columns {
        if EXCLUDED_COLUMNS.contains(&column.as_str()) || prefix.contains(column) {
            continue;
        }
        push(ExposedField::new(column, column, FieldKind::Column));
    }
    for extra in with {
        let kind = if columns.contains(extra) { FieldKind::Column } else { FieldKind::Extra };
        push(ExposedField::new(extra, extra, kind));
    }
    for field in prefix {
        push(ExposedField::new(format!("{}_{}", association, field), field, FieldKind::Prefixed));
    }
    fields
}
