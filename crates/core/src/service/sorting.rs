use super::types::FormField;

/// Sorts fields into rendering order: `field_number` ascending.
///
/// The sort is stable, so fields sharing a number keep their stored order.
pub fn sort_fields_by_number(fields: &mut [FormField]) {
    fields.sort_by_key(|field| field.field_number);
}

/// Returns a copy of `fields` in rendering order.
pub fn sorted_fields(fields: &[FormField]) -> Vec<FormField> {
    let mut sorted = fields.to_vec();
    sort_fields_by_number(&mut sorted);
    sorted
}
