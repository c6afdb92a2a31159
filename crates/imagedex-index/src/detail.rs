use uuid::Uuid;

use imagedex_core::types::{LabelMap, LabelRow};

/// `hot_dog` → `Hot Dog`: underscores become spaces, then every word gets an
/// upper-case first letter and lower-case rest.
pub fn humanize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut word_start = true;
    for c in label.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Detail rows for one record's categories, highest confidence first.
/// Equal confidences keep label order.
pub fn detail_rows(categories: &LabelMap) -> Vec<LabelRow> {
    let mut entries: Vec<(&str, f32)> = categories.iter().map(|(label, &confidence)| (label.as_str(), confidence)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .map(|(label, confidence)| LabelRow { id: Uuid::new_v4(), label: humanize_label(label), confidence })
        .collect()
}
