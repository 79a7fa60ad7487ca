use crate::domain::entities::records::CellValue;

pub fn format_number_with_commas(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_currency(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", format_number_with_commas(-value, 2))
    } else {
        format!("${}", format_number_with_commas(value, 2))
    }
}

/// Rates arrive from the backend already scaled to 0..=100.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    format!("{value:.1}%")
}

pub fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.clone(),
        CellValue::Integer(value) => format_number_with_commas(*value as f64, 0),
        CellValue::Currency(value) => format_currency(*value),
        CellValue::Percent(value) => format_percent(*value),
        CellValue::Empty => "—".to_string(),
    }
}

pub fn cell_alignment(cell: &CellValue) -> &'static str {
    match cell {
        CellValue::Integer(_) | CellValue::Currency(_) | CellValue::Percent(_) => "right",
        CellValue::Text(_) | CellValue::Empty => "left",
    }
}
