use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for line in render_table(&headers, &rows) {
        println!("{line}");
    }
}

/// Left-aligned columns, two spaces apart, with a dashed rule under the
/// header. Widths count chars so prompts in Japanese line up with the rest.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let widths = rows.iter().fold(
        headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>(),
        |mut widths, row| {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
            widths
        },
    );
    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut lines = vec![render(headers), rule.join("  ")];
    lines.extend(rows.iter().map(|row| render(row)));
    lines
}

/// Five-segment bar, as drawn above the prompt on the session screen.
pub fn progress_bar(progress: f32) -> String {
    let filled = (progress.clamp(0.0, 1.0) * 5.0).round() as usize;
    format!("{}{}", "■".repeat(filled), "□".repeat(5 - filled))
}
