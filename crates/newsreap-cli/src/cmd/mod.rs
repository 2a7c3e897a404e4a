pub mod harvest;
pub mod report;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Table with the shared look: rounded UTF-8 borders, cyan header
pub(crate) fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn print_config(config: &Config) {
    let mut table = styled_table(&["Setting", "Value"]);

    table.add_row(vec![
        "Output directory".to_string(),
        config.output.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Workers per source".to_string(),
        config.workers.count.to_string(),
    ]);
    table.add_row(vec![
        "Default target".to_string(),
        config.harvest.default_target.to_string(),
    ]);
    table.add_row(vec![
        "Connect timeout".to_string(),
        format!("{}s", config.http.connect_timeout),
    ]);
    table.add_row(vec![
        "Request timeout".to_string(),
        format!("{}s", config.http.request_timeout),
    ]);

    for source in &config.sources {
        let value = match source.resolve(config.harvest.default_target) {
            Ok(resolved) => format!(
                "{} (page {}, target {})",
                resolved.categories.join(", "),
                resolved.page_size,
                resolved.target
            ),
            Err(e) => format!("invalid: {e}"),
        };
        table.add_row(vec![format!("Source {}", source.name), value]);
    }

    eprintln!("\n{table}");
}
