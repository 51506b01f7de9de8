use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::info;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::Dataset;
use crate::metrics::Metric;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub player: String,
    pub history_rows: usize,
    pub team_rows: usize,
}

enum Cell {
    Text(String),
    Number(f64),
}

/// Writes the player's history, the team averages per match and a summary
/// sheet to an `.xlsx` workbook at `path`.
pub fn export_player_report(path: &Path, dataset: &Dataset, player: &str) -> Result<ExportReport> {
    let history = dataset.player_history(player);
    if history.is_empty() {
        return Err(anyhow!("no session rows for player '{player}'"));
    }

    let mut history_rows = vec![header_row(&["Partido", "Activity Name"])];
    for entry in &history {
        let mut row = vec![
            Cell::Text(entry.label.clone()),
            Cell::Text(entry.row.activity_name.clone()),
        ];
        row.extend(Metric::ALL.iter().map(|m| Cell::Number(entry.row.value(*m))));
        history_rows.push(row);
    }

    let averages = Metric::ALL
        .iter()
        .map(|m| dataset.team_average_by_match(*m))
        .collect::<Vec<_>>();
    let mut team_rows = vec![header_row(&["Partido", "Activity Name"])];
    if let Some(first) = averages.first() {
        for (idx, group) in first.iter().enumerate() {
            let mut row = vec![
                Cell::Text(group.label.clone()),
                Cell::Text(group.activity_name.clone()),
            ];
            row.extend(
                averages
                    .iter()
                    .map(|per_metric| Cell::Number(per_metric.get(idx).map_or(0.0, |a| a.mean))),
            );
            team_rows.push(row);
        }
    }

    let mut summary_rows = vec![
        vec![Cell::Text("Jugador".to_string()), Cell::Text(player.to_string())],
        vec![
            Cell::Text("Partidos".to_string()),
            Cell::Number(history.len() as f64),
        ],
    ];
    for metric in Metric::ALL {
        let total: f64 = history.iter().map(|h| h.row.value(metric)).sum();
        summary_rows.push(vec![
            Cell::Text(format!("Promedio {}", metric.label())),
            Cell::Number(total / history.len() as f64),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Historial")?;
        write_rows(sheet, &history_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("PromedioEquipo")?;
        write_rows(sheet, &team_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Resumen")?;
        write_rows(sheet, &summary_rows)?;
    }

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export directory {}", dir.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    info!("exported report for {player} to {}", path.display());

    Ok(ExportReport {
        player: player.to_string(),
        history_rows: history_rows.len().saturating_sub(1),
        team_rows: team_rows.len().saturating_sub(1),
    })
}

/// `informe_<player>.xlsx` with anything outside `[A-Za-z0-9_-]` folded to `_`.
pub fn report_file_name(player: &str) -> String {
    let slug = player
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let slug = if slug.is_empty() { "jugador".to_string() } else { slug };
    format!("informe_{slug}.xlsx")
}

fn header_row(leading: &[&str]) -> Vec<Cell> {
    leading
        .iter()
        .map(|h| h.to_string())
        .chain(Metric::ALL.iter().map(|m| m.label().to_string()))
        .map(Cell::Text)
        .collect()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Text(text) => worksheet.write_string(r, c, text),
                Cell::Number(num) => worksheet.write_number(r, c, *num),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(report_file_name("Juan Pérez"), "informe_Juan_P_rez.xlsx");
        assert_eq!(report_file_name("  "), "informe_jugador.xlsx");
    }
}
