use anyhow::{Result, anyhow};
use serde_json::json;

use rugby_dashboard::config::{AppConfig, arg_value};
use rugby_dashboard::dataset::{Dataset, DatasetCache};
use rugby_dashboard::labels::MatchLabelMap;
use rugby_dashboard::metrics::Metric;

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let args = AppConfig::load_env();
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RUGBY_LOG", "info"))
        .format_timestamp(None)
        .init();

    let config = AppConfig::resolve(&args, |key| std::env::var(key).ok());
    let format = match arg_value(&args, "--format").as_deref() {
        None | Some("table") => OutputFormat::Table,
        Some("json") => OutputFormat::Json,
        Some(other) => return Err(anyhow!("unknown format '{other}', use table or json")),
    };
    let metric = match arg_value(&args, "--metric") {
        Some(raw) => Metric::from_column(&raw).ok_or_else(|| anyhow!("unknown metric '{raw}'"))?,
        None => Metric::TotalDistance,
    };

    let cache = DatasetCache::new(config.csv_path.clone());
    let dataset = cache.get_or_load()?;

    let Some(player) = arg_value(&args, "--player") else {
        print_players(dataset, format);
        return Ok(());
    };
    if !dataset.players().contains(&player) {
        return Err(anyhow!("player '{player}' not found in {}", dataset.source().display()));
    }
    let selected_match = arg_value(&args, "--match");

    match format {
        OutputFormat::Table => print_table(dataset, &player, selected_match.as_deref(), metric),
        OutputFormat::Json => print_json(dataset, &player, selected_match.as_deref(), metric)?,
    }
    Ok(())
}

fn print_players(dataset: &Dataset, format: OutputFormat) {
    let players = dataset.players();
    match format {
        OutputFormat::Table => {
            println!("Jugadores ({}):", players.len());
            for player in players {
                println!("  {player}");
            }
        }
        OutputFormat::Json => println!("{}", json!({ "players": players })),
    }
}

/// Accepts either the raw activity name or its display label.
fn resolve_match(labels: &MatchLabelMap, wanted: &str) -> Option<String> {
    if let Some(raw) = labels.raw_for(wanted) {
        return Some(raw.to_string());
    }
    (0..labels.len())
        .filter_map(|idx| labels.get(idx))
        .find(|(_, raw)| *raw == wanted)
        .map(|(_, raw)| raw.to_string())
}

fn print_table(dataset: &Dataset, player: &str, wanted: Option<&str>, metric: Metric) {
    let labels = MatchLabelMap::for_player(dataset, player);
    println!("Estadísticas: {player}");
    println!("Partidos:");
    for label in labels.labels() {
        println!("  {label}");
    }

    if let Some(wanted) = wanted {
        println!();
        let row = resolve_match(&labels, wanted)
            .and_then(|raw| dataset.single_match_metrics(player, &raw));
        match row {
            Some(row) => {
                println!("Partido: {wanted}");
                for m in Metric::ALL {
                    println!("  {:<22} {:>10.1}", m.label(), row.value(m));
                }
            }
            None => println!("Sin datos para '{wanted}'. Selecciona un partido."),
        }
    }

    println!();
    println!("Comparativa: {} (Solo Session)", metric.label());
    let history = dataset.player_history(player);
    for avg in dataset.team_average_by_match(metric) {
        let own = history
            .iter()
            .find(|h| h.row.activity_name == avg.activity_name)
            .map(|h| format!("{:.1}", h.row.value(metric)))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<28} jugador {:>10} equipo {:>10.1}", avg.label, own, avg.mean);
    }
}

fn print_json(dataset: &Dataset, player: &str, wanted: Option<&str>, metric: Metric) -> Result<()> {
    let labels = MatchLabelMap::for_player(dataset, player);
    let single = wanted
        .and_then(|w| resolve_match(&labels, w))
        .and_then(|raw| dataset.single_match_metrics(player, &raw));
    let out = json!({
        "player": player,
        "matches": labels.labels().collect::<Vec<_>>(),
        "match": single,
        "metric": metric.column(),
        "history": dataset.player_history(player),
        "team_average": dataset.team_average_by_match(metric),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
