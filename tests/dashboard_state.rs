use std::path::PathBuf;

use rugby_dashboard::config::LayoutVariant;
use rugby_dashboard::dataset::{Dataset, load};
use rugby_dashboard::metrics::Metric;
use rugby_dashboard::state::{AppState, SidebarFocus, Tab};

fn dataset() -> Dataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("two_players.csv");
    load(&path).expect("fixture should load")
}

#[test]
fn selecting_player_builds_match_selector() {
    let ds = dataset();
    let mut state = AppState::new(&ds, LayoutVariant::Classic);
    state.select_next(&ds);
    assert_eq!(state.selected_player(), Some("Ana Paz"));
    assert_eq!(state.match_labels.len(), 2);
    assert_eq!(state.selected_match(), None);

    state.toggle_focus();
    assert_eq!(state.focus, SidebarFocus::Matches);
    state.select_next(&ds);
    assert_eq!(state.selected_match(), Some(("vs Boca", "PARTIDO Boca")));
    let row = state.current_row(&ds).expect("row for selection");
    assert_eq!(row.total_distance, 3200.0);
}

#[test]
fn changing_player_clears_match_selection() {
    let ds = dataset();
    let mut state = AppState::new(&ds, LayoutVariant::Classic);
    state.set_player_cursor(&ds, 1);
    state.set_match_cursor(2);
    assert!(state.selected_match().is_some());

    state.set_player_cursor(&ds, 2);
    assert_eq!(state.selected_player(), Some("Bruno Diaz"));
    assert_eq!(state.selected_match(), None);
    assert!(state.current_row(&ds).is_none());
}

#[test]
fn cursors_are_clamped() {
    let ds = dataset();
    let mut state = AppState::new(&ds, LayoutVariant::Classic);
    for _ in 0..10 {
        state.select_next(&ds);
    }
    assert_eq!(state.selected_player(), Some("Bruno Diaz"));
    state.set_match_cursor(99);
    assert_eq!(state.match_cursor, 2);
}

#[test]
fn reset_returns_to_initial_selection() {
    let ds = dataset();
    let mut state = AppState::new(&ds, LayoutVariant::Compact);
    state.set_player_cursor(&ds, 1);
    state.set_match_cursor(1);
    state.set_tab(Tab::Evolution);
    state.cycle_metric_next();
    state.toggle_focus();

    state.reset();

    assert_eq!(state.selected_player(), None);
    assert_eq!(state.selected_match(), None);
    assert!(state.match_labels.is_empty());
    assert_eq!(state.tab, Tab::Match);
    assert_eq!(state.comparison_metric, Metric::TotalDistance);
    assert_eq!(state.focus, SidebarFocus::Players);
    assert_eq!(state.reset_count, 1);
    assert_eq!(state.layout, LayoutVariant::Compact);
}

#[test]
fn tabs_cycle_in_order() {
    let ds = dataset();
    let mut state = AppState::new(&ds, LayoutVariant::Classic);
    state.cycle_tab();
    assert_eq!(state.tab, Tab::Comparison);
    state.cycle_tab();
    assert_eq!(state.tab, Tab::Evolution);
    state.cycle_tab();
    assert_eq!(state.tab, Tab::Match);
}
