use std::collections::VecDeque;

use crate::config::LayoutVariant;
use crate::dataset::{Dataset, SessionRow};
use crate::labels::MatchLabelMap;
use crate::metrics::Metric;

pub const PLAYER_PLACEHOLDER: &str = "- Seleccionar Jugador -";
pub const MATCH_PLACEHOLDER: &str = "- Seleccionar Partido -";

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Match,
    Comparison,
    Evolution,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Match, Tab::Comparison, Tab::Evolution];

    pub fn index(self) -> usize {
        match self {
            Tab::Match => 0,
            Tab::Comparison => 1,
            Tab::Evolution => 2,
        }
    }

    pub fn label(self, layout: LayoutVariant) -> &'static str {
        layout.tab_labels()[self.index()]
    }
}

/// Which sidebar selector receives the movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarFocus {
    Players,
    Matches,
}

/// Selection state of the dashboard. Cursor `0` on either selector is the
/// placeholder entry, so a cursor of `n` points at item `n - 1`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub layout: LayoutVariant,
    pub players: Vec<String>,
    pub player_cursor: usize,
    pub match_labels: MatchLabelMap,
    pub match_cursor: usize,
    pub tab: Tab,
    pub comparison_metric: Metric,
    pub focus: SidebarFocus,
    pub reset_count: u32,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(dataset: &Dataset, layout: LayoutVariant) -> Self {
        Self {
            layout,
            players: dataset.players(),
            player_cursor: 0,
            match_labels: MatchLabelMap::default(),
            match_cursor: 0,
            tab: Tab::Match,
            comparison_metric: Metric::TotalDistance,
            focus: SidebarFocus::Players,
            reset_count: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.player_cursor
            .checked_sub(1)
            .and_then(|idx| self.players.get(idx))
            .map(String::as_str)
    }

    /// `(display label, raw activity name)` of the selected match.
    pub fn selected_match(&self) -> Option<(&str, &str)> {
        self.match_cursor
            .checked_sub(1)
            .and_then(|idx| self.match_labels.get(idx))
    }

    /// Row for the current (player, match) pair; `None` means "no data".
    pub fn current_row<'a>(&self, dataset: &'a Dataset) -> Option<&'a SessionRow> {
        let player = self.selected_player()?;
        let (_, raw) = self.selected_match()?;
        dataset.single_match_metrics(player, raw)
    }

    pub fn set_player_cursor(&mut self, dataset: &Dataset, cursor: usize) {
        let cursor = cursor.min(self.players.len());
        if cursor == self.player_cursor {
            return;
        }
        self.player_cursor = cursor;
        self.match_cursor = 0;
        self.match_labels = match self.selected_player() {
            Some(player) => MatchLabelMap::for_player(dataset, player),
            None => MatchLabelMap::default(),
        };
        if self.selected_player().is_none() {
            self.focus = SidebarFocus::Players;
        }
    }

    pub fn set_match_cursor(&mut self, cursor: usize) {
        self.match_cursor = cursor.min(self.match_labels.len());
    }

    pub fn select_next(&mut self, dataset: &Dataset) {
        match self.focus {
            SidebarFocus::Players => {
                let next = (self.player_cursor + 1).min(self.players.len());
                self.set_player_cursor(dataset, next);
            }
            SidebarFocus::Matches => self.set_match_cursor(self.match_cursor + 1),
        }
    }

    pub fn select_prev(&mut self, dataset: &Dataset) {
        match self.focus {
            SidebarFocus::Players => {
                let prev = self.player_cursor.saturating_sub(1);
                self.set_player_cursor(dataset, prev);
            }
            SidebarFocus::Matches => self.set_match_cursor(self.match_cursor.saturating_sub(1)),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            SidebarFocus::Players if self.selected_player().is_some() => SidebarFocus::Matches,
            _ => SidebarFocus::Players,
        };
    }

    pub fn cycle_tab(&mut self) {
        self.tab = Tab::ALL[(self.tab.index() + 1) % Tab::ALL.len()];
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn cycle_metric_next(&mut self) {
        self.comparison_metric = self.comparison_metric.next();
    }

    pub fn cycle_metric_prev(&mut self) {
        self.comparison_metric = self.comparison_metric.prev();
    }

    /// "Volver al Inicio": every selector back to its initial value.
    pub fn reset(&mut self) {
        self.player_cursor = 0;
        self.match_cursor = 0;
        self.match_labels = MatchLabelMap::default();
        self.tab = Tab::Match;
        self.comparison_metric = Metric::TotalDistance;
        self.focus = SidebarFocus::Players;
        self.help_overlay = false;
        self.reset_count = self.reset_count.wrapping_add(1);
        self.push_log("[INFO] Selección reiniciada");
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(player: &str, activity: &str) -> SessionRow {
        SessionRow {
            player_name: player.to_string(),
            activity_name: activity.to_string(),
            total_duration: "01:00:00".to_string(),
            duration_minutes: 60.0,
            total_distance: 1.0,
            hsr: 0.0,
            accelerations: 0.0,
            max_velocity: 0.0,
            tackles: 0.0,
        }
    }

    #[test]
    fn placeholder_cursor_selects_nothing() {
        let ds = Dataset::from_rows(vec![row("Ana", "PARTIDO SIC")]);
        let state = AppState::new(&ds, LayoutVariant::Classic);
        assert_eq!(state.selected_player(), None);
        assert_eq!(state.selected_match(), None);
        assert!(state.current_row(&ds).is_none());
    }

    #[test]
    fn push_log_is_bounded() {
        let ds = Dataset::default();
        let mut state = AppState::new(&ds, LayoutVariant::Classic);
        for i in 0..(MAX_LOGS + 10) {
            state.push_log(format!("msg {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("msg 10"));
    }

    #[test]
    fn focus_stays_on_players_without_selection() {
        let ds = Dataset::from_rows(vec![row("Ana", "PARTIDO SIC")]);
        let mut state = AppState::new(&ds, LayoutVariant::Classic);
        state.toggle_focus();
        assert_eq!(state.focus, SidebarFocus::Players);
        state.select_next(&ds);
        state.toggle_focus();
        assert_eq!(state.focus, SidebarFocus::Matches);
    }

    #[test]
    fn tab_labels_follow_layout() {
        assert_eq!(Tab::Comparison.label(LayoutVariant::Classic), "Comparativa vs Equipo");
        assert_eq!(Tab::Evolution.label(LayoutVariant::Compact), "Histórico");
    }
}
