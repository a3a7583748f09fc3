use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, TableState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 10;

pub enum TableEvent<T> {
    Activated(T),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    fn columns() -> &'static [ColumnDef];
    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>>;

    /// Return true if this row matches the search query for local filtering.
    fn matches(&self, query: &str) -> bool;
}

/// Selectable table with `/` search over its rows.
pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    filtered_indices: Vec<usize>,
    state: TableState,
    title: Option<String>,
    empty_text: &'static str,
    active: bool,
    searching: bool,
    query: String,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut table = Self {
            items: Vec::new(),
            filtered_indices: Vec::new(),
            state: TableState::default(),
            title: None,
            empty_text: "Nothing to show",
            active: true,
            searching: false,
            query: String::new(),
            resolver,
        };
        table.set_items(items);
        table
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub const fn with_empty_text(mut self, text: &'static str) -> Self {
        self.empty_text = text;
        self
    }

    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    /// Replace the rows. The selected position is kept where possible.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.update_filter();
    }

    pub fn selected_item(&self) -> Option<&T> {
        let selected = self.state.selected()?;
        let &idx = self.filtered_indices.get(selected)?;
        self.items.get(idx)
    }

    fn update_filter(&mut self) {
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.query.is_empty() || item.matches(&self.query))
            .map(|(i, _)| i)
            .collect();

        if self.filtered_indices.is_empty() {
            self.state.select(None);
        } else {
            let last = self.filtered_indices.len() - 1;
            self.state
                .select(Some(self.state.selected().map_or(0, |i| i.min(last))));
        }
    }

    fn select(&mut self, index: impl FnOnce(usize, usize) -> usize) {
        if let Some(last) = self.filtered_indices.len().checked_sub(1) {
            let current = self.state.selected().unwrap_or(0);
            self.state.select(Some(index(current, last).min(last)));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            self.query.clear();
            self.update_filter();
            return EventResult::Consumed;
        }

        // Enter leaves search mode but keeps the filter
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match key.code {
            KeyCode::Backspace => {
                self.query.pop();
                self.update_filter();
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.update_filter();
            }
            _ => {}
        }
        EventResult::Consumed
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        let resolver = Arc::clone(&self.resolver);
        let nav = |action| resolver.matches_nav(&key, action);

        if nav(NavAction::Down) {
            self.select(|i, _| i + 1);
        } else if nav(NavAction::Up) {
            self.select(|i, _| i.saturating_sub(1));
        } else if nav(NavAction::Home) {
            self.select(|_, _| 0);
        } else if nav(NavAction::End) {
            self.select(|_, last| last);
        } else if nav(NavAction::PageDown) {
            self.select(|i, _| i + PAGE_STEP);
        } else if nav(NavAction::PageUp) {
            self.select(|i, _| i.saturating_sub(PAGE_STEP));
        } else if nav(NavAction::Select) {
            return self
                .selected_item()
                .map_or(EventResult::Ignored, |item| {
                    TableEvent::Activated(item.clone()).into()
                });
        } else if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
        } else if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty()
        {
            self.query.clear();
            self.update_filter();
        } else {
            return EventResult::Ignored;
        }
        EventResult::Consumed
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let has_search_bar = self.searching || !self.query.is_empty();
        let (table_area, search_area) = if has_search_bar {
            let [table, search] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            (table, Some(search))
        } else {
            (area, None)
        };

        let border_color = if self.active {
            theme.border_focused()
        } else {
            theme.border()
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        if let Some(title) = &self.title {
            block = block.title(title.as_str()).title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );
        }

        if self.filtered_indices.is_empty() {
            let text = if self.items.is_empty() {
                self.empty_text
            } else {
                "No matches"
            };
            let placeholder = Paragraph::new(Line::from(text).centered())
                .style(Style::default().fg(theme.overlay0()))
                .block(block);
            frame.render_widget(placeholder, table_area);
        } else {
            let columns = T::columns();
            let header = Row::new(columns.iter().map(|c| {
                Cell::from(c.header).style(
                    Style::default()
                        .fg(theme.header())
                        .add_modifier(Modifier::BOLD),
                )
            }))
            .style(Style::default().bg(theme.surface0()));

            let rows = self.filtered_indices.iter().map(|&idx| {
                Row::new(self.items[idx].render_cells(theme)).style(Style::default().fg(theme.text()))
            });

            let table = ratatui::widgets::Table::new(rows, columns.iter().map(|c| c.constraint))
                .header(header)
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            frame.render_stateful_widget(table, table_area, &mut self.state);
        }

        if let Some(search_area) = search_area {
            let (search_text, search_style) = if self.searching {
                (format!("/{}_", self.query), Style::default().fg(theme.yellow()))
            } else {
                (
                    format!("/{} ({} matches)", self.query, self.filtered_indices.len()),
                    Style::default().fg(theme.subtext0()),
                )
            };
            frame.render_widget(Paragraph::new(search_text).style(search_style), search_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::search::Matcher;

    #[derive(Clone, Debug, PartialEq)]
    struct Item(&'static str);

    impl TableRow for Item {
        fn columns() -> &'static [ColumnDef] {
            static COLUMNS: &[ColumnDef] = &[ColumnDef::new("Name", Constraint::Min(10))];
            COLUMNS
        }

        fn render_cells(&self, _theme: &Theme) -> Vec<Cell<'static>> {
            vec![Cell::from(self.0)]
        }

        fn matches(&self, query: &str) -> bool {
            Matcher::new().matches(self.0, query)
        }
    }

    fn table(names: &[&'static str]) -> Table<Item> {
        Table::new(
            names.iter().copied().map(Item).collect(),
            Arc::new(KeyResolver::default()),
        )
    }

    fn press(table: &mut Table<Item>, code: KeyCode) -> EventResult<TableEvent<Item>> {
        table.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut table = table(&["a", "b", "c"]);
        press(&mut table, KeyCode::Up);
        assert_eq!(table.selected_item(), Some(&Item("a")));
        press(&mut table, KeyCode::PageDown);
        assert_eq!(table.selected_item(), Some(&Item("c")));
        press(&mut table, KeyCode::Char('g'));
        assert_eq!(table.selected_item(), Some(&Item("a")));
    }

    #[test]
    fn test_enter_activates_selection() {
        let mut table = table(&["a", "b"]);
        press(&mut table, KeyCode::Down);
        let EventResult::Event(TableEvent::Activated(row)) = press(&mut table, KeyCode::Enter)
        else {
            panic!("expected activation");
        };
        assert_eq!(row, Item("b"));
    }

    #[test]
    fn test_search_filters_rows() {
        let mut table = table(&["Pen", "Pencil", "Mug"]);
        press(&mut table, KeyCode::Char('/'));
        assert!(table.is_searching());
        for c in "mug".chars() {
            press(&mut table, KeyCode::Char(c));
        }
        press(&mut table, KeyCode::Enter);
        assert!(!table.is_searching());
        assert_eq!(table.selected_item(), Some(&Item("Mug")));

        // Esc outside search mode clears the filter.
        press(&mut table, KeyCode::Esc);
        assert_eq!(table.filtered_indices.len(), 3);
    }

    #[test]
    fn test_set_items_keeps_position() {
        let mut table = table(&["a", "b", "c"]);
        press(&mut table, KeyCode::Down);
        press(&mut table, KeyCode::Down);
        table.set_items(vec![Item("x"), Item("y")]);
        assert_eq!(table.selected_item(), Some(&Item("y")));
        table.set_items(vec![]);
        assert_eq!(table.selected_item(), None);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut table = table(&["a"]);
        assert!(matches!(press(&mut table, KeyCode::Char('n')), EventResult::Ignored));
        assert!(matches!(press(&mut table, KeyCode::Esc), EventResult::Ignored));
    }
}
