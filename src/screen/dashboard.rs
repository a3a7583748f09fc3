//! Product dashboard: the product table plus create and edit forms.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::Theme;
use crate::api::{ApiResponse, ProductApi};
use crate::config::{DashboardAction, DialogAction, FormAction, KeyResolver, NavAction, SearchAction};
use crate::model::{Product, ProductDraft, ProductId};
use crate::screen::{Batch, Effects, Screen, ScreenMsg};
use crate::search::Matcher;
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, ConfirmEvent, EventResult, Form, FormEvent, Keybinding,
    MessageLine, Result, Table, TableEvent, TableRow, TextInput,
};
use crate::viewmodel::{DashboardViewModel, Route};

const NAME: usize = 0;
const DESCRIPTION: usize = 1;
const PRICE: usize = 2;
const QUANTITY: usize = 3;

#[derive(Clone)]
struct ProductRow(Product);

impl TableRow for ProductRow {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("ID", Constraint::Length(8)),
            ColumnDef::new("Name", Constraint::Percentage(25)),
            ColumnDef::new("Description", Constraint::Min(20)),
            ColumnDef::new("Price", Constraint::Length(12)),
            ColumnDef::new("Quantity", Constraint::Length(10)),
        ];
        COLUMNS
    }

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>> {
        let product = &self.0;
        vec![
            Cell::from(product.id.to_string()).style(Style::default().fg(theme.overlay1())),
            Cell::from(product.name.clone()),
            Cell::from(product.description.clone()).style(Style::default().fg(theme.subtext0())),
            Cell::from(format!("{:.2}", product.price)).style(Style::default().fg(theme.peach())),
            Cell::from(product.quantity.to_string()),
        ]
    }

    fn matches(&self, query: &str) -> bool {
        Matcher::new().matches_any([self.0.name.as_str(), self.0.description.as_str()], query)
    }
}

fn product_form(title: &str, resolver: &Arc<KeyResolver>) -> Form {
    Form::new(
        title,
        vec![
            TextInput::new("Name"),
            TextInput::new("Description"),
            TextInput::new("Price").with_placeholder("0.00"),
            TextInput::new("Quantity").with_placeholder("0"),
        ],
        Arc::clone(resolver),
    )
}

fn draft_from(form: &Form) -> ProductDraft {
    ProductDraft {
        name: form.value(NAME).to_string(),
        description: form.value(DESCRIPTION).to_string(),
        price: form.value(PRICE).to_string(),
        quantity: form.value(QUANTITY).to_string(),
    }
}

fn fill(form: &mut Form, draft: &ProductDraft) {
    form.set_value(NAME, &draft.name);
    form.set_value(DESCRIPTION, &draft.description);
    form.set_value(PRICE, &draft.price);
    form.set_value(QUANTITY, &draft.quantity);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Table,
    NewForm,
    EditForm,
}

enum DashboardMsg {
    Reload,
    SubmitNew,
    Edit(Product),
    SubmitEdit,
    CancelEdit,
    Delete(ProductId),
    Logout,
    Response(ApiResponse),
    Redirect(Route),
}

impl From<ApiResponse> for DashboardMsg {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

impl From<Route> for DashboardMsg {
    fn from(route: Route) -> Self {
        Self::Redirect(route)
    }
}

struct PendingDelete {
    dialog: ConfirmDialog,
    id: ProductId,
}

pub struct DashboardScreen {
    vm: DashboardViewModel,
    table: Table<ProductRow>,
    new_form: Form,
    edit_form: Option<Form>,
    focus: Focus,
    pending_delete: Option<PendingDelete>,
    message_line: MessageLine,
    effects: Effects<DashboardMsg>,
    msg_rx: UnboundedReceiver<DashboardMsg>,
    resolver: Arc<KeyResolver>,
}

impl DashboardScreen {
    pub fn new(api: Arc<dyn ProductApi>, resolver: Arc<KeyResolver>) -> Self {
        let (tx, msg_rx) = mpsc::unbounded_channel();
        let table = Table::new(Vec::new(), Arc::clone(&resolver))
            .with_title(" Products ")
            .with_empty_text("No products yet");
        let mut new_form = product_form("New product", &resolver);
        new_form.set_active(false);

        Self {
            vm: DashboardViewModel::new(),
            table,
            new_form,
            edit_form: None,
            focus: Focus::Table,
            pending_delete: None,
            message_line: MessageLine::new(),
            effects: Effects::new(api, tx),
            msg_rx,
            resolver,
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.table.set_active(focus == Focus::Table);
        self.new_form.set_active(focus == Focus::NewForm);
        if let Some(form) = &mut self.edit_form {
            form.set_active(focus == Focus::EditForm);
        }
    }

    fn confirm_delete(&mut self, product: &Product) {
        let dialog = ConfirmDialog::new(
            format!("Delete \"{}\"? This cannot be undone.", product.name),
            Arc::clone(&self.resolver),
        )
        .with_title("Delete product");
        self.pending_delete = Some(PendingDelete {
            dialog,
            id: product.id,
        });
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(pending) = &mut self.pending_delete else {
            return Ok(EventResult::Ignored);
        };
        match pending.dialog.handle_key(key)? {
            EventResult::Event(ConfirmEvent::Confirmed) => {
                self.effects.queue(DashboardMsg::Delete(pending.id));
                self.pending_delete = None;
            }
            EventResult::Event(ConfirmEvent::Cancelled) => self.pending_delete = None,
            EventResult::Consumed | EventResult::Ignored => {}
        }
        Ok(EventResult::Consumed)
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        match self.table.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(row)) => {
                self.effects.queue(DashboardMsg::Edit(row.0));
                return Ok(EventResult::Consumed);
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        let resolver = Arc::clone(&self.resolver);
        let action = |action| resolver.matches_dashboard(&key, action);
        let selected = self.table.selected_item().map(|row| row.0.clone());

        if action(DashboardAction::New) {
            self.set_focus(Focus::NewForm);
        } else if action(DashboardAction::Edit) {
            if let Some(product) = selected {
                self.effects.queue(DashboardMsg::Edit(product));
            }
        } else if action(DashboardAction::Delete) {
            if let Some(product) = selected {
                self.confirm_delete(&product);
            }
        } else if action(DashboardAction::Reload) {
            self.effects.queue(DashboardMsg::Reload);
        } else if action(DashboardAction::Logout) {
            self.effects.queue(DashboardMsg::Logout);
        } else {
            return Ok(EventResult::Ignored);
        }
        Ok(EventResult::Consumed)
    }

    fn handle_new_form_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        Ok(match self.new_form.handle_key(key)? {
            EventResult::Event(FormEvent::Changed) => {
                self.vm.new_product = draft_from(&self.new_form);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Submitted) => {
                self.vm.new_product = draft_from(&self.new_form);
                self.effects.queue(DashboardMsg::SubmitNew);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) => {
                // The draft is kept for when the user comes back.
                self.set_focus(Focus::Table);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn handle_edit_form_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(form) = &mut self.edit_form else {
            self.set_focus(Focus::Table);
            return Ok(EventResult::Ignored);
        };
        let event = form.handle_key(key)?;
        let draft = draft_from(form);

        Ok(match event {
            EventResult::Event(FormEvent::Changed) => {
                if let Some(editing) = self.vm.editing_mut() {
                    editing.draft = draft;
                }
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Submitted) => {
                if let Some(editing) = self.vm.editing_mut() {
                    editing.draft = draft;
                }
                self.effects.queue(DashboardMsg::SubmitEdit);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) => {
                self.effects.queue(DashboardMsg::CancelEdit);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn process_message(&mut self, msg: DashboardMsg) -> ScreenMsg {
        match msg {
            DashboardMsg::Reload => {
                let effect = self.vm.reload();
                self.effects.apply(Some(effect))
            }
            DashboardMsg::SubmitNew => {
                let effect = self.vm.submit_new();
                self.effects.apply(effect)
            }
            DashboardMsg::Edit(product) => {
                self.vm.start_edit(&product);
                // A fresh form, so the cursor starts on the first field.
                self.edit_form = None;
                ScreenMsg::Idle
            }
            DashboardMsg::SubmitEdit => {
                let effect = self.vm.submit_edit();
                self.effects.apply(effect)
            }
            DashboardMsg::CancelEdit => {
                self.vm.cancel_edit();
                ScreenMsg::Idle
            }
            DashboardMsg::Delete(id) => {
                let effect = self.vm.delete(id);
                self.effects.apply(Some(effect))
            }
            DashboardMsg::Logout => {
                let effect = self.vm.logout();
                self.effects.apply(Some(effect))
            }
            DashboardMsg::Response(response) => {
                let effect = self.vm.resolve(response);
                self.effects.apply(effect)
            }
            DashboardMsg::Redirect(route) => ScreenMsg::Navigate(route),
        }
    }

    /// Copy view-model state back into the widgets.
    fn sync_from_vm(&mut self) {
        self.table.set_items(
            self.vm
                .products()
                .iter()
                .cloned()
                .map(ProductRow)
                .collect(),
        );
        fill(&mut self.new_form, &self.vm.new_product);

        let Some(editing) = self.vm.editing() else {
            if self.edit_form.take().is_some() && self.focus == Focus::EditForm {
                self.set_focus(Focus::Table);
            }
            return;
        };
        let draft = editing.draft.clone();
        let opened = self.edit_form.is_none();
        let resolver = Arc::clone(&self.resolver);
        let form = self
            .edit_form
            .get_or_insert_with(|| product_form("Edit product", &resolver));
        fill(form, &draft);
        if opened {
            self.set_focus(Focus::EditForm);
        }
    }

    fn render_edit_placeholder(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Edit product ")
            .title_style(Style::default().fg(theme.overlay1()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let hint = format!(
            "Select a product and press {} to edit it",
            self.resolver.display_dashboard(DashboardAction::Edit)
        );
        frame.render_widget(
            Paragraph::new(Line::from(hint).centered())
                .style(Style::default().fg(theme.overlay0()))
                .block(block),
            area,
        );
    }
}

impl Screen for DashboardScreen {
    fn init(&mut self) {
        self.effects.queue(DashboardMsg::Reload);
    }

    fn handle_tick(&mut self) {
        self.message_line.handle_tick(self.vm.is_busy());
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.pending_delete.is_some() {
            return self.handle_dialog_key(key);
        }
        match self.focus {
            Focus::Table => self.handle_table_key(key),
            Focus::NewForm => self.handle_new_form_key(key),
            Focus::EditForm => self.handle_edit_form_key(key),
        }
    }

    fn handle_paste(&mut self, text: &str) -> bool {
        if self.pending_delete.is_some() {
            return false;
        }
        match self.focus {
            Focus::Table => false,
            Focus::NewForm => {
                let changed = self.new_form.handle_paste(text);
                if changed {
                    self.vm.new_product = draft_from(&self.new_form);
                }
                changed
            }
            Focus::EditForm => {
                let Some(form) = &mut self.edit_form else {
                    return false;
                };
                let changed = form.handle_paste(text);
                if changed {
                    let draft = draft_from(form);
                    if let Some(editing) = self.vm.editing_mut() {
                        editing.draft = draft;
                    }
                }
                changed
            }
        }
    }

    fn update(&mut self) -> Result<ScreenMsg> {
        let mut batch = Batch::default();
        while let Ok(msg) = self.msg_rx.try_recv() {
            let result = self.process_message(msg);
            if let Some(done) = batch.absorb(result) {
                return Ok(done);
            }
        }
        self.sync_from_vm();
        Ok(batch.finish())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let forms_height = self.new_form.height();
        let [table_area, forms_area, message_area] = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(forms_height),
            Constraint::Length(1),
        ])
        .areas(area);
        let [new_area, edit_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(forms_area);

        self.table.render(frame, table_area, theme);
        self.new_form.render(frame, new_area, theme);
        if let Some(form) = &mut self.edit_form {
            form.render(frame, edit_area, theme);
        } else {
            self.render_edit_placeholder(frame, edit_area, theme);
        }
        self.message_line.render(
            frame,
            message_area,
            theme,
            self.vm.status(),
            self.vm.is_busy(),
        );

        if let Some(pending) = &mut self.pending_delete {
            pending.dialog.render(frame, area, theme);
        }
    }

    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        if self.pending_delete.is_some() {
            return vec![
                Keybinding::new(r.display_dialog(DialogAction::Confirm), "Delete"),
                Keybinding::new(r.display_dialog(DialogAction::Cancel), "Keep"),
            ];
        }
        match self.focus {
            Focus::Table if self.table.is_searching() => vec![
                Keybinding::new(r.display_nav(NavAction::Select), "Apply filter"),
                Keybinding::new(r.display_search(SearchAction::Exit), "Clear filter"),
            ],
            Focus::Table => vec![
                Keybinding::new(r.display_nav(NavAction::Down), "Down"),
                Keybinding::new(r.display_nav(NavAction::Up), "Up"),
                Keybinding::new(r.display_dashboard(DashboardAction::New), "New"),
                Keybinding::new(r.display_dashboard(DashboardAction::Edit), "Edit"),
                Keybinding::new(r.display_dashboard(DashboardAction::Delete), "Delete"),
                Keybinding::new(r.display_dashboard(DashboardAction::Reload), "Reload"),
                Keybinding::new(r.display_search(SearchAction::Toggle), "Search"),
                Keybinding::new(r.display_dashboard(DashboardAction::Logout), "Logout"),
            ],
            Focus::NewForm => vec![
                Keybinding::new(r.display_form(FormAction::Submit), "Create"),
                Keybinding::new(r.display_form(FormAction::Next), "Next field"),
                Keybinding::new(r.display_form(FormAction::Cancel), "Back"),
            ],
            Focus::EditForm => vec![
                Keybinding::new(r.display_form(FormAction::Submit), "Save"),
                Keybinding::new(r.display_form(FormAction::Next), "Next field"),
                Keybinding::new(r.display_form(FormAction::Cancel), "Cancel edit"),
            ],
        }
    }
}
