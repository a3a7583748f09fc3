mod confirm_dialog;
mod form;
mod table;
mod text_input;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use form::{Form, FormEvent};
pub use table::{ColumnDef, Table, TableEvent, TableRow};
pub use text_input::TextInput;
