pub mod document;
pub mod error;
pub mod fees;
pub mod format;
pub mod generate;
pub mod input;
pub mod layout;
pub mod logo;
pub mod model;
pub mod render;
pub mod settings;
pub mod terminal;
pub mod web;

pub use error::{InvoiceError, Result};
pub use generate::{GeneratedInvoice, generate_invoice};
pub use model::{InvoiceRequest, Supplier};
pub use settings::Settings;
