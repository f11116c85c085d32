//! Batch exports: CSV listings and payment-order XML.

mod csv;
mod payment_order;

pub use csv::export_csv;
pub use payment_order::payment_order_xml;
