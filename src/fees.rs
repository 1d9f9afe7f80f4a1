//! Fee formula: 5% of the contract value, plus 10% GST on top.

use chrono::{Duration, NaiveDateTime};

use crate::error::Result;
use crate::input::validate_contract_value;

/// Share of the contract value that is invoiced.
pub const FEE_RATE: f64 = 0.05;
/// Goods and Services Tax applied to the invoice amount.
pub const GST_RATE: f64 = 0.10;
/// Days between the invoice date and the due date.
pub const PAYMENT_TERMS_DAYS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fees {
    pub invoice_amount: f64,
    pub gst: f64,
    pub total: f64,
}

/// Computes the unrounded invoice figures. Rounding only happens on display.
pub fn calculate_fees(contract_value: f64) -> Result<Fees> {
    let contract_value = validate_contract_value(contract_value)?;
    let invoice_amount = contract_value * FEE_RATE;
    let gst = invoice_amount * GST_RATE;

    Ok(Fees {
        invoice_amount,
        gst,
        total: invoice_amount + gst,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceComputation {
    pub contract_value: f64,
    pub fees: Fees,
    pub invoice_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
}

impl InvoiceComputation {
    pub fn new(contract_value: f64, invoice_date: NaiveDateTime) -> Result<Self> {
        let fees = calculate_fees(contract_value)?;
        Ok(Self {
            contract_value,
            fees,
            invoice_date,
            due_date: due_date_for(invoice_date),
        })
    }

    pub fn invoice_amount(&self) -> f64 {
        self.fees.invoice_amount
    }

    pub fn gst(&self) -> f64 {
        self.fees.gst
    }

    pub fn total(&self) -> f64 {
        self.fees.total
    }
}

pub fn due_date_for(invoice_date: NaiveDateTime) -> NaiveDateTime {
    invoice_date + Duration::days(PAYMENT_TERMS_DAYS)
}
