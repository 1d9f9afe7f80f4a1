use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default = "default_registration_label")]
    pub registration_label: String,
    pub registration: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

fn default_registration_label() -> String {
    "ACN".to_string()
}

impl CompanyProfile {
    /// Lines printed in the invoice header, top to bottom.
    pub fn header_lines(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{}: {}", self.registration_label, self.registration),
            self.address.clone(),
            format!("Email: {}", self.email),
            format!("Tel: {}", self.phone),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BankField {
    pub label: String,
    pub value: String,
}

/// Payment details in display order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct BankDetails(pub Vec<BankField>);

impl BankDetails {
    pub fn iter(&self) -> impl Iterator<Item = &BankField> {
        self.0.iter()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Supplier {
    /// 1-based position in the configured supplier list.
    #[serde(skip_deserializing, default)]
    pub id: usize,
    pub name: String,
    pub address: Vec<String>,
}

/// The four values a front-end collects. Fields are private so a request can
/// only exist once its invariants hold.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    supplier: Supplier,
    project_number: String,
    project_address: String,
    contract_value: f64,
}

impl InvoiceRequest {
    pub fn new(
        supplier: Supplier,
        project_number: &str,
        project_address: &str,
        contract_value: f64,
    ) -> Result<Self> {
        let project_number = input::validate_project_number(project_number)?;
        let project_address = input::validate_project_address(project_address)?;
        let contract_value = input::validate_contract_value(contract_value)?;

        Ok(Self {
            supplier,
            project_number,
            project_address,
            contract_value,
        })
    }

    pub fn supplier(&self) -> &Supplier {
        &self.supplier
    }

    /// Also used as the invoice number and in the output file name.
    pub fn project_number(&self) -> &str {
        &self.project_number
    }

    pub fn project_address(&self) -> &str {
        &self.project_address
    }

    pub fn contract_value(&self) -> f64 {
        self.contract_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvoiceError;

    fn supplier() -> Supplier {
        Supplier {
            id: 1,
            name: "Platinum Elevators Pty Ltd".to_string(),
            address: vec!["Suite 19/2 Kirkham Rd W,".to_string()],
        }
    }

    #[test]
    fn test_header_lines_carry_labels() {
        let company = CompanyProfile {
            name: "LIFTHUB PTY LTD".to_string(),
            registration_label: "ACN".to_string(),
            registration: "667592800".to_string(),
            address: "120 Spencer Street, Melbourne, 3000".to_string(),
            email: "info@lifthub.com.au".to_string(),
            phone: "+61422 099 979".to_string(),
        };

        let lines = company.header_lines();
        assert_eq!(lines[1], "ACN: 667592800");
        assert_eq!(lines[3], "Email: info@lifthub.com.au");
        assert_eq!(lines[4], "Tel: +61422 099 979");
    }

    #[test]
    fn test_request_keeps_project_number_verbatim() {
        let request = InvoiceRequest::new(supplier(), "PN 2024, #7", "12 Test St", 10.0).unwrap();
        assert_eq!(request.project_number(), "PN 2024, #7");
    }

    #[test]
    fn test_request_rejects_empty_fields() {
        let err = InvoiceRequest::new(supplier(), "   ", "12 Test St", 10.0).unwrap_err();
        assert!(matches!(err, InvoiceError::MissingRequiredField("project number")));

        let err = InvoiceRequest::new(supplier(), "PN-1", "", 10.0).unwrap_err();
        assert!(matches!(err, InvoiceError::MissingRequiredField("project address")));
    }

    #[test]
    fn test_request_rejects_non_positive_value() {
        for value in [0.0, -1.0, f64::NAN] {
            let err = InvoiceRequest::new(supplier(), "PN-1", "12 Test St", value).unwrap_err();
            assert!(matches!(err, InvoiceError::InvalidInput(_)));
        }
    }
}
