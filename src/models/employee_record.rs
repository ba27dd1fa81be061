//! The canonical employee payroll record produced by ingestion.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CanonicalField, ExtractionWarning, FieldGroup, FieldTarget, WarningCode};

/// Statutory deductions, reported together as one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatutoryDeductions {
    /// Income tax withheld.
    pub tax: Decimal,
    /// Pension contribution.
    pub pension: Decimal,
    /// Health insurance contribution.
    pub health: Decimal,
    /// Housing levy.
    pub housing_levy: Decimal,
}

impl StatutoryDeductions {
    /// Sum of the four statutory lines, or `None` if it overflows.
    pub fn checked_total(&self) -> Option<Decimal> {
        [self.pension, self.health, self.housing_levy]
            .into_iter()
            .try_fold(self.tax, Decimal::checked_add)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Decimal> {
        match key {
            "tax" => Some(&mut self.tax),
            "pension" => Some(&mut self.pension),
            "health" => Some(&mut self.health),
            "housingLevy" => Some(&mut self.housing_levy),
            _ => None,
        }
    }
}

/// Contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Phone number as written in the source.
    pub phone_number: String,
    /// Email address.
    pub email: String,
}

impl ContactInfo {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "phoneNumber" => Some(&mut self.phone_number),
            "email" => Some(&mut self.email),
            _ => None,
        }
    }
}

/// Bank details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
    /// Account number as written in the source.
    pub account_number: String,
    /// Bank name.
    pub bank_name: String,
}

impl BankInfo {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "accountNumber" => Some(&mut self.account_number),
            "bankName" => Some(&mut self.bank_name),
            _ => None,
        }
    }
}

/// A normalized employee payroll record.
///
/// Created once per source row by whichever extraction strategy succeeds.
/// The `id` is a fresh random token with no relation to the source row.
///
/// # Example
///
/// ```
/// use payroll_ingest::models::EmployeeRecord;
///
/// let mut record = EmployeeRecord::new();
/// record.apply_full_name("Jane Mary Doe");
/// assert_eq!(record.given_names, "Jane Mary");
/// assert_eq!(record.surname, "Doe");
/// assert!(record.has_identity());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    /// Opaque identifier generated at ingestion.
    pub id: Uuid,
    /// Employer-assigned staff number.
    pub employee_number: String,
    /// Family name.
    pub surname: String,
    /// First and middle names.
    pub given_names: String,
    /// National identity number.
    pub national_id: String,
    /// Tax PIN.
    pub tax_pin: String,
    /// Pension fund membership number.
    pub pension_number: String,
    /// Health fund membership number.
    pub health_number: String,
    /// Job position.
    pub position: String,
    /// Gross pay.
    pub gross_income: Decimal,
    /// Statutory deductions group.
    pub statutory_deductions: StatutoryDeductions,
    /// Loan repayment.
    pub loan_deduction: Decimal,
    /// Employer salary advance recovered.
    pub employer_advance: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Net pay.
    pub net_income: Decimal,
    /// Earned-wage advance limit.
    pub advance_limit: Decimal,
    /// Portion of the advance limit still available.
    pub available_advance_limit: Decimal,
    /// Contact details group.
    pub contact: ContactInfo,
    /// Bank details group.
    pub bank_info: BankInfo,
    /// Gender as written in the source.
    pub gender: String,
    /// Whether the employee is on probation.
    pub on_probation: bool,
    /// Whether the employee accepted the service terms.
    pub terms_accepted: bool,
    /// Employment status.
    pub status: String,
    /// Non-fatal annotations raised while building the record.
    #[serde(default)]
    pub warnings: Vec<ExtractionWarning>,
}

/// Status assigned to every record unless the source says otherwise.
pub const DEFAULT_STATUS: &str = "active";

impl EmployeeRecord {
    /// Creates a record with every field at its default and a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_number: String::new(),
            surname: String::new(),
            given_names: String::new(),
            national_id: String::new(),
            tax_pin: String::new(),
            pension_number: String::new(),
            health_number: String::new(),
            position: String::new(),
            gross_income: Decimal::ZERO,
            statutory_deductions: StatutoryDeductions::default(),
            loan_deduction: Decimal::ZERO,
            employer_advance: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_income: Decimal::ZERO,
            advance_limit: Decimal::ZERO,
            available_advance_limit: Decimal::ZERO,
            contact: ContactInfo::default(),
            bank_info: BankInfo::default(),
            gender: String::new(),
            on_probation: false,
            terms_accepted: false,
            status: DEFAULT_STATUS.to_string(),
            warnings: Vec::new(),
        }
    }

    /// Stores a text value in the slot for `field`.
    ///
    /// Returns false, leaving the record untouched, when `field` is not a
    /// text field.
    pub fn set_text(&mut self, field: CanonicalField, value: &str) -> bool {
        let slot = match field.target() {
            FieldTarget::Simple { key } => self.text_slot(key),
            FieldTarget::Nested {
                group: FieldGroup::Contact,
                key,
            } => self.contact.slot_mut(key),
            FieldTarget::Nested {
                group: FieldGroup::BankInfo,
                key,
            } => self.bank_info.slot_mut(key),
            FieldTarget::Nested { .. } | FieldTarget::NameSplit => None,
        };
        match slot {
            Some(slot) => {
                *slot = value.trim().to_string();
                true
            }
            None => false,
        }
    }

    /// Stores a monetary value in the slot for `field`.
    ///
    /// Returns false when `field` is not a monetary field.
    pub fn set_money(&mut self, field: CanonicalField, value: Decimal) -> bool {
        let slot = match field.target() {
            FieldTarget::Simple { key } => self.money_slot(key),
            FieldTarget::Nested {
                group: FieldGroup::StatutoryDeductions,
                key,
            } => self.statutory_deductions.slot_mut(key),
            FieldTarget::Nested { .. } | FieldTarget::NameSplit => None,
        };
        match slot {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Stores a boolean value in the slot for `field`.
    ///
    /// Returns false when `field` is not a flag field.
    pub fn set_flag(&mut self, field: CanonicalField, value: bool) -> bool {
        let slot = match field.target() {
            FieldTarget::Simple { key: "onProbation" } => &mut self.on_probation,
            FieldTarget::Simple { key: "termsAccepted" } => &mut self.terms_accepted,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn text_slot(&mut self, key: &str) -> Option<&mut String> {
        let slot = match key {
            "employeeNumber" => &mut self.employee_number,
            "surname" => &mut self.surname,
            "givenNames" => &mut self.given_names,
            "nationalId" => &mut self.national_id,
            "taxPin" => &mut self.tax_pin,
            "pensionNumber" => &mut self.pension_number,
            "healthNumber" => &mut self.health_number,
            "position" => &mut self.position,
            "gender" => &mut self.gender,
            "status" => &mut self.status,
            _ => return None,
        };
        Some(slot)
    }

    fn money_slot(&mut self, key: &str) -> Option<&mut Decimal> {
        let slot = match key {
            "grossIncome" => &mut self.gross_income,
            "loanDeduction" => &mut self.loan_deduction,
            "employerAdvance" => &mut self.employer_advance,
            "otherDeductions" => &mut self.other_deductions,
            "totalDeductions" => &mut self.total_deductions,
            "netIncome" => &mut self.net_income,
            "advanceLimit" => &mut self.advance_limit,
            _ => return None,
        };
        Some(slot)
    }

    /// Splits a full name on whitespace into given names and surname.
    ///
    /// The last token becomes the surname and the remaining tokens the given
    /// names. A single token goes entirely to the given names.
    pub fn apply_full_name(&mut self, full_name: &str) {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();
        match tokens.split_last() {
            None => {}
            Some((only, [])) => self.given_names = (*only).to_string(),
            Some((last, rest)) => {
                self.surname = (*last).to_string();
                self.given_names = rest.join(" ");
            }
        }
    }

    /// Returns true if at least one of employee number, surname or given
    /// names is non-empty.
    pub fn has_identity(&self) -> bool {
        !self.employee_number.trim().is_empty()
            || !self.surname.trim().is_empty()
            || !self.given_names.trim().is_empty()
    }

    /// Fills the derived money fields that the source did not supply.
    ///
    /// Total deductions, net income and the advance limit are computed only
    /// when absent from `supplied`. A derivation whose arithmetic overflows
    /// is set to zero with an `unparseable_value` warning. The available
    /// advance limit always starts equal to the advance limit.
    pub fn derive_missing(&mut self, supplied: &BTreeSet<CanonicalField>, advance_ratio: Decimal) {
        if !supplied.contains(&CanonicalField::TotalDeductions) {
            let total = self.statutory_deductions.checked_total().and_then(|statutory| {
                [self.loan_deduction, self.employer_advance, self.other_deductions]
                    .into_iter()
                    .try_fold(statutory, Decimal::checked_add)
            });
            self.total_deductions = self.derived(CanonicalField::TotalDeductions, total);
        }

        if !supplied.contains(&CanonicalField::NetIncome) {
            let net = self.gross_income.checked_sub(self.total_deductions);
            self.net_income = self.derived(CanonicalField::NetIncome, net);
        }

        if !supplied.contains(&CanonicalField::AdvanceLimit) {
            let limit = self
                .net_income
                .checked_mul(advance_ratio)
                .map(|limit| limit.floor().max(Decimal::ZERO));
            self.advance_limit = self.derived(CanonicalField::AdvanceLimit, limit);
        }

        self.available_advance_limit = self.advance_limit;
    }

    fn derived(&mut self, field: CanonicalField, value: Option<Decimal>) -> Decimal {
        value.unwrap_or_else(|| {
            self.warnings.push(ExtractionWarning::new(
                WarningCode::UnparseableValue,
                format!("{}: amounts out of range, defaulted to 0", field.path()),
            ));
            Decimal::ZERO
        })
    }
}

impl Default for EmployeeRecord {
    fn default() -> Self {
        Self::new()
    }
}
